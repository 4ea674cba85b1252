//! Requirements file (`requirements.txt`) parsing

use serde::Serialize;

use crate::source::Span;
use crate::specifier::normalize_name;
use crate::string_utils::{strip_any_prefix, strip_comment};

/// Option prefixes that reference another requirements file.
const INCLUDE_OPTIONS: &[&str] = &["--requirement=", "--requirement", "-r"];

/// A requirement line from a requirements file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub specifier: String,
    /// 0-based line the requirement starts on.
    pub line: usize,
    #[serde(skip)]
    pub span: Span,
}

impl Requirement {
    /// Normalized distribution name, or `None` when the line has no leading name.
    pub fn normalized_name(&self) -> Option<String> {
        if !self
            .specifier
            .starts_with(|c: char| c.is_ascii_alphanumeric())
        {
            return None;
        }
        let end = self
            .specifier
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(self.specifier.len());
        Some(normalize_name(&self.specifier[..end]))
    }
}

/// One logical line: physical lines joined by trailing backslashes.
struct LogicalLine {
    /// 0-based line of the first physical line.
    line: usize,
    /// Byte offset of the first physical line.
    offset: usize,
    /// Byte offset just past the last physical line, before any line ending.
    end: usize,
    /// Spans several physical lines.
    continued: bool,
    joined: String,
}

fn logical_lines(content: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut pending: Option<LogicalLine> = None;

    for (index, raw) in content.split('\n').enumerate() {
        let physical = raw.strip_suffix('\r').unwrap_or(raw);
        let (body, continues) = match physical.strip_suffix('\\') {
            Some(body) => (body, true),
            None => (physical, false),
        };

        let mut current = match pending.take() {
            Some(mut prev) => {
                prev.continued = true;
                prev.end = offset + physical.len();
                prev.joined.push_str(body);
                prev
            }
            None => LogicalLine {
                line: index,
                offset,
                end: offset + physical.len(),
                continued: false,
                joined: body.to_string(),
            },
        };

        if continues {
            current.continued = true;
            pending = Some(current);
        } else {
            lines.push(current);
        }
        offset += raw.len() + 1;
    }

    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

/// Parse requirements text into its requirement lines, in file order.
///
/// Comments, blank lines and pip options (`-r`, `-c`, `-e`, `--index-url`, ...)
/// are skipped.
pub fn parse_requirements(content: &str) -> Vec<Requirement> {
    let mut requirements = Vec::new();

    for logical in logical_lines(content) {
        let uncommented = strip_comment(&logical.joined);
        let specifier = uncommented.trim();
        if specifier.is_empty() || specifier.starts_with('-') {
            continue;
        }

        let span = if logical.continued {
            let physical = &content[logical.offset..logical.end];
            let kept = strip_comment(physical).trim_end();
            let leading = kept.len() - kept.trim_start().len();
            Span::new(logical.offset + leading, logical.offset + kept.len())
        } else {
            let leading = uncommented.len() - uncommented.trim_start().len();
            let start = logical.offset + leading;
            Span::new(start, start + specifier.len())
        };

        requirements.push(Requirement {
            specifier: specifier.to_string(),
            line: logical.line,
            span,
        });
    }

    requirements
}

/// Files included with `-r` / `--requirement`, in order.
pub fn referenced_files(content: &str) -> Vec<String> {
    logical_lines(content)
        .iter()
        .filter_map(|logical| {
            let line = strip_comment(&logical.joined).trim();
            let rest = strip_any_prefix(line, INCLUDE_OPTIONS);
            if rest.len() == line.len() {
                return None;
            }
            let target = rest.trim_start_matches('=').trim();
            (!target.is_empty()).then(|| target.to_string())
        })
        .collect()
}
