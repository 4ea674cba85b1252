//! Version pinning
//!
//! Rewrites the constraint of one named dependency to `==<version>` in a
//! descriptor's inline list or in a requirements file. Only the specifier
//! text of matching entries changes; every other byte is kept.

use log::{debug, warn};

use crate::descriptor::PackageDescriptor;
use crate::error::{Error, Result};
use crate::requirements::parse_requirements;
use crate::source::Span;
use crate::specifier::{DependencySpecifier, normalize_name};

/// Result of a pin: the rewritten text and how many entries changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pinned {
    pub content: String,
    pub replaced: usize,
}

struct Edit {
    span: Span,
    replacement: String,
}

/// Pin `package` to `version` in the inline `install_requires` of a descriptor.
///
/// A computed or missing `install_requires` yields the same error as
/// [`extract_dependencies`](crate::descriptor::extract_dependencies).
pub fn pin_descriptor(source: &str, package: &str, version: &str) -> Result<Pinned> {
    let wanted = normalize_name(package);
    let dependencies = PackageDescriptor::parse(source)?
        .install_requires
        .into_inline()?;

    let mut edits = Vec::new();
    for dep in &dependencies {
        let Some(spec) = matching(&dep.specifier, &wanted) else {
            continue;
        };
        let span = specifier_span(source, dep.span, &dep.specifier);
        let mut replacement = spec.pinned(version).to_string();
        // Text found verbatim in the source needs no escaping (raw literals included).
        if let Some(quote) = dep.quote {
            if span.slice(source) != dep.specifier {
                replacement = escape(&replacement, quote);
            }
        }
        edits.push(Edit { span, replacement });
    }

    apply(source, package, edits)
}

/// Pin `package` to `version` in requirements-file text.
pub fn pin_requirements(content: &str, package: &str, version: &str) -> Result<Pinned> {
    let wanted = normalize_name(package);
    let edits = parse_requirements(content)
        .into_iter()
        .filter_map(|req| {
            let spec = matching(&req.specifier, &wanted)?;
            Some(Edit {
                span: req.span,
                replacement: spec.pinned(version).to_string(),
            })
        })
        .collect();

    apply(content, package, edits)
}

fn matching(specifier: &str, wanted: &str) -> Option<DependencySpecifier> {
    match DependencySpecifier::parse(specifier) {
        Ok(spec) if spec.normalized_name() == wanted => Some(spec),
        Ok(_) => None,
        Err(err) => {
            debug!("not pinning unparsable entry: {}", err);
            None
        }
    }
}

/// Where the specifier sits inside a literal's span. Literals with decoded
/// escapes only record their whole content.
fn specifier_span(source: &str, span: Span, specifier: &str) -> Span {
    let text = span.slice(source);
    if text == specifier {
        return span;
    }
    match text.find(specifier) {
        Some(at) => Span::new(span.start + at, span.start + at + specifier.len()),
        None => span,
    }
}

fn escape(text: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == quote {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn apply(text: &str, package: &str, mut edits: Vec<Edit>) -> Result<Pinned> {
    if edits.is_empty() {
        return Err(Error::PackageNotFound(package.to_string()));
    }
    edits.sort_by_key(|edit| edit.span.start);

    let mut content = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut replaced = 0;
    for edit in edits {
        if edit.span.start < cursor {
            warn!("overlapping entries for `{}`, keeping the first", package);
            continue;
        }
        content.push_str(&text[cursor..edit.span.start]);
        content.push_str(&edit.replacement);
        cursor = edit.span.end;
        replaced += 1;
    }
    content.push_str(&text[cursor..]);

    Ok(Pinned { content, replaced })
}
