//! Source positions for editor navigation
//!
//! Answers "where in this file" for the two lookups an editor integration
//! needs: the `install_requires=` keyword of a descriptor, and the line of a
//! named dependency in a requirements file or inline list.

use serde::Serialize;

use crate::descriptor::PackageDescriptor;
use crate::error::Result;
use crate::requirements::parse_requirements;
use crate::source::{Position, Span, position_at};
use crate::specifier::normalize_name;

/// A start/end position pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn from_span(text: &str, span: Span) -> Self {
        Self {
            start: position_at(text, span.start),
            end: position_at(text, span.end),
        }
    }
}

/// Range of `install_requires<ws>=` in a descriptor, `None` when the keyword is absent.
pub fn install_requires_position(source: &str) -> Result<Option<Range>> {
    let descriptor = PackageDescriptor::parse(source)?;
    Ok(descriptor
        .keyword_span
        .map(|span| Range::from_span(source, span)))
}

/// Range of the name of the first requirement matching `package` in
/// requirements-file text. Names are compared in normalized form.
pub fn dependency_position(content: &str, package: &str) -> Option<Range> {
    let wanted = normalize_name(package);
    parse_requirements(content)
        .into_iter()
        .find(|req| req.normalized_name().as_deref() == Some(wanted.as_str()))
        .map(|req| Range::from_span(content, name_span(content, req.span)))
}

/// Range of the name of the first inline dependency matching `package` in a descriptor.
pub fn inline_dependency_position(source: &str, package: &str) -> Result<Option<Range>> {
    let wanted = normalize_name(package);
    let descriptor = PackageDescriptor::parse(source)?;
    let found = descriptor.install_requires.inline().and_then(|deps| {
        deps.iter().find(|dep| {
            dep.parsed()
                .is_ok_and(|spec| spec.normalized_name() == wanted)
        })
    });
    Ok(found.map(|dep| Range::from_span(source, name_span(source, dep.span))))
}

/// Narrow a specifier span to its leading distribution name.
fn name_span(text: &str, span: Span) -> Span {
    let slice = span.slice(text);
    let len = slice
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(slice.len());
    Span::new(span.start, span.start + len)
}
