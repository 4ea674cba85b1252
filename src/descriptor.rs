//! Packaging descriptor (`setup.py`) parsing
//!
//! Reads the keyword arguments of the `setup(...)` call and reports what
//! `install_requires` declares. The important distinction is between a list
//! literal written in the file (inline dependencies, possibly empty) and a value
//! computed by code, which in practice almost always reads a requirements file:
//!
//! ```python
//! setup(install_requires=['fire==0.1.3', 'numpy>=1.14.5'])    # inline
//! setup(install_requires=[])                                   # inline, empty
//! setup(install_requires=get_requires("requirements.txt"))     # external
//! ```
//!
//! For external declarations the parser traces the expression back through
//! module-level assignments to the requirements file path when it can.

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::python::{StrLiteral, Token, TokenKind, tokenize};
use crate::source::Span;
use crate::specifier::DependencySpecifier;
use crate::string_utils::{collapse_whitespace, strip_comment};

/// How many assignments deep an external expression is traced.
const MAX_TRACE_DEPTH: usize = 4;

/// File suffixes that mark a string literal as a requirements file path.
const REQUIREMENTS_SUFFIXES: &[&str] = &[".txt", ".in", ".pip"];

/// A single inline dependency entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// The specifier with whitespace trimmed and any `# ...` suffix removed.
    pub specifier: String,
    /// Location of the specifier text in the source.
    pub span: Span,
    /// Quote character of the literal holding the entry, `None` outside Python source.
    #[serde(skip)]
    pub quote: Option<char>,
}

impl Dependency {
    /// Parse the specifier into name, extras, version clauses and marker.
    pub fn parsed(&self) -> Result<DependencySpecifier> {
        DependencySpecifier::parse(&self.specifier)
    }
}

/// What the descriptor says about `install_requires`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DependencyDeclaration {
    /// A list or tuple literal of strings, in declaration order.
    Inline { dependencies: Vec<Dependency> },
    /// Any other expression. `requirements_file` is the file it reads, if traceable.
    External {
        expression: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        requirements_file: Option<String>,
    },
    /// No `install_requires` keyword at all.
    Absent,
}

impl DependencyDeclaration {
    pub fn is_inline(&self) -> bool {
        matches!(self, DependencyDeclaration::Inline { .. })
    }

    /// Inline dependencies, `None` for external or absent declarations.
    pub fn inline(&self) -> Option<&[Dependency]> {
        match self {
            DependencyDeclaration::Inline { dependencies } => Some(dependencies),
            _ => None,
        }
    }

    /// Convert into the inline list, or the error describing why there is none.
    pub fn into_inline(self) -> Result<Vec<Dependency>> {
        match self {
            DependencyDeclaration::Inline { dependencies } => Ok(dependencies),
            DependencyDeclaration::External {
                expression,
                requirements_file,
            } => Err(Error::NoInlineDependencies {
                expression,
                requirements_file,
            }),
            DependencyDeclaration::Absent => Err(Error::MissingInstallRequires),
        }
    }
}

/// The parts of a `setup.py` this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub install_requires: DependencyDeclaration,
    /// Span of `install_requires<ws>=`, when the keyword is present.
    #[serde(skip)]
    pub keyword_span: Option<Span>,
}

impl PackageDescriptor {
    /// Parse descriptor source text.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        let code = Code::new(source, &tokens)?;

        let setup_call = code.setup_call();
        if setup_call.is_none() {
            debug!("no setup(...) call found, scanning all keyword assignments");
        }

        let name = code
            .keyword(setup_call, "name")
            .and_then(|kw| code.string_value(kw.value));
        let version = code
            .keyword(setup_call, "version")
            .and_then(|kw| code.string_value(kw.value));

        let (install_requires, keyword_span) = match code.keyword(setup_call, "install_requires") {
            Some(kw) => (code.declaration(kw.value), Some(kw.span)),
            None => (DependencyDeclaration::Absent, None),
        };

        Ok(Self {
            name,
            version,
            install_requires,
            keyword_span,
        })
    }
}

/// Extract the inline dependency specifiers declared by a descriptor.
///
/// Returns the specifiers in declaration order, or an empty vector when the
/// descriptor explicitly declares `install_requires=[]`. A descriptor that
/// computes its dependencies (for example from a requirements file) yields
/// [`Error::NoInlineDependencies`] so callers can tell it apart from an empty
/// list; one without the keyword yields [`Error::MissingInstallRequires`].
pub fn extract_dependencies(source: &str) -> Result<Vec<String>> {
    let descriptor = PackageDescriptor::parse(source)?;
    let dependencies = descriptor.install_requires.into_inline()?;
    Ok(dependencies.into_iter().map(|d| d.specifier).collect())
}

/// A keyword argument (or keyword-like assignment) found in the token stream.
#[derive(Debug, Clone, Copy)]
struct Keyword {
    /// From the keyword's first byte to the end of `=`.
    span: Span,
    /// Token index range `[start, end)` of the value expression.
    value: (usize, usize),
}

/// The significant tokens of a file: comments dropped, newlines kept only
/// where they end a statement, brackets matched.
struct Code<'t> {
    source: &'t str,
    toks: Vec<&'t Token>,
    closing: Vec<Option<usize>>,
}

impl<'t> Code<'t> {
    fn new(source: &'t str, tokens: &'t [Token]) -> Result<Self> {
        let mut toks = Vec::with_capacity(tokens.len());
        let mut closing = Vec::with_capacity(tokens.len());
        let mut stack: Vec<(char, usize)> = Vec::new();

        for token in tokens {
            match token.kind {
                TokenKind::Comment => continue,
                TokenKind::Newline if !stack.is_empty() => continue,
                TokenKind::Op(open @ ('(' | '[' | '{')) => {
                    stack.push((open, toks.len()));
                }
                TokenKind::Op(close @ (')' | ']' | '}')) => {
                    let expected = match close {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.pop() {
                        Some((open, index)) if open == expected => {
                            closing[index] = Some(toks.len());
                        }
                        _ => return Err(Error::UnbalancedBracket { line: token.line }),
                    }
                }
                _ => {}
            }
            toks.push(token);
            closing.push(None);
        }

        if let Some(&(_, index)) = stack.last() {
            return Err(Error::UnbalancedBracket {
                line: toks[index].line,
            });
        }

        Ok(Self {
            source,
            toks,
            closing,
        })
    }

    fn is_newline(&self, i: usize) -> bool {
        self.toks[i].kind == TokenKind::Newline
    }

    fn text(&self, (start, end): (usize, usize)) -> String {
        if start >= end {
            return String::new();
        }
        let span = Span::new(self.toks[start].span.start, self.toks[end - 1].span.end);
        collapse_whitespace(span.slice(self.source))
    }

    /// Open/close token indices of the last `setup(...)` or `<module>.setup(...)` call.
    fn setup_call(&self) -> Option<(usize, usize)> {
        let mut found = None;
        for i in 0..self.toks.len().saturating_sub(1) {
            if self.toks[i].ident() != Some("setup") || !self.toks[i + 1].is_op('(') {
                continue;
            }
            if i > 0 && self.toks[i - 1].ident() == Some("def") {
                continue;
            }
            if let Some(close) = self.closing[i + 1] {
                found = Some((i + 1, close));
            }
        }
        found
    }

    /// Top-level comma separated segments of `[start, end)`.
    fn split_args(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut segment_start = start;
        let mut i = start;
        while i < end {
            if let Some(close) = self.closing[i] {
                i = close + 1;
                continue;
            }
            if self.toks[i].is_op(',') {
                segments.push((segment_start, i));
                segment_start = i + 1;
            }
            i += 1;
        }
        if segment_start < end {
            segments.push((segment_start, end));
        }
        segments
    }

    /// End (exclusive) of the expression starting at `start`: the next comma,
    /// closing bracket or statement end at the same nesting level.
    fn value_end(&self, start: usize) -> usize {
        let mut i = start;
        while i < self.toks.len() {
            if let Some(close) = self.closing[i] {
                i = close + 1;
                continue;
            }
            match self.toks[i].kind {
                TokenKind::Op(',' | ')' | ']' | '}') | TokenKind::Newline => break,
                _ => i += 1,
            }
        }
        i
    }

    /// `name=` followed by something other than a second `=`.
    fn is_keyword_at(&self, i: usize, name: &str) -> bool {
        self.toks[i].ident() == Some(name)
            && self.toks.get(i + 1).is_some_and(|t| t.is_op('='))
            && self
                .toks
                .get(i + 2)
                .is_some_and(|t| !t.is_op('=') && t.kind != TokenKind::Newline)
    }

    fn keyword_from(&self, i: usize, value_end: usize) -> Keyword {
        Keyword {
            span: Span::new(self.toks[i].span.start, self.toks[i + 1].span.end),
            value: (i + 2, value_end),
        }
    }

    /// Find keyword `name` among the setup call's arguments.
    ///
    /// Only when there is no call, or the call unpacks `**kwargs`, is the rest
    /// of the file searched: statement-level `name = ...` assignments and
    /// top-level keywords of `dict(...)` calls, never anything nested inside
    /// the setup call itself.
    fn keyword(&self, setup_call: Option<(usize, usize)>, name: &str) -> Option<Keyword> {
        if let Some((open, close)) = setup_call {
            let args = self.split_args(open + 1, close);
            for &(start, end) in &args {
                if end - start >= 3 && self.is_keyword_at(start, name) {
                    return Some(self.keyword_from(start, end));
                }
            }
            let unpacks_kwargs = args.iter().any(|&(start, end)| {
                end - start >= 3 && self.toks[start].is_op('*') && self.toks[start + 1].is_op('*')
            });
            if !unpacks_kwargs {
                return None;
            }
        }

        let dict_args = self.dict_keyword_starts();
        let mut found = None;
        for i in 0..self.toks.len() {
            if !self.is_keyword_at(i, name) {
                continue;
            }
            if setup_call.is_some_and(|(open, close)| open < i && i < close) {
                continue;
            }
            if i == 0 || self.is_newline(i - 1) || dict_args[i] {
                found = Some(self.keyword_from(i, self.value_end(i + 2)));
            }
        }
        if found.is_some() {
            debug!("`{}` found outside the setup call", name);
        }
        found
    }

    /// Marks the first token of every top-level argument of a `dict(...)` call.
    fn dict_keyword_starts(&self) -> Vec<bool> {
        let mut starts = vec![false; self.toks.len()];
        for open in 1..self.toks.len() {
            if self.toks[open - 1].ident() != Some("dict") || !self.toks[open].is_op('(') {
                continue;
            }
            let Some(close) = self.closing[open] else {
                continue;
            };
            for (start, _) in self.split_args(open + 1, close) {
                starts[start] = true;
            }
        }
        starts
    }

    /// Value range of the module-level assignment `name = ...` that best
    /// explains a use at token index `used_at`.
    ///
    /// Prefers unindented assignments before the use, then any unindented
    /// assignment, then an indented one.
    fn assignment(&self, name: &str, used_at: usize) -> Option<(usize, usize)> {
        let mut before_unindented = None;
        let mut unindented = None;
        let mut any = None;

        for i in 0..self.toks.len() {
            if !self.is_keyword_at(i, name) || (i > 0 && !self.is_newline(i - 1)) {
                continue;
            }
            let value = (i + 2, self.value_end(i + 2));
            if self.toks[i].column == 0 {
                if i < used_at {
                    before_unindented = Some(value);
                }
                unindented = Some(value);
            }
            any = Some(value);
        }

        before_unindented.or(unindented).or(any)
    }

    /// A keyword value that is a string literal, directly or through a variable.
    fn string_value(&self, (start, end): (usize, usize)) -> Option<String> {
        if end - start != 1 {
            return None;
        }
        match &self.toks[start].kind {
            TokenKind::Str(lit) => Some(lit.value.clone()),
            TokenKind::Ident(name) => {
                let (s, e) = self.assignment(name, start)?;
                if e - s == 1 {
                    self.toks[s].str_literal().map(|lit| lit.value.clone())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn declaration(&self, value: (usize, usize)) -> DependencyDeclaration {
        if let Some(dependencies) = self.literal_dependencies(value) {
            return DependencyDeclaration::Inline { dependencies };
        }

        let (start, end) = value;
        if end - start == 1 {
            if let Some(name) = self.toks[start].ident() {
                if let Some(assigned) = self.assignment(name, start) {
                    if let Some(dependencies) = self.literal_dependencies(assigned) {
                        debug!("`install_requires` bound to literal list `{}`", name);
                        return DependencyDeclaration::Inline { dependencies };
                    }
                }
            }
        }

        let requirements_file = self.trace_requirements_file(value, 0);
        debug!(
            "`install_requires` is computed by `{}`, traced file: {:?}",
            self.text(value),
            requirements_file
        );
        DependencyDeclaration::External {
            expression: self.text(value),
            requirements_file,
        }
    }

    /// Entries of a list/tuple literal of strings, or of a single
    /// newline-separated string (which setuptools also accepts).
    fn literal_dependencies(&self, (start, end): (usize, usize)) -> Option<Vec<Dependency>> {
        if start >= end {
            return None;
        }
        let first = self.toks[start];
        let mut dependencies = Vec::new();

        if (first.is_op('[') || first.is_op('(')) && self.closing[start] == Some(end - 1) {
            for (a, b) in self.split_args(start + 1, end - 1) {
                if b - a == 1 {
                    let literal = self.toks[a].str_literal()?;
                    dependencies.extend(self.entry(literal, 0, &literal.value));
                } else {
                    let joined = self.adjacent_literals((a, b))?;
                    dependencies.extend(self.entry(&joined, 0, &joined.value));
                }
            }
            return Some(dependencies);
        }

        if end - start == 1 {
            let literal = first.str_literal()?;
            let mut offset = 0;
            for line in literal.value.split('\n') {
                dependencies.extend(self.entry(literal, offset, line));
                offset += line.len() + 1;
            }
            return Some(dependencies);
        }

        None
    }

    /// Implicitly concatenated literals (`'a; ' 'b'`) as one literal whose
    /// content runs from the first opening quote to the last closing quote.
    /// Pieces with different delimiters cannot be rewritten as one and are
    /// rejected.
    fn adjacent_literals(&self, (start, end): (usize, usize)) -> Option<StrLiteral> {
        let first = self.toks[start].str_literal()?;
        let mut value = String::new();
        let mut last = first;
        for k in start..end {
            let literal = self.toks[k].str_literal()?;
            if literal.quote != first.quote || literal.triple != first.triple {
                debug!("concatenated literals with mixed quotes at line {}", self.toks[k].line);
                return None;
            }
            value.push_str(&literal.value);
            last = literal;
        }
        Some(StrLiteral {
            value,
            content: Span::new(first.content.start, last.content.end),
            quote: first.quote,
            triple: first.triple,
            verbatim: false,
        })
    }

    /// Build a dependency from `text`, found at byte `offset` of the literal's value.
    fn entry(&self, literal: &StrLiteral, offset: usize, text: &str) -> Option<Dependency> {
        let uncommented = strip_comment(text);
        let specifier = uncommented.trim();
        if specifier.is_empty() {
            return None;
        }

        let span = if literal.verbatim {
            let leading = uncommented.len() - uncommented.trim_start().len();
            let start = literal.content.start + offset + leading;
            Span::new(start, start + specifier.len())
        } else {
            literal.content
        };

        Some(Dependency {
            specifier: specifier.to_string(),
            span,
            quote: Some(literal.quote),
        })
    }

    /// Follow an expression to the requirements file it reads.
    ///
    /// A path literal wins directly; consecutive string arguments before it are
    /// joined as path components (`path.join(here, "requirements", "prod.txt")`).
    /// Otherwise every plain variable in the expression is looked up.
    fn trace_requirements_file(&self, (start, end): (usize, usize), depth: usize) -> Option<String> {
        for k in start..end {
            let Some(literal) = self.toks[k].str_literal() else {
                continue;
            };
            if !looks_like_requirements_file(&literal.value) {
                continue;
            }
            let mut parts = vec![literal.value.as_str()];
            let mut j = k;
            while j >= start + 2 && self.toks[j - 1].is_op(',') {
                match self.toks[j - 2].str_literal() {
                    Some(prev) => {
                        parts.push(prev.value.as_str());
                        j -= 2;
                    }
                    None => break,
                }
            }
            parts.reverse();
            return Some(parts.join("/"));
        }

        if depth >= MAX_TRACE_DEPTH {
            return None;
        }

        for k in start..end {
            let Some(name) = self.toks[k].ident() else {
                continue;
            };
            let is_call = k + 1 < end && self.toks[k + 1].is_op('(');
            let is_attribute = k > start && self.toks[k - 1].is_op('.');
            if is_call || is_attribute {
                continue;
            }
            if let Some(assigned) = self.assignment(name, start) {
                if let Some(file) = self.trace_requirements_file(assigned, depth + 1) {
                    return Some(file);
                }
            }
        }

        None
    }
}

fn looks_like_requirements_file(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    !value.is_empty()
        && !value.contains(char::is_whitespace)
        && REQUIREMENTS_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARIATIONS: &str = include_str!("../tests/fixtures/all_dep_variations.py");
    const NO_NAME: &str = include_str!("../tests/fixtures/no_name.py");
    const NO_DEP_FOUND: &str = include_str!("../tests/fixtures/no_dep_found.py");
    const SETUP_AND_REQUIREMENTS: &str =
        include_str!("../tests/fixtures/setup_and_requirements/setup.py");

    #[test]
    fn test_all_kinds_of_specifiers_in_order() {
        let deps = extract_dependencies(ALL_VARIATIONS).unwrap();
        assert_eq!(
            deps,
            vec![
                "PyYAML",
                "fire==0.1.3",
                "matplotlib>=2.2.0,<2.4.0",
                "newrelic==2.0.*",
                "jupyter~=1.1.1",
                "numpy>=1.14.5",
            ]
        );
    }

    #[test]
    fn test_missing_name_still_extracts() {
        let descriptor = PackageDescriptor::parse(NO_NAME).unwrap();
        assert_eq!(descriptor.name, None);
        assert_eq!(descriptor.version.as_deref(), Some("2.2.2"));

        let deps = extract_dependencies(NO_NAME).unwrap();
        assert_eq!(
            deps,
            vec![
                "PyYAML",
                "fire==0.1.3",
                "regex==2017.4.5",
                "matplotlib>=2.2.0,<2.4.0",
                "newrelic==2.0.*",
                "jupyter~=1.1.1",
                "numpy>=1.14.5",
            ]
        );
    }

    #[test]
    fn test_requirements_helper_is_not_inline() {
        let err = extract_dependencies(NO_DEP_FOUND).unwrap_err();
        match err {
            Error::NoInlineDependencies {
                expression,
                requirements_file,
            } => {
                assert_eq!(expression, "read_requirements(requirements_path)");
                assert_eq!(requirements_file.as_deref(), Some("requirements/prod.txt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_get_requires_helper_is_not_inline() {
        let descriptor = PackageDescriptor::parse(SETUP_AND_REQUIREMENTS).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("snake"));
        assert_eq!(
            descriptor.install_requires,
            DependencyDeclaration::External {
                expression: "project_requirements".to_string(),
                requirements_file: Some("requirements.txt".to_string()),
            }
        );
    }

    #[test]
    fn test_setup_requires_does_not_count() {
        let descriptor = PackageDescriptor::parse(NO_DEP_FOUND).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("pipgrip"));
        assert!(!descriptor.install_requires.is_inline());
    }

    #[test]
    fn test_explicit_empty_list_is_inline() {
        let src = "from setuptools import setup\nsetup(name='x', install_requires=[])\n";
        assert_eq!(extract_dependencies(src).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_absent_keyword() {
        let src = "from setuptools import setup\nsetup(name='x', version='1.0')\n";
        let err = extract_dependencies(src).unwrap_err();
        assert!(matches!(err, Error::MissingInstallRequires));
    }

    #[test]
    fn test_comment_suffix_and_whitespace_removed() {
        let src = r#"
setup(
    install_requires=[
        "  requests>=2.0  # http",   # trailing code comment
        'click',
        '# just a comment',
    ],
)
"#;
        assert_eq!(extract_dependencies(src).unwrap(), vec!["requests>=2.0", "click"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let src = "setup(install_requires=['a', 'b', 'a'])";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_tuple_literal_is_inline() {
        let src = "setup(install_requires=('a>=1', 'b'))";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["a>=1", "b"]);
    }

    #[test]
    fn test_multiline_string_value() {
        let src = "setup(install_requires='''\n    a>=1\n    # no\n    b\n''')";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["a>=1", "b"]);
    }

    #[test]
    fn test_variable_bound_to_literal_list() {
        let src = r#"
REQUIRED = [
    'requests',
    'rich>=10',
]

setup(name=NAME, install_requires=REQUIRED)
"#;
        let descriptor = PackageDescriptor::parse(src).unwrap();
        let deps: Vec<_> = descriptor
            .install_requires
            .inline()
            .unwrap()
            .iter()
            .map(|d| d.specifier.as_str())
            .collect();
        assert_eq!(deps, vec!["requests", "rich>=10"]);
    }

    #[test]
    fn test_name_through_variable() {
        let src = "NAME = 'pkg'\nsetup(name=NAME, install_requires=[])";
        let descriptor = PackageDescriptor::parse(src).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("pkg"));
    }

    #[test]
    fn test_mixed_list_is_external() {
        let src = "setup(install_requires=['a'] + extra)";
        let descriptor = PackageDescriptor::parse(src).unwrap();
        assert!(matches!(
            descriptor.install_requires,
            DependencyDeclaration::External { .. }
        ));

        let src = "setup(install_requires=['a', EXTRA])";
        assert!(!PackageDescriptor::parse(src).unwrap().install_requires.is_inline());
    }

    #[test]
    fn test_open_call_traced() {
        let src = "setup(install_requires=open('requirements/base.in').read().splitlines())";
        let descriptor = PackageDescriptor::parse(src).unwrap();
        match descriptor.install_requires {
            DependencyDeclaration::External {
                requirements_file, ..
            } => assert_eq!(requirements_file.as_deref(), Some("requirements/base.in")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_untraceable_expression() {
        let src = "setup(install_requires=find_requirements())";
        let err = extract_dependencies(src).unwrap_err();
        assert!(matches!(
            err,
            Error::NoInlineDependencies {
                requirements_file: None,
                ..
            }
        ));
    }

    #[test]
    fn test_keyword_inside_string_ignored() {
        let src = "DOC = \"install_requires=['evil']\"\nsetup(install_requires=['good'])";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["good"]);
    }

    #[test]
    fn test_commented_out_keyword_ignored() {
        let src = "setup(\n    # install_requires=['old'],\n    install_requires=['new'],\n)";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["new"]);
    }

    #[test]
    fn test_kwargs_dict_fallback() {
        let src = "kwargs = dict(install_requires=['a'])\nsetup(**kwargs)";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_kwargs_fallback_skips_setup_arguments() {
        let src = "setup(**base, ext_modules=[Extension(name='pkg._ext')], install_requires=['a'])";
        let descriptor = PackageDescriptor::parse(src).unwrap();
        assert_eq!(descriptor.name, None);
    }

    #[test]
    fn test_nested_call_keyword_is_not_the_name() {
        let src = "setup(version='1.0', ext_modules=[Extension(name='pkg._speedups', sources=['x.c'])], install_requires=['a'])";
        let descriptor = PackageDescriptor::parse(src).unwrap();
        assert_eq!(descriptor.name, None);
        assert_eq!(descriptor.version.as_deref(), Some("1.0"));
        assert_eq!(extract_dependencies(src).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_parameter_default_is_not_the_name() {
        let src = "def read(name='README.md'):\n    pass\nsetup(version='1.0', install_requires=[])";
        let descriptor = PackageDescriptor::parse(src).unwrap();
        assert_eq!(descriptor.name, None);
        assert!(descriptor.install_requires.is_inline());
    }

    #[test]
    fn test_parameter_default_ignored_without_setup_call() {
        let src = "def configure(install_requires=None):\n    pass\n";
        assert!(matches!(
            extract_dependencies(src).unwrap_err(),
            Error::MissingInstallRequires
        ));
    }

    #[test]
    fn test_adjacent_strings_join_into_one_entry() {
        let src = "setup(install_requires=[\n 'pkg>=1; '\n 'python_version < \"3.8\"',\n 'other',\n])";
        assert_eq!(
            extract_dependencies(src).unwrap(),
            vec!["pkg>=1; python_version < \"3.8\"", "other"]
        );
    }

    #[test]
    fn test_adjacent_strings_with_mixed_quotes_are_external() {
        let src = "setup(install_requires=['pkg>=1; ' \"python_version < '3.8'\"])";
        assert!(!PackageDescriptor::parse(src).unwrap().install_requires.is_inline());
    }

    #[test]
    fn test_def_setup_is_not_the_call() {
        let src = "def setup(app):\n    pass\n\nsetuptools.setup(install_requires=['x'])";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["x"]);
    }

    #[test]
    fn test_spans_point_at_specifier_text() {
        let descriptor = PackageDescriptor::parse(ALL_VARIATIONS).unwrap();
        for dep in descriptor.install_requires.inline().unwrap() {
            assert_eq!(dep.span.slice(ALL_VARIATIONS), dep.specifier);
            assert_eq!(dep.quote, Some('\''));
        }
    }

    #[test]
    fn test_keyword_span() {
        let src = "setup(install_requires = ['a'])";
        let descriptor = PackageDescriptor::parse(src).unwrap();
        let span = descriptor.keyword_span.unwrap();
        assert_eq!(span.slice(src), "install_requires =");
    }

    #[test]
    fn test_unbalanced_bracket() {
        let err = PackageDescriptor::parse("setup(\n    install_requires=['a'\n)").unwrap_err();
        assert!(matches!(err, Error::UnbalancedBracket { line: 3 }));

        let err = PackageDescriptor::parse("setup(install_requires=['a']").unwrap_err();
        assert!(matches!(err, Error::UnbalancedBracket { line: 1 }));
    }

    #[test]
    fn test_comparison_is_not_keyword() {
        let src = "if install_requires == None:\n    pass\nsetup(install_requires=['z'])";
        assert_eq!(extract_dependencies(src).unwrap(), vec!["z"]);
    }
}
