//! Dependency specifier structure
//!
//! Splits a specifier such as `requests[security]>=2.8.1,==2.8.*; python_version<"3.8"`
//! into its name, extras, version clauses and environment marker. Only the
//! shape is parsed; versions are kept as strings and never compared.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

static NAME_AND_EXTRAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[([^\]]*)\])?\s*")
        .expect("NAME_AND_EXTRAS regex is invalid")
});

static VERSION_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(===|==|!=|~=|>=|<=|<|>)\s*([A-Za-z0-9_.*+!-]+)\s*$")
        .expect("VERSION_CLAUSE regex is invalid")
});

static NAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("NAME_SEPARATORS regex is invalid"));

/// Version comparison operators, longest spelling first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = "===")]
    ArbitraryEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "~=")]
    Compatible,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "===" => Some(Operator::ArbitraryEqual),
            "==" => Some(Operator::Equal),
            "!=" => Some(Operator::NotEqual),
            "~=" => Some(Operator::Compatible),
            ">=" => Some(Operator::GreaterEqual),
            "<=" => Some(Operator::LessEqual),
            ">" => Some(Operator::Greater),
            "<" => Some(Operator::Less),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::ArbitraryEqual => "===",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Compatible => "~=",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }
}

/// One `<operator><version>` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionClause {
    pub operator: Operator,
    pub version: String,
}

impl fmt::Display for VersionClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.version)
    }
}

/// A parsed dependency specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySpecifier {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<VersionClause>,
    /// Direct reference (`name @ url`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl DependencySpecifier {
    pub fn parse(specifier: &str) -> Result<Self> {
        let invalid = || Error::InvalidSpecifier(specifier.to_string());

        let (requirement, marker) = match specifier.split_once(';') {
            Some((req, marker)) => (req, Some(marker.trim()).filter(|m| !m.is_empty())),
            None => (specifier, None),
        };

        let caps = NAME_AND_EXTRAS.captures(requirement).ok_or_else(invalid)?;
        let name = caps[1].to_string();
        let extras = caps
            .get(2)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let rest = requirement[caps[0].len()..].trim();
        let mut url = None;
        let mut constraints = Vec::new();

        if let Some(reference) = rest.strip_prefix('@') {
            let reference = reference.trim();
            if reference.is_empty() {
                return Err(invalid());
            }
            url = Some(reference.to_string());
        } else {
            let clauses = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .unwrap_or(rest)
                .trim();
            if !clauses.is_empty() {
                for clause in clauses.split(',') {
                    let caps = VERSION_CLAUSE.captures(clause).ok_or_else(invalid)?;
                    let operator = Operator::from_symbol(&caps[1]).ok_or_else(invalid)?;
                    constraints.push(VersionClause {
                        operator,
                        version: caps[2].to_string(),
                    });
                }
            }
        }

        Ok(Self {
            name,
            extras,
            constraints,
            url,
            marker: marker.map(str::to_string),
        })
    }

    /// The name in PEP 503 normalized form, used for matching.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// The same requirement pinned to exactly `version`; extras and marker are kept.
    pub fn pinned(&self, version: &str) -> Self {
        Self {
            name: self.name.clone(),
            extras: self.extras.clone(),
            constraints: vec![VersionClause {
                operator: Operator::Equal,
                version: version.to_string(),
            }],
            url: None,
            marker: self.marker.clone(),
        }
    }
}

impl fmt::Display for DependencySpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let clauses: Vec<String> = self.constraints.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", clauses.join(","))?;
        if let Some(url) = &self.url {
            write!(f, " @ {}", url)?;
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

/// Normalize a distribution name: lowercase, runs of `-`, `_` and `.` become `-`.
///
/// ```
/// use setuplens::specifier::normalize_name;
///
/// assert_eq!(normalize_name("PyYAML"), "pyyaml");
/// assert_eq!(normalize_name("zope.interface"), "zope-interface");
/// assert_eq!(normalize_name("Foo__Bar-.baz"), "foo-bar-baz");
/// ```
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(name.trim(), "-")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name() {
        let spec = DependencySpecifier::parse("PyYAML").unwrap();
        assert_eq!(spec.name, "PyYAML");
        assert!(spec.constraints.is_empty());
        assert!(spec.extras.is_empty());
        assert_eq!(spec.normalized_name(), "pyyaml");
    }

    #[test]
    fn test_range() {
        let spec = DependencySpecifier::parse("matplotlib>=2.2.0,<2.4.0").unwrap();
        assert_eq!(spec.name, "matplotlib");
        assert_eq!(
            spec.constraints,
            vec![
                VersionClause {
                    operator: Operator::GreaterEqual,
                    version: "2.2.0".to_string()
                },
                VersionClause {
                    operator: Operator::Less,
                    version: "2.4.0".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_wildcard_and_compatible() {
        let spec = DependencySpecifier::parse("newrelic==2.0.*").unwrap();
        assert_eq!(spec.constraints[0].version, "2.0.*");
        assert_eq!(spec.constraints[0].operator, Operator::Equal);

        let spec = DependencySpecifier::parse("jupyter~=1.1.1").unwrap();
        assert_eq!(spec.constraints[0].operator, Operator::Compatible);
    }

    #[test]
    fn test_extras_marker_and_spaces() {
        let spec =
            DependencySpecifier::parse("requests [security, socks] >= 2.8.1 , == 2.8.* ; python_version < \"3.8\"")
                .unwrap();
        assert_eq!(spec.name, "requests");
        assert_eq!(spec.extras, vec!["security", "socks"]);
        assert_eq!(spec.constraints.len(), 2);
        assert_eq!(spec.marker.as_deref(), Some("python_version < \"3.8\""));
        assert_eq!(
            spec.to_string(),
            "requests[security,socks]>=2.8.1,==2.8.*; python_version < \"3.8\""
        );
    }

    #[test]
    fn test_parenthesized_clauses() {
        let spec = DependencySpecifier::parse("name (>=1.0, <2)").unwrap();
        assert_eq!(spec.to_string(), "name>=1.0,<2");
    }

    #[test]
    fn test_direct_reference() {
        let spec = DependencySpecifier::parse("pkg @ https://example.com/pkg-1.0.whl").unwrap();
        assert_eq!(spec.url.as_deref(), Some("https://example.com/pkg-1.0.whl"));
        assert!(spec.constraints.is_empty());
    }

    #[test]
    fn test_pinned_keeps_extras_and_marker() {
        let spec = DependencySpecifier::parse("uvicorn[standard]>=0.20; sys_platform != 'win32'")
            .unwrap();
        assert_eq!(
            spec.pinned("0.30.1").to_string(),
            "uvicorn[standard]==0.30.1; sys_platform != 'win32'"
        );
    }

    #[test]
    fn test_invalid() {
        assert!(DependencySpecifier::parse("").is_err());
        assert!(DependencySpecifier::parse("-e .").is_err());
        assert!(DependencySpecifier::parse("pkg=>1.0").is_err());
        assert!(DependencySpecifier::parse("pkg @").is_err());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Django_REST-framework"), "django-rest-framework");
        assert_eq!(normalize_name("ruamel.yaml"), "ruamel-yaml");
    }
}
