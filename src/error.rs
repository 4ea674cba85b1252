//! Error types shared across the extraction modules

use std::path::PathBuf;

/// Errors produced while reading or extracting from descriptors and requirements files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `install_requires` is computed by code (usually read from a requirements file)
    /// rather than written as a list literal.
    #[error("dependencies are not declared inline: `install_requires={expression}`{}", .requirements_file.as_ref().map(|f| format!(" (reads {f})")).unwrap_or_default())]
    NoInlineDependencies {
        expression: String,
        requirements_file: Option<String>,
    },

    #[error("no `install_requires` keyword found")]
    MissingInstallRequires,

    #[error("unterminated string literal starting on line {line}")]
    UnterminatedString { line: usize },

    #[error("unbalanced bracket on line {line}")]
    UnbalancedBracket { line: usize },

    #[error("invalid dependency specifier: `{0}`")]
    InvalidSpecifier(String),

    #[error("package `{0}` is not declared")]
    PackageNotFound(String),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, over the configured limit", path.display())]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("failed to query interpreter `{}`: {message}", python.display())]
    Interpreter { python: PathBuf, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
