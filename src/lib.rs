//! setuplens - find the dependencies a Python `setup.py` actually declares
//!
//! The core operation is [`extract_dependencies`]: descriptor text in, the
//! inline `install_requires` specifiers out, in declaration order. A
//! descriptor that reads its dependencies from a requirements file is
//! reported as [`Error::NoInlineDependencies`] rather than as an empty list.
//!
//! ```
//! use setuplens::{Error, extract_dependencies};
//!
//! let deps = extract_dependencies("setup(name='x', install_requires=['fire==0.1.3', 'PyYAML'])")?;
//! assert_eq!(deps, vec!["fire==0.1.3", "PyYAML"]);
//!
//! let computed = extract_dependencies("setup(install_requires=get_requires('requirements.txt'))");
//! assert!(matches!(computed, Err(Error::NoInlineDependencies { .. })));
//! # Ok::<(), setuplens::Error>(())
//! ```

pub mod descriptor;
pub mod discover;
pub mod error;
pub mod file_utils;
pub mod locate;
pub mod output;
pub mod pin;
pub mod python;
pub mod requirements;
pub mod scan;
pub mod source;
pub mod specifier;
pub mod string_utils;
pub mod venv;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use descriptor::{Dependency, DependencyDeclaration, PackageDescriptor, extract_dependencies};
pub use discover::{DiscoverConfig, ProjectFiles, discover};
pub use error::{Error, Result};
pub use locate::{Range, dependency_position, inline_dependency_position, install_requires_position};
pub use output::{ConsoleFormatter, OutputConfig, print_json, print_reports};
pub use pin::{Pinned, pin_descriptor, pin_requirements};
pub use requirements::{Requirement, parse_requirements};
pub use scan::{ProjectReport, ScanConfig, scan_all, scan_project};
pub use source::{Position, Span, position_at};
pub use specifier::{DependencySpecifier, normalize_name};
pub use venv::{PROBE_SCRIPT, PrefixInfo, query_interpreter};
