//! Output configuration types

/// Configuration for console output.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Print each requirement's 1-based line number.
    pub show_lines: bool,
    /// Print the dependency lists, not just their counts.
    pub list_dependencies: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_lines: false,
            list_dependencies: true,
        }
    }
}
