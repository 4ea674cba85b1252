//! Report formatting and display
//!
//! - `config` - Output configuration types
//! - `console` - Colored console listing
//! - `json` - JSON output

mod config;
mod console;
mod json;

pub use config::OutputConfig;
pub use console::{ConsoleFormatter, print_reports};
pub use json::{print_json, to_json};
