//! Shared file reading utilities
//!
//! Descriptors and requirements files are read through one size-limited
//! function so a stray multi-megabyte `setup.py` never gets tokenized.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;

use crate::error::{Error, Result};

/// Default maximum file size for extraction operations (1MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Global configurable max file size. Set via `set_max_file_size()`.
static MAX_FILE_SIZE: AtomicU64 = AtomicU64::new(DEFAULT_MAX_FILE_SIZE);

/// Set the maximum file size for extraction operations.
/// This affects all subsequent calls to `read_text_file`.
pub fn set_max_file_size(size: u64) {
    MAX_FILE_SIZE.store(size, Ordering::SeqCst);
}

/// Get the current maximum file size setting.
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE.load(Ordering::SeqCst)
}

/// Read a UTF-8 text file if it is within the size limit.
pub fn read_text_file(path: &Path) -> Result<String> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = path.metadata().map_err(io_error)?.len();
    if size > get_max_file_size() {
        warn!("skipping {} ({} bytes)", path.display(), size);
        return Err(Error::FileTooLarge {
            path: path.to_path_buf(),
            size,
        });
    }

    std::fs::read_to_string(path).map_err(io_error)
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
pub fn parse_file_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier).ok_or_else(|| format!("size too large: {}", s))
}
