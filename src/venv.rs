//! Virtual environment probe
//!
//! An interpreter runs inside a virtual environment when `sys.real_prefix`
//! is set (legacy `virtualenv`) or `sys.base_prefix` differs from
//! `sys.prefix` (`venv`). The probe reports this through its exit code:
//! `0` inside a virtual environment, `1` otherwise.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Standalone probe script. Exits 0 inside a virtual environment, 1 otherwise.
pub const PROBE_SCRIPT: &str = r#"import sys

real_prefix = getattr(sys, "real_prefix", None)
base_prefix = getattr(sys, "base_prefix", sys.prefix)
if real_prefix or base_prefix != sys.prefix:
    sys.exit(0)

sys.exit(1)
"#;

/// Prints the prefixes as JSON so the decision is made on this side.
const QUERY_SCRIPT: &str = r#"import json, sys
print(json.dumps({
    "real_prefix": getattr(sys, "real_prefix", None),
    "base_prefix": getattr(sys, "base_prefix", None),
    "prefix": sys.prefix,
}))
"#;

/// The interpreter prefixes the decision is based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixInfo {
    #[serde(default)]
    pub real_prefix: Option<String>,
    #[serde(default)]
    pub base_prefix: Option<String>,
    pub prefix: String,
}

impl PrefixInfo {
    pub fn is_virtual_env(&self) -> bool {
        if self.real_prefix.as_deref().is_some_and(|p| !p.is_empty()) {
            return true;
        }
        let base = self.base_prefix.as_deref().unwrap_or(&self.prefix);
        base != self.prefix
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_virtual_env() { 0 } else { 1 }
    }
}

/// Interpreter used when none is given.
pub fn default_python() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("python")
    } else {
        PathBuf::from("python3")
    }
}

/// Run `python` in `cwd` and read its prefixes.
pub fn query_interpreter(python: &Path, cwd: &Path) -> Result<PrefixInfo> {
    let failed = |message: String| Error::Interpreter {
        python: python.to_path_buf(),
        message,
    };

    debug!("querying {} in {}", python.display(), cwd.display());
    let output = Command::new(python)
        .arg("-c")
        .arg(QUERY_SCRIPT)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| failed(err.to_string()))?;

    if !output.status.success() {
        return Err(failed(format!(
            "exited with {} stderr={}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_prefix_info(&String::from_utf8_lossy(&output.stdout)).map_err(failed)
}

fn parse_prefix_info(stdout: &str) -> Result<PrefixInfo, String> {
    serde_json::from_str(stdout.trim()).map_err(|err| format!("unexpected output: {err}"))
}
