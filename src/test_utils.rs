//! Test utilities for creating temporary Python project trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A descriptor with a literal `install_requires` list.
pub fn inline_setup_py(name: &str, dependencies: &[&str]) -> String {
    let entries: Vec<String> = dependencies
        .iter()
        .map(|d| format!("        '{}',\n", d))
        .collect();
    format!(
        "from setuptools import setup\n\nsetup(\n    name='{}',\n    version='1.0.0',\n    install_requires=[\n{}    ],\n)\n",
        name,
        entries.concat()
    )
}

/// A descriptor that reads its dependencies from `requirements_file`.
pub fn external_setup_py(name: &str, requirements_file: &str) -> String {
    format!(
        "import setuptools\n\n\
         def get_requires(filename):\n    \
             with open(filename) as f:\n        \
                 return [l for l in f.read().splitlines() if l and not l.startswith('#')]\n\n\
         setuptools.setup(\n    name='{}',\n    install_requires=get_requires('{}'),\n)\n",
        name, requirements_file
    )
}

/// A temporary directory holding one or more Python projects.
///
/// The directory is automatically cleaned up when dropped.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write `<dir>/setup.py` with an inline dependency list.
    pub fn add_inline_project(&self, dir: &str, name: &str, dependencies: &[&str]) -> PathBuf {
        self.add_file(&join(dir, "setup.py"), &inline_setup_py(name, dependencies))
    }

    /// Write `<dir>/setup.py` reading `<dir>/requirements.txt`, and that file.
    pub fn add_external_project(&self, dir: &str, name: &str, requirements: &[&str]) -> PathBuf {
        let mut content = requirements.join("\n");
        content.push('\n');
        self.add_file(&join(dir, "requirements.txt"), &content);
        self.add_file(&join(dir, "setup.py"), &external_setup_py(name, "requirements.txt"))
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

fn join(dir: &str, file: &str) -> String {
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), file)
    }
}
