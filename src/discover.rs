//! Workspace discovery of descriptors and requirements files
//!
//! Files are grouped into projects by directory. Requirements files kept in a
//! `requirements/` subdirectory belong to the parent directory's project.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;
use log::{debug, warn};
use serde::Serialize;

use crate::error::{Error, Result};

/// Descriptor file name.
pub const DESCRIPTOR_FILE: &str = "setup.py";

/// Directory name whose text files are all requirements files.
const REQUIREMENTS_DIR: &str = "requirements";

/// Directories never descended into, even with `show_all`.
const SKIPPED_DIRS: &[&str] = &[".git", ".venv", "venv", "site-packages", "node_modules", "__pycache__"];

/// Configuration for discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoverConfig {
    /// Include hidden and gitignored files.
    pub show_all: bool,
    /// Glob patterns matched against file and directory names.
    pub ignore_patterns: Vec<String>,
    pub max_depth: Option<usize>,
}

/// The descriptor and requirements files of one project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFiles {
    pub root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_py: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<PathBuf>,
}

impl ProjectFiles {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            setup_py: None,
            requirements: Vec::new(),
        }
    }
}

/// `setup.py`
pub fn is_descriptor(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == DESCRIPTOR_FILE)
}

/// `*requirements*.txt`, or any `.txt` inside a `requirements/` directory.
pub fn is_requirements_file(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|s| s.to_string_lossy()) else {
        return false;
    };
    if glob_match("*requirements*.txt", &name) {
        return true;
    }
    name.ends_with(".txt") && in_requirements_dir(path)
}

fn in_requirements_dir(path: &Path) -> bool {
    path.parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == REQUIREMENTS_DIR)
}

/// Match a glob pattern against a name.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}

/// Check if a directory entry should be skipped based on name and ignore patterns.
fn should_ignore_path(path: &Path, ignore_patterns: &[String]) -> bool {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if path.is_dir() && SKIPPED_DIRS.contains(&name.as_str()) {
        return true;
    }

    ignore_patterns
        .iter()
        .any(|pattern| name == *pattern || glob_match(pattern, &name))
}

/// The project directory a discovered file belongs to.
fn project_root(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    if in_requirements_dir(path) && !is_descriptor(path) {
        if let Some(grandparent) = parent.parent() {
            return grandparent.to_path_buf();
        }
    }
    parent.to_path_buf()
}

/// Find every project under `root`, sorted by directory.
///
/// `root` may also be a single descriptor or requirements file.
pub fn discover(root: &Path, config: &DiscoverConfig) -> Result<Vec<ProjectFiles>> {
    root.metadata().map_err(|source| Error::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let ignore_patterns = config.ignore_patterns.clone();
    let walker = WalkBuilder::new(root)
        .hidden(!config.show_all)
        .ignore(!config.show_all)
        .git_ignore(!config.show_all)
        .git_global(!config.show_all)
        .git_exclude(!config.show_all)
        .require_git(false)
        .max_depth(config.max_depth)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            entry.depth() == 0 || !should_ignore_path(entry.path(), &ignore_patterns)
        })
        .build();

    let mut projects: BTreeMap<PathBuf, ProjectFiles> = BTreeMap::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let descriptor = is_descriptor(path);
        if !descriptor && !is_requirements_file(path) {
            continue;
        }

        let dir = project_root(path);
        debug!("found {} (project {})", path.display(), dir.display());
        let project = projects
            .entry(dir.clone())
            .or_insert_with(|| ProjectFiles::new(dir));
        if descriptor {
            project.setup_py = Some(path.to_path_buf());
        } else {
            project.requirements.push(path.to_path_buf());
        }
    }

    let mut projects: Vec<ProjectFiles> = projects.into_values().collect();
    for project in &mut projects {
        project.requirements.sort();
    }
    Ok(projects)
}
