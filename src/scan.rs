//! Per-project dependency reports
//!
//! A project's descriptor is extracted first. When it computes its
//! dependencies from a requirements file that can be traced, that file is
//! parsed too and marked as followed, so the report always shows where the
//! dependency list actually lives.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::descriptor::{DependencyDeclaration, PackageDescriptor};
use crate::discover::ProjectFiles;
use crate::error::Result;
use crate::file_utils::read_text_file;
use crate::requirements::{Requirement, parse_requirements, referenced_files};
use crate::source::{Position, position_at};

/// Configuration for scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Parse the requirements file an external `install_requires` reads.
    pub follow_requirements: bool,
    /// Number of parallel workers.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_requirements: true,
            parallel_workers: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorReport {
    pub path: PathBuf,
    pub install_requires: DependencyDeclaration,
    /// Where `install_requires=` starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementsReport {
    pub path: PathBuf,
    /// Reached by tracing the descriptor's `install_requires`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub followed: bool,
    pub requirements: Vec<Requirement>,
    /// Files pulled in with `-r`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    pub root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_py: Option<DescriptorReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<RequirementsReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ProjectReport {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            name: None,
            version: None,
            setup_py: None,
            requirements: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// The specifiers the project installs: the inline list, or the
    /// followed requirements file when the descriptor reads one.
    pub fn dependencies(&self) -> Vec<&str> {
        if let Some(inline) = self.setup_py.as_ref().and_then(|d| d.install_requires.inline()) {
            return inline.iter().map(|d| d.specifier.as_str()).collect();
        }
        self.requirements
            .iter()
            .filter(|r| r.followed)
            .flat_map(|r| r.requirements.iter().map(|req| req.specifier.as_str()))
            .collect()
    }
}

fn scan_descriptor(path: &Path) -> Result<(PackageDescriptor, Option<Position>)> {
    let source = read_text_file(path)?;
    let descriptor = PackageDescriptor::parse(&source)?;
    let position = descriptor
        .keyword_span
        .map(|span| position_at(&source, span.start));
    Ok((descriptor, position))
}

fn scan_requirements(path: &Path, followed: bool) -> Result<RequirementsReport> {
    let content = read_text_file(path)?;
    Ok(RequirementsReport {
        path: path.to_path_buf(),
        followed,
        requirements: parse_requirements(&content),
        includes: referenced_files(&content),
    })
}

/// Build the report for one project.
pub fn scan_project(project: &ProjectFiles, config: &ScanConfig) -> ProjectReport {
    let mut report = ProjectReport::new(project.root.clone());
    let mut followed: Option<PathBuf> = None;

    if let Some(setup_py) = &project.setup_py {
        match scan_descriptor(setup_py) {
            Ok((descriptor, position)) => {
                if let DependencyDeclaration::External {
                    requirements_file: Some(file),
                    ..
                } = &descriptor.install_requires
                {
                    if config.follow_requirements {
                        let dir = setup_py.parent().unwrap_or(Path::new("."));
                        followed = Some(dir.join(file));
                    }
                }
                report.name = descriptor.name;
                report.version = descriptor.version;
                report.setup_py = Some(DescriptorReport {
                    path: setup_py.clone(),
                    install_requires: descriptor.install_requires,
                    position,
                });
            }
            Err(err) => {
                warn!("{}: {}", setup_py.display(), err);
                report.errors.push(format!("{}: {}", setup_py.display(), err));
            }
        }
    }

    for path in &project.requirements {
        let is_followed = followed.as_deref() == Some(path.as_path());
        match scan_requirements(path, is_followed) {
            Ok(requirements) => report.requirements.push(requirements),
            Err(err) => report.errors.push(format!("{}: {}", path.display(), err)),
        }
    }

    if let Some(path) = followed {
        if !project.requirements.contains(&path) {
            debug!("following {} outside the discovered files", path.display());
            match scan_requirements(&path, true) {
                Ok(requirements) => report.requirements.push(requirements),
                Err(err) => report.errors.push(format!("{}: {}", path.display(), err)),
            }
        }
    }

    report
}

/// Build reports for all projects, in the order given.
pub fn scan_all(projects: &[ProjectFiles], config: &ScanConfig) -> Vec<ProjectReport> {
    if config.parallel_workers == 1 {
        return projects.iter().map(|p| scan_project(p, config)).collect();
    }

    if config.parallel_workers == 0 {
        // Auto-detect: use rayon's default thread pool
        return projects.par_iter().map(|p| scan_project(p, config)).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel_workers)
        .build()
    {
        Ok(pool) => pool.install(|| projects.par_iter().map(|p| scan_project(p, config)).collect()),
        Err(err) => {
            // Fall back to rayon's global pool if custom pool creation fails
            debug!("custom thread pool unavailable: {}", err);
            projects.par_iter().map(|p| scan_project(p, config)).collect()
        }
    }
}
