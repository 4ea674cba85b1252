//! Console formatter for scan reports

use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::descriptor::DependencyDeclaration;
use crate::scan::{DescriptorReport, ProjectReport, RequirementsReport};

use super::config::OutputConfig;

/// Writes scan reports as an indented listing, one block per project.
pub struct ConsoleFormatter<W: WriteColor> {
    config: OutputConfig,
    out: W,
}

impl ConsoleFormatter<StandardStream> {
    /// Formatter writing to stdout.
    pub fn stdout(config: OutputConfig) -> Self {
        let choice = if config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(StandardStream::stdout(choice), config)
    }
}

impl<W: WriteColor> ConsoleFormatter<W> {
    pub fn new(out: W, config: OutputConfig) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn colored(&mut self, color: Option<Color>, bold: bool, text: &str) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        self.out.set_color(&spec)?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    pub fn write_reports(&mut self, reports: &[ProjectReport]) -> io::Result<()> {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            self.write_report(report)?;
        }
        self.write_summary(reports)
    }

    pub fn write_report(&mut self, report: &ProjectReport) -> io::Result<()> {
        self.colored(None, true, &report.root.display().to_string())?;
        if let Some(name) = &report.name {
            write!(self.out, "  ")?;
            self.colored(Some(Color::Cyan), false, name)?;
            if let Some(version) = &report.version {
                write!(self.out, " {}", version)?;
            }
        }
        writeln!(self.out)?;

        if let Some(setup_py) = &report.setup_py {
            self.write_descriptor(&report.root, setup_py)?;
        }
        for requirements in &report.requirements {
            self.write_requirements(&report.root, requirements)?;
        }
        for error in &report.errors {
            write!(self.out, "  ")?;
            self.colored(Some(Color::Red), true, "error")?;
            writeln!(self.out, ": {}", error)?;
        }
        Ok(())
    }

    fn write_descriptor(&mut self, root: &Path, report: &DescriptorReport) -> io::Result<()> {
        write!(self.out, "  ")?;
        self.colored(Some(Color::Blue), true, &relative(root, &report.path))?;
        if let Some(position) = report.position {
            write!(self.out, ":{}", position)?;
        }

        match &report.install_requires {
            DependencyDeclaration::Inline { dependencies } => {
                writeln!(self.out, "  {} inline", count(dependencies.len(), "dependency", "dependencies"))?;
                if self.config.list_dependencies {
                    for dep in dependencies {
                        writeln!(self.out, "    {}", dep.specifier)?;
                    }
                }
            }
            DependencyDeclaration::External {
                expression,
                requirements_file,
            } => {
                write!(self.out, "  computed by ")?;
                self.colored(Some(Color::Yellow), false, expression)?;
                if let Some(file) = requirements_file {
                    write!(self.out, " (reads {})", file)?;
                }
                writeln!(self.out)?;
            }
            DependencyDeclaration::Absent => {
                writeln!(self.out, "  no install_requires")?;
            }
        }
        Ok(())
    }

    fn write_requirements(&mut self, root: &Path, report: &RequirementsReport) -> io::Result<()> {
        write!(self.out, "  ")?;
        self.colored(Some(Color::Blue), true, &relative(root, &report.path))?;
        write!(
            self.out,
            "  {}",
            count(report.requirements.len(), "requirement", "requirements")
        )?;
        if report.followed {
            write!(self.out, " ")?;
            self.colored(Some(Color::Green), false, "(followed)")?;
        }
        writeln!(self.out)?;

        for include in &report.includes {
            writeln!(self.out, "    -r {}", include)?;
        }
        if self.config.list_dependencies {
            for req in &report.requirements {
                if self.config.show_lines {
                    write!(self.out, "    {:>4}  ", req.line + 1)?;
                } else {
                    write!(self.out, "    ")?;
                }
                writeln!(self.out, "{}", req.specifier)?;
            }
        }
        Ok(())
    }

    pub fn write_summary(&mut self, reports: &[ProjectReport]) -> io::Result<()> {
        let descriptors = reports.iter().filter(|r| r.setup_py.is_some()).count();
        let requirements: usize = reports.iter().map(|r| r.requirements.len()).sum();
        let errors: usize = reports.iter().map(|r| r.errors.len()).sum();

        writeln!(self.out)?;
        write!(
            self.out,
            "{}, {}, {}",
            count(reports.len(), "project", "projects"),
            count(descriptors, "descriptor", "descriptors"),
            count(requirements, "requirements file", "requirements files"),
        )?;
        if errors > 0 {
            write!(self.out, ", ")?;
            self.colored(Some(Color::Red), false, &count(errors, "error", "errors"))?;
        }
        writeln!(self.out)
    }
}

/// Print reports to stdout.
pub fn print_reports(reports: &[ProjectReport], config: OutputConfig) -> io::Result<()> {
    let mut formatter = ConsoleFormatter::stdout(config);
    formatter.write_reports(reports)
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}
