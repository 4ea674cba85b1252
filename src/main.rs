//! CLI entry point for setuplens

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use setuplens::discover::is_descriptor;
use setuplens::file_utils::{parse_file_size, read_text_file, set_max_file_size};
use setuplens::venv::default_python;
use setuplens::{
    DiscoverConfig, Error, OutputConfig, PROBE_SCRIPT, PackageDescriptor, Range, ScanConfig,
    dependency_position, discover, extract_dependencies, inline_dependency_position,
    install_requires_position, pin_descriptor, pin_requirements, print_json, print_reports,
    query_interpreter, scan_all,
};

/// Exit code for a descriptor without an inline dependency list.
const EXIT_NOT_INLINE: i32 = 2;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "setuplens")]
#[command(about = "Find the dependencies a Python setup.py actually declares")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum size of files to read (default: 1MB)
    /// Larger files are skipped. Use suffixes: K, M, G (e.g., 5M for 5MB)
    #[arg(long = "max-file-size", value_name = "SIZE", global = true)]
    max_file_size: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report descriptors and requirements files of every project under PATH
    Scan {
        /// Directory (or single file) to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Include hidden and gitignored files
        #[arg(short, long)]
        all: bool,

        /// Ignore files and directories matching pattern (can be used multiple times)
        #[arg(short = 'I', long = "ignore")]
        ignore: Vec<String>,

        /// Descend only N levels deep
        #[arg(short = 'L', long = "level")]
        level: Option<usize>,

        /// Number of parallel workers
        /// (0 = auto-detect, 1 = sequential, N = use N workers)
        #[arg(short = 'j', long = "jobs", default_value = "0")]
        jobs: usize,

        /// Do not parse the requirements file a computed install_requires reads
        #[arg(long = "no-follow")]
        no_follow: bool,

        /// Show counts only, not the dependency lists
        #[arg(short = 'q', long)]
        quiet: bool,

        /// Show line numbers of requirements
        #[arg(short = 'n', long = "line-numbers")]
        line_numbers: bool,

        /// Control color output: auto, always, never
        #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
        color: ColorMode,
    },

    /// Print the inline install_requires of a setup.py, one per line
    ///
    /// Exits with status 2 when the dependencies are computed or absent.
    Deps {
        file: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print where install_requires, or a named dependency, is declared
    Locate {
        file: PathBuf,

        /// Dependency to look for (required for requirements files)
        #[arg(short, long)]
        package: Option<String>,

        /// Output the 0-based range as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pin a dependency to an exact version
    Pin {
        file: PathBuf,
        package: String,
        version: String,

        /// Rewrite FILE in place instead of printing the result
        #[arg(short, long)]
        write: bool,
    },

    /// Exit 0 when the interpreter runs in a virtual environment, 1 otherwise
    Venv {
        /// Interpreter to query (default: python3)
        #[arg(long, value_name = "PATH")]
        python: Option<PathBuf>,

        /// Print the standalone probe script and exit
        #[arg(long = "print-script")]
        print_script: bool,
    },
}

fn main() {
    env_logger::init();
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("setuplens: {:#}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    if let Some(size) = &cli.max_file_size {
        let bytes = parse_file_size(size)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid --max-file-size '{}'", size))?;
        set_max_file_size(bytes);
    }

    match cli.command {
        Commands::Scan {
            path,
            json,
            all,
            ignore,
            level,
            jobs,
            no_follow,
            quiet,
            line_numbers,
            color,
        } => {
            let discover_config = DiscoverConfig {
                show_all: all,
                ignore_patterns: ignore,
                max_depth: level,
            };
            let scan_config = ScanConfig {
                follow_requirements: !no_follow,
                parallel_workers: jobs,
            };

            let projects = discover(&path, &discover_config)
                .with_context(|| format!("cannot access '{}'", path.display()))?;
            debug!("discovered {} projects", projects.len());
            let reports = scan_all(&projects, &scan_config);

            if json {
                print_json(&reports).context("error writing output")?;
            } else {
                let output_config = OutputConfig {
                    use_color: should_use_color(color),
                    show_lines: line_numbers,
                    list_dependencies: !quiet,
                };
                print_reports(&reports, output_config).context("error writing output")?;
            }
            Ok(0)
        }

        Commands::Deps { file, json } => {
            let source = read_text_file(&file)?;
            match extract_dependencies(&source) {
                Ok(deps) => {
                    if json {
                        print_json(&deps).context("error writing output")?;
                    } else {
                        for dep in deps {
                            println!("{}", dep);
                        }
                    }
                    Ok(0)
                }
                Err(e @ (Error::NoInlineDependencies { .. } | Error::MissingInstallRequires)) => {
                    eprintln!("setuplens: {}: {}", file.display(), e);
                    if json {
                        let descriptor = PackageDescriptor::parse(&source)?;
                        print_json(&descriptor.install_requires).context("error writing output")?;
                    }
                    Ok(EXIT_NOT_INLINE)
                }
                Err(e) => Err(e).with_context(|| format!("failed to parse {}", file.display())),
            }
        }

        Commands::Locate {
            file,
            package,
            json,
        } => {
            let text = read_text_file(&file)?;
            let range = locate(&file, &text, package.as_deref())?;
            match range {
                Some(range) if json => print_json(&range).context("error writing output")?,
                Some(range) => println!("{}:{}", file.display(), range.start),
                None => {
                    match &package {
                        Some(package) => eprintln!("setuplens: `{}` not found in {}", package, file.display()),
                        None => eprintln!("setuplens: no install_requires in {}", file.display()),
                    }
                    return Ok(1);
                }
            }
            Ok(0)
        }

        Commands::Pin {
            file,
            package,
            version,
            write,
        } => {
            let text = read_text_file(&file)?;
            let pinned = if is_python_file(&file) {
                pin_descriptor(&text, &package, &version)
            } else {
                pin_requirements(&text, &package, &version)
            };
            let pinned =
                pinned.with_context(|| format!("cannot pin {} in {}", package, file.display()))?;

            if write {
                fs::write(&file, &pinned.content)
                    .with_context(|| format!("failed to write {}", file.display()))?;
                eprintln!(
                    "setuplens: pinned {} {} to {} in {}",
                    pinned.replaced,
                    if pinned.replaced == 1 { "entry" } else { "entries" },
                    version,
                    file.display()
                );
            } else {
                print!("{}", pinned.content);
            }
            Ok(0)
        }

        Commands::Venv {
            python,
            print_script,
        } => {
            if print_script {
                print!("{}", PROBE_SCRIPT);
                return Ok(0);
            }
            let python = python.unwrap_or_else(default_python);
            let cwd = std::env::current_dir().context("cannot determine working directory")?;
            match query_interpreter(&python, &cwd) {
                Ok(info) => {
                    debug!("{:?}", info);
                    Ok(info.exit_code())
                }
                Err(e) => {
                    eprintln!("setuplens: {}", e);
                    Ok(1)
                }
            }
        }
    }
}

fn is_python_file(path: &Path) -> bool {
    is_descriptor(path) || path.extension().is_some_and(|ext| ext == "py")
}

fn locate(file: &Path, text: &str, package: Option<&str>) -> Result<Option<Range>> {
    let range = match (is_python_file(file), package) {
        (true, None) => install_requires_position(text)?,
        (true, Some(package)) => inline_dependency_position(text, package)?,
        (false, Some(package)) => dependency_position(text, package),
        (false, None) => bail!("--package is required for requirements files"),
    };
    Ok(range)
}
