//! Command-line interface for code-analyzr.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::analyzer::Analyzer;
use crate::batch::{self, FileOutcome};
use crate::config::{self, Configuration, DialectVersion};
use crate::frontend::{self, Frontend};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default configuration file names to search for.
const DEFAULT_CONFIGURATION_NAMES: &[&str] = &["code-analyzr.yaml", ".code-analyzr.yaml"];

/// Extract function signatures and imports from Python source files.
///
/// The result is a JSON metadata document describing every top-level
/// function (argument and return annotations) and every import, ready to be
/// fed to API and container generators.
#[derive(Parser)]
#[command(name = "code-analyzr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a Python file or directory
    #[command(visible_alias = "analyse")]
    Analyze(AnalyzeArgs),
    /// Create a configuration file with the default settings
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub configuration: Option<PathBuf>,

    /// Target Python version, e.g. 3.8
    #[arg(short, long)]
    pub python_version: Option<String>,

    /// Source file encoding
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Comma-separated names of the only functions to extract
    #[arg(short, long)]
    pub analyze: Option<String>,

    /// Comma-separated names of functions to skip
    #[arg(short, long)]
    pub ignore: Option<String>,

    /// Write the result (JSON or pretty text) to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: json or pretty
    #[arg(short, long, default_value = "json")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "code-analyzr.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Discover a configuration file in the current directory.
fn discover_configuration() -> Option<PathBuf> {
    DEFAULT_CONFIGURATION_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Load the configuration file (if any) and apply command-line overrides.
pub fn build_configuration(args: &AnalyzeArgs) -> anyhow::Result<Configuration> {
    let path = match &args.configuration {
        Some(p) => Some(p.clone()),
        None => discover_configuration(),
    };

    let mut configuration = match &path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading configuration");
            Configuration::parse_file(p)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", p.display(), e))?
        }
        None => Configuration::default(),
    };

    if let Some(version) = &args.python_version {
        configuration.python_version = version.parse::<DialectVersion>()?;
    }
    if let Some(encoding) = &args.encoding {
        configuration.encoding = encoding.clone();
    }
    if let Some(names) = &args.analyze {
        configuration.functions_to_analyze = config::parse_name_list(names);
    }
    if let Some(names) = &args.ignore {
        configuration.ignore = config::parse_name_list(names);
    }

    configuration.validate()?;
    Ok(configuration)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "json" && args.format != "pretty" {
        eprintln!(
            "Error: invalid format {:?}, must be 'json' or 'pretty'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let configuration = match build_configuration(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let frontend = match frontend::for_extension("py") {
        Some(f) => f,
        None => {
            eprintln!("Error: no Python front-end compiled in (enable the tree-sitter feature)");
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    if metadata.is_dir() {
        analyze_tree(args, &configuration, frontend.as_ref())
    } else {
        analyze_single(args, &configuration, frontend.as_ref())
    }
}

fn analyze_single(
    args: &AnalyzeArgs,
    configuration: &Configuration,
    frontend: &dyn Frontend,
) -> anyhow::Result<i32> {
    let analyzer = Analyzer::new(configuration.resolve());
    let report = match batch::analyze_file(&args.path, configuration, &analyzer, frontend) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "pretty" => {
            report::write_pretty(&args.path.to_string_lossy(), &report, args.output.as_deref())?
        }
        _ => report::write_json(&report, args.output.as_deref())?,
    }

    if report.is_error() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn analyze_tree(
    args: &AnalyzeArgs,
    configuration: &Configuration,
    frontend: &dyn Frontend,
) -> anyhow::Result<i32> {
    let results = batch::analyze_directory(&args.path, configuration, frontend)?;
    if results.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    match args.format.as_str() {
        "pretty" => report::write_pretty_batch(&results, args.output.as_deref())?,
        _ => report::write_json(&results, args.output.as_deref())?,
    }

    if results.values().all(FileOutcome::is_success) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it or --output to pick another path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, config::DEFAULT_CONFIGURATION_YAML) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to set the target Python version", args.output.display());
    println!(
        "  2. Run: code-analyzr analyze app.py --configuration {}",
        args.output.display()
    );

    Ok(EXIT_SUCCESS)
}
