//! lintcheck CLI tool.
//!
//! Usage:
//! ```bash
//! lintcheck check [OPTIONS] [PATH]
//! lintcheck [OPTIONS] [PATH]
//! lintcheck list-rules
//! lintcheck init
//! ```

use clap::{Args, Parser, Subcommand};
use lintcheck_core::Severity;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit code for fatal errors (missing root, bad config).
const EXIT_FATAL: u8 = 2;

/// Style linter for RSpec-style test files
#[derive(Parser)]
#[command(name = "lintcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LINTCHECK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for the implicit `check` when no subcommand is given
    #[command(flatten)]
    check: CheckArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check(CheckArgs),

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Options of the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File or directory to analyze (default: `scan.root` from config, or `.`)
    pub path: Option<PathBuf>,

    /// Lowest severity that fails the run
    #[arg(long, value_name = "SEVERITY")]
    pub severity_fail: Option<FailLevel>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Only run specific rules, by name or code (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Rule preset: recommended, strict or minimal
    #[arg(long)]
    pub preset: Option<String>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

/// Severity threshold accepted by `--severity-fail`.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FailLevel {
    /// Fail on errors only.
    Error,
    /// Fail on warnings and errors.
    Warning,
    /// Fail on any violation.
    Info,
}

impl From<FailLevel> for Severity {
    fn from(level: FailLevel) -> Self {
        match level {
            FailLevel::Error => Self::Error,
            FailLevel::Warning => Self::Warning,
            FailLevel::Info => Self::Info,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Check(args)) => commands::check::run(&args, cli.config.as_deref()),
        None => commands::check::run(&cli.check, cli.config.as_deref()),
        Some(Commands::ListRules) => commands::list_rules::run().map(|()| 0),
        Some(Commands::Init { force }) => commands::init::run(force).map(|()| 0),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
