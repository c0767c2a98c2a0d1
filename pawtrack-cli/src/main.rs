// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! pawtrack CLI - Tractive pet tracker locations from the command line.
//!
//! # Examples
//!
//! ```bash
//! # One update cycle, print the locations
//! pawtrack
//!
//! # Poll every scan_interval until Ctrl+C
//! pawtrack run
//!
//! # JSON output
//! pawtrack once --format json --pretty
//!
//! # List trackers on the account
//! pawtrack trackers
//!
//! # Create a config file, password in the keychain
//! pawtrack config init --username cat@example.com --password hunter2 --keychain
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pawtrack_store::StoreError;
use pawtrack_tractive::ScannerError;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, once, run, trackers};

// ============================================================================
// CLI Definition
// ============================================================================

/// pawtrack CLI - Tractive pet tracker poller.
#[derive(Parser)]
#[command(name = "pawtrack")]
#[command(about = "Tractive pet tracker poller")]
#[command(long_about = r#"
pawtrack logs in to the Tractive service, discovers the trackers on the
account and publishes the newest sufficiently accurate position of each.

Configuration is read from the config file (see `pawtrack config path`);
PAWTRACK_USERNAME and PAWTRACK_PASSWORD override it.

Examples:
  pawtrack                       # One cycle (same as `pawtrack once`)
  pawtrack run                   # Poll until Ctrl+C
  pawtrack trackers              # List trackers
  pawtrack --format json once    # JSON output
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'once'.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file to use instead of the default location.
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Poll the trackers every scan interval until interrupted.
    #[command(visible_alias = "r")]
    Run(run::RunArgs),

    /// Run a single update cycle (default if no command specified).
    #[command(visible_alias = "o")]
    Once,

    /// List the trackers registered to the account.
    #[command(visible_alias = "t")]
    Trackers,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Missing or invalid configuration.
    Config = 2,
    /// The Tractive service could not be reached.
    Unreachable = 3,
    /// Login or tracker discovery was refused.
    LoginFailed = 4,
}

impl ExitCode {
    /// Picks the exit code for a command failure.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<ScannerError>() {
            return if e.is_fatal() {
                Self::Unreachable
            } else {
                Self::LoginFailed
            };
        }
        match err.downcast_ref::<StoreError>() {
            Some(e) if e.is_config_error() => Self::Config,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("pawtrack=debug,warn")
    } else {
        EnvFilter::new("pawtrack=info,warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Run(args)) => run::run(args, &cli).await,
        Some(Commands::Once) | None => once::run(&cli).await,
        Some(Commands::Trackers) => trackers::run(&cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
