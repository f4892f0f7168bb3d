//! Deploy harness CLI
//!
//! Runs Given/When/Then scenarios that scaffold an app, render its deploy
//! configuration, run the external deploy tool, and check the result.

use clap::Parser;
use harness::{cli, commands, common::logging};
use commands::Commands;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deploy-harness", about = "Scenario-driven test harness for deployment tools")]
#[command(version, long_about = None)]
struct Cli {
    /// Verbose output (debug logging and every command run)
    #[arg(long, global = true)]
    verbose: bool,

    /// Also log to a file (default location if no path is given)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_file = match cli.log_file {
        Some(Some(path)) => Some(path),
        Some(None) => logging::default_log_path(),
        None => None,
    };
    if let Some(path) = logging::init_cli(cli.verbose, log_file.as_deref()) {
        tracing::info!("Logging to {}", path.display());
    }

    if let Err(e) = cli::dispatch(cli.command, cli.verbose).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
