//! CLI command definitions
//!
//! Defines the clap commands for the deploy harness.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenario files (the built-in deploy scenario when none are given)
    Run {
        /// Paths to YAML scenario files
        scenarios: Vec<PathBuf>,

        /// Workspace root, overriding the scenario and config file
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Fail a scenario on the first non-zero exit code
        #[arg(long)]
        strict: bool,

        /// Per-command timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Print reports as JSON instead of progress output
        #[arg(long)]
        json: bool,
    },

    /// Render a template with explicit variables
    Render {
        /// Template file (the built-in deploy template if omitted)
        template: Option<PathBuf>,

        /// Variable assignment, repeatable: --var deploy_to=/tmp/t1/deployed
        #[arg(long = "var", short = 'v', value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// Write the output here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// List the variables the template references instead of rendering
        #[arg(long)]
        check: bool,
    },

    /// Reset a fixture workspace and print its layout
    Reset {
        /// Workspace root (defaults to the configured base dir)
        base_dir: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}
