//! Logging and tracing configuration
//!
//! Logs go to stderr so scenario progress on stdout stays readable.
//! An optional log file receives the full detail of every run.

use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths;

/// Initialize tracing for the CLI
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate (DEBUG with `verbose`), WARN for dependencies.
/// Returns the log file path if file logging was set up.
pub fn init_cli(verbose: bool, log_file: Option<&Path>) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("harness=debug,deploy_harness=debug,warn")
        } else {
            EnvFilter::new("harness=info,deploy_harness=info,warn")
        }
    });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let file = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some((path.to_path_buf(), file)),
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            None
        }
    });
    let log_path = file.as_ref().map(|(path, _)| path.clone());

    let file_layer = file.map(|(_, file)| {
        fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    log_path
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Default log file location, used when `--log-file` is given without a path
pub fn default_log_path() -> Option<PathBuf> {
    paths::log_dir().map(|d| d.join("harness.log"))
}
