//! Error types for the deploy harness
//!
//! Error messages name the command, path or step involved so a failing
//! scenario report is actionable without re-running it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::template::TemplateError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the deploy harness
#[derive(Error, Debug)]
pub enum Error {
    // === Workspace Errors ===
    #[error("Failed to prepare workspace at '{}': {source}", .path.display())]
    WorkspaceIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // === Template Errors ===
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    // === Process Errors ===
    #[error("Failed to spawn '{command}': {source}")]
    ProcessCrash {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' exited with {}: {stderr}", exit_description(.code))]
    ProcessExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command '{command}' timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("Executable '{name}' not found in PATH")]
    ExecutableNotFound { name: String },

    // === Scenario Errors ===
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Cannot {action} while scenario is {state}")]
    InvalidState { action: String, state: String },

    #[error("No step definition matches '{0}'")]
    UnknownStep(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// Create a workspace IO error for the given path
    pub fn workspace_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WorkspaceIo {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: &str) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error makes continuing the scenario meaningless.
    ///
    /// Non-zero exits are recorded only; everything else aborts.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::ProcessExit { .. })
    }

    /// Short machine-readable code used in JSON reports
    pub fn code(&self) -> &'static str {
        match self {
            Error::WorkspaceIo { .. } | Error::Io(_) | Error::FileRead { .. } => "IO_ERROR",
            Error::Template(_) => "TEMPLATE_ERROR",
            Error::ProcessCrash { .. } | Error::ExecutableNotFound { .. } => "PROCESS_CRASH",
            Error::ProcessExit { .. } => "PROCESS_EXIT",
            Error::Timeout { .. } => "TIMEOUT",
            Error::Assertion(_) => "ASSERTION_FAILED",
            Error::InvalidState { .. } | Error::UnknownStep(_) | Error::Scenario(_) => {
                "SCENARIO_ERROR"
            }
            Error::Config(_) | Error::ConfigParse(_) => "CONFIG_ERROR",
            Error::Json(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_exit_is_not_fatal() {
        let err = Error::ProcessExit {
            command: "git push origin master".to_string(),
            code: Some(1),
            stderr: "rejected".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.code(), "PROCESS_EXIT");
        assert!(err.to_string().contains("code 1"));
    }

    #[test]
    fn test_crash_and_timeout_are_fatal() {
        let crash = Error::ProcessCrash {
            command: "cap deploy:setup".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(crash.is_fatal());

        let timeout = Error::Timeout {
            command: "cap deploy".to_string(),
            secs: 5,
        };
        assert!(timeout.is_fatal());
        assert_eq!(timeout.to_string(), "Command 'cap deploy' timed out after 5 seconds");
    }

    #[test]
    fn test_signal_exit_message() {
        let err = Error::ProcessExit {
            command: "cap deploy".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("a signal"));
    }
}
