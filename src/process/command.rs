//! Command descriptions and results

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::{Error, Result};

/// A command to run, fully described
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_directory: PathBuf,
    /// Extra environment variables layered over the inherited environment
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, working_directory: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_directory: working_directory.as_ref().to_path_buf(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-like command line for logs and reports
    pub fn command_line(&self) -> String {
        self.to_string()
    }
}

fn quote(word: &str) -> String {
    if !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c))
    {
        word.to_string()
    } else {
        format!("\"{}\"", word.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Outcome of a command that ran to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// Command line that produced this result
    pub command: String,
    /// Exit code; `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into a `ProcessExit` error
    pub fn check(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::ProcessExit {
                command: self.command,
                code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(code: Option<i32>) -> CommandResult {
        CommandResult {
            command: "git push origin master".to_string(),
            exit_code: code,
            stdout: String::new(),
            stderr: "error: failed to push\n".to_string(),
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let spec = CommandSpec::new("git", "/tmp/t1/app").args(["commit", "-m", "first commit"]);
        assert_eq!(spec.command_line(), "git commit -m \"first commit\"");
    }

    #[test]
    fn test_command_line_keeps_urls_and_tasks() {
        let spec = CommandSpec::new("git", "/tmp")
            .args(["remote", "add", "origin", "file:///tmp/t1/repo"]);
        assert_eq!(spec.to_string(), "git remote add origin file:///tmp/t1/repo");
        let spec = CommandSpec::new("cap", "/tmp").arg("deploy:setup");
        assert_eq!(spec.to_string(), "cap deploy:setup");
    }

    #[test]
    fn test_check_passes_success_through() {
        let ok = result(Some(0)).check().unwrap();
        assert!(ok.success());
    }

    #[test]
    fn test_check_reports_exit_code_and_stderr() {
        match result(Some(128)).check().unwrap_err() {
            Error::ProcessExit {
                command,
                code,
                stderr,
            } => {
                assert_eq!(command, "git push origin master");
                assert_eq!(code, Some(128));
                assert_eq!(stderr, "error: failed to push");
            }
            other => panic!("Expected ProcessExit, got {other:?}"),
        }
        assert!(!result(None).success());
    }

    #[test]
    fn test_result_serializes_duration_in_millis() {
        let json = serde_json::to_value(result(Some(0))).unwrap();
        assert_eq!(json["duration_ms"], 12);
        assert_eq!(json["exit_code"], 0);
    }
}
