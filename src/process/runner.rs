//! Process runner built on tokio

use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

use super::{CommandResult, CommandSpec};
use crate::common::{Error, Result};

/// Something that can run a command to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` and wait for it to exit
    ///
    /// Non-zero exits are returned as results. Spawn failures are
    /// `ProcessCrash`, overruns are `Timeout`.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;
}

/// Runs real child processes with a per-command timeout
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let command_line = spec.command_line();
        tracing::debug!(
            command = %command_line,
            cwd = %spec.working_directory.display(),
            "Running command"
        );

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.working_directory)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let child = cmd.spawn().map_err(|e| Error::ProcessCrash {
            command: command_line.clone(),
            source: e,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::ProcessCrash {
                    command: command_line,
                    source: e,
                })
            }
            Err(_) => {
                tracing::warn!(command = %command_line, secs = self.timeout.as_secs(), "Command timed out");
                return Err(Error::Timeout {
                    command: command_line,
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let result = CommandResult {
            command: command_line,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: started.elapsed(),
        };

        if !result.stdout.is_empty() {
            tracing::debug!(command = %result.command, stdout = %result.stdout.trim_end());
        }
        if !result.stderr.is_empty() {
            tracing::debug!(command = %result.command, stderr = %result.stderr.trim_end());
        }
        if !result.success() {
            tracing::warn!(command = %result.command, exit_code = ?result.exit_code, "Command failed");
        }

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn runner() -> ProcessRunner {
        ProcessRunner::new(Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        let dir = tempdir().unwrap();
        let spec = CommandSpec::new("sh", dir.path()).args(["-c", "echo out; echo err >&2; exit 3"]);

        let result = runner().run(&spec).await.unwrap();
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_runs_in_working_directory_without_changing_ours() {
        let dir = tempdir().unwrap();
        let before = std::env::current_dir().unwrap();
        let spec = CommandSpec::new("sh", dir.path()).args(["-c", "touch created-here"]);

        runner().run(&spec).await.unwrap().check().unwrap();

        assert!(dir.path().join("created-here").exists());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[tokio::test]
    async fn test_passes_extra_environment() {
        let dir = tempdir().unwrap();
        let spec = CommandSpec::new("sh", dir.path())
            .args(["-c", "printf %s \"$HARNESS_PROBE\""])
            .env("HARNESS_PROBE", "hello");

        let result = runner().run(&spec).await.unwrap();
        assert_eq!(result.stdout, "hello");
    }

    #[tokio::test]
    async fn test_missing_program_is_crash() {
        let dir = tempdir().unwrap();
        let spec = CommandSpec::new("definitely-not-a-real-tool-4242", dir.path()).arg("deploy:setup");

        let err = runner().run(&spec).await.unwrap_err();
        match err {
            Error::ProcessCrash { command, .. } => {
                assert_eq!(command, "definitely-not-a-real-tool-4242 deploy:setup")
            }
            other => panic!("Expected ProcessCrash, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let dir = tempdir().unwrap();
        let runner = ProcessRunner::new(Duration::from_millis(200));
        let spec = CommandSpec::new("sleep", dir.path()).arg("5");

        let started = Instant::now();
        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_commands_complete_in_sequence() {
        let dir = tempdir().unwrap();
        let runner = runner();

        runner
            .run(&CommandSpec::new("sh", dir.path()).args(["-c", "sleep 0.2; echo one > log"]))
            .await
            .unwrap();
        let result = runner
            .run(&CommandSpec::new("cat", dir.path()).arg("log"))
            .await
            .unwrap();
        assert_eq!(result.stdout, "one\n");
    }
}
