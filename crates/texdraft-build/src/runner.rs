//! External process execution behind a narrow, fakeable seam.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// A single external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    /// Executable name or path.
    pub program: String,

    /// Arguments, in order.
    pub args: Vec<String>,

    /// Execution context for the process.
    pub working_dir: PathBuf,
}

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code (`None` when terminated by a signal).
    pub exit_code: Option<i32>,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ProcessOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, unmodified.
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len());
        text.push_str(&self.stdout);
        text.push_str(&self.stderr);
        text
    }
}

/// Reasons a process did not run to completion.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("process timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),
}

/// Runs an external command to completion or until `timeout` elapses.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        command: &ProcessCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, RunError>;
}

/// Real runner backed by `tokio::process`.
///
/// The child is spawned with `kill_on_drop`, so when the timeout fires and the
/// wait future is dropped the process is killed rather than left running.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: &ProcessCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, RunError> {
        let start = Instant::now();

        let child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| RunError::TimedOut { timeout })?
            .map_err(RunError::Wait)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code();
        debug!(program = %command.program, ?exit_code, duration_ms, "Process exited");

        Ok(ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: Option<i32>) -> ProcessOutput {
        ProcessOutput {
            exit_code,
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
            duration_ms: 1,
        }
    }

    #[test]
    fn test_process_output_success() {
        assert!(output(Some(0)).success());
        assert!(!output(Some(1)).success());
        assert!(!output(None).success());
    }

    #[test]
    fn test_combined_is_stdout_then_stderr() {
        assert_eq!(output(Some(1)).combined(), "out\nerr\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_simple_command() {
        let command = ProcessCommand {
            program: "echo".to_string(),
            args: vec!["hello".to_string()],
            working_dir: std::env::temp_dir(),
        };
        let result = TokioProcessRunner
            .run(&command, Duration::from_secs(30))
            .await
            .expect("run failed");
        assert!(result.success());
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_failing_command() {
        let command = ProcessCommand {
            program: "false".to_string(),
            args: vec![],
            working_dir: std::env::temp_dir(),
        };
        let result = TokioProcessRunner
            .run(&command, Duration::from_secs(30))
            .await
            .expect("run failed");
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let command = ProcessCommand {
            program: "texdraft-no-such-program".to_string(),
            args: vec![],
            working_dir: std::env::temp_dir(),
        };
        let err = TokioProcessRunner
            .run(&command, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
        assert!(err.to_string().contains("texdraft-no-such-program"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let command = ProcessCommand {
            program: "sleep".to_string(),
            args: vec!["30".to_string()],
            working_dir: std::env::temp_dir(),
        };
        let start = Instant::now();
        let err = TokioProcessRunner
            .run(&command, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::TimedOut { timeout } if timeout == Duration::from_secs(1)));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_subsecond_timeout_message_keeps_precision() {
        let command = ProcessCommand {
            program: "sleep".to_string(),
            args: vec!["30".to_string()],
            working_dir: std::env::temp_dir(),
        };
        let err = TokioProcessRunner
            .run(&command, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "process timed out after 200ms");
    }
}
