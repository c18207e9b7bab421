//! In-memory fakes for the process seam (testing only)
//!
//! `FakeProcessRunner` satisfies the `ProcessRunner` contract without
//! starting any external program.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::runner::{ProcessCommand, ProcessOutput, ProcessRunner, RunError};

#[derive(Debug, Clone)]
enum Behavior {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
        artifact: Option<(String, Vec<u8>)>,
    },
    Hang,
    SpawnFailure(String),
}

/// Scripted runner that records every command it receives.
#[derive(Debug)]
pub struct FakeProcessRunner {
    behavior: Behavior,
    calls: Mutex<Vec<ProcessCommand>>,
}

impl FakeProcessRunner {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Exit immediately with `code` and no output.
    pub fn exiting(code: i32) -> Self {
        Self::with_behavior(Behavior::Exit {
            code,
            stdout: String::new(),
            stderr: String::new(),
            artifact: None,
        })
    }

    /// Never exit; the runner reports a timeout once `timeout` elapses.
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    /// Fail before the process starts.
    pub fn failing_to_spawn(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::SpawnFailure(message.into()))
    }

    pub fn with_stdout(mut self, text: impl Into<String>) -> Self {
        if let Behavior::Exit { stdout, .. } = &mut self.behavior {
            *stdout = text.into();
        }
        self
    }

    pub fn with_stderr(mut self, text: impl Into<String>) -> Self {
        if let Behavior::Exit { stderr, .. } = &mut self.behavior {
            *stderr = text.into();
        }
        self
    }

    /// Write `bytes` to `<working_dir>/<name>` on every run, as a real tool
    /// would.
    pub fn with_artifact(mut self, name: impl Into<String>, bytes: &[u8]) -> Self {
        if let Behavior::Exit { artifact, .. } = &mut self.behavior {
            *artifact = Some((name.into(), bytes.to_vec()));
        }
        self
    }

    /// Commands received so far, in order.
    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(
        &self,
        command: &ProcessCommand,
        timeout: Duration,
    ) -> Result<ProcessOutput, RunError> {
        self.calls.lock().unwrap().push(command.clone());

        match &self.behavior {
            Behavior::Exit {
                code,
                stdout,
                stderr,
                artifact,
            } => {
                if let Some((name, bytes)) = artifact {
                    std::fs::write(command.working_dir.join(name), bytes).map_err(RunError::Wait)?;
                }
                Ok(ProcessOutput {
                    exit_code: Some(*code),
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                    duration_ms: 0,
                })
            }
            Behavior::Hang => {
                let _ = tokio::time::timeout(timeout, std::future::pending::<()>()).await;
                Err(RunError::TimedOut { timeout })
            }
            Behavior::SpawnFailure(message) => Err(RunError::Spawn {
                program: command.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, message.clone()),
            }),
        }
    }
}
