//! Compile outcomes.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Four-way classification of a compile attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompileStatus {
    /// Tool exited zero and the expected artifact exists.
    Success,

    /// Tool exited non-zero, or exited zero without producing the artifact.
    Failure,

    /// Tool exceeded its wall-clock budget and was terminated.
    Timeout,

    /// The tool could not be run or its results could not be read.
    ToolError,
}

impl std::fmt::Display for CompileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompileStatus::Success => "success",
            CompileStatus::Failure => "failure",
            CompileStatus::Timeout => "timeout",
            CompileStatus::ToolError => "tool_error",
        };
        f.write_str(s)
    }
}

/// Output file produced by a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested download name, unique per compile second.
    pub filename: String,

    /// Full artifact contents.
    pub bytes: Vec<u8>,
}

/// Outcome of one compile invocation. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct CompileResult {
    id: Uuid,
    status: CompileStatus,
    artifact: Option<Artifact>,
    diagnostics: String,
    finished_at: DateTime<Utc>,
    duration_ms: u64,
}

impl CompileResult {
    fn new(
        id: Uuid,
        status: CompileStatus,
        artifact: Option<Artifact>,
        diagnostics: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            id,
            status,
            artifact,
            diagnostics,
            finished_at: Utc::now(),
            duration_ms,
        }
    }

    /// Successful compile carrying the artifact.
    pub fn success(id: Uuid, artifact: Artifact, duration_ms: u64) -> Self {
        Self::new(id, CompileStatus::Success, Some(artifact), String::new(), duration_ms)
    }

    /// Tool ran but did not produce a usable artifact. `log` is the combined
    /// stdout/stderr text, unmodified.
    pub fn failure(id: Uuid, log: String, duration_ms: u64) -> Self {
        Self::new(id, CompileStatus::Failure, None, log, duration_ms)
    }

    /// Tool was terminated once `timeout` elapsed.
    pub fn timeout(id: Uuid, timeout: Duration, duration_ms: u64) -> Self {
        Self::new(
            id,
            CompileStatus::Timeout,
            None,
            format!("compilation timed out after {}", describe_timeout(timeout)),
            duration_ms,
        )
    }

    /// Unexpected fault while invoking the tool or reading its output.
    pub fn tool_error(id: Uuid, message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(id, CompileStatus::ToolError, None, message.into(), duration_ms)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> CompileStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == CompileStatus::Success
    }

    /// Borrow the artifact (present only on success).
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Hand the artifact to the caller by value.
    pub fn into_artifact(self) -> Option<Artifact> {
        self.artifact
    }

    /// Build log for failures, or the error message for timeouts and tool
    /// errors. Empty on success.
    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// Whole seconds when the timeout has no fractional part, milliseconds
/// otherwise.
fn describe_timeout(timeout: Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{} ms", timeout.as_millis())
    }
}

/// `compiled_<stem>_<YYYYmmdd_HHMMSS>.<ext>`, timestamped in local time.
pub fn artifact_filename(stem: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!(
        "compiled_{}_{}.{}",
        stem,
        at.with_timezone(&Local).format("%Y%m%d_%H%M%S"),
        extension
    )
}
