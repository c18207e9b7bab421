//! Compile orchestration: validate, invoke the build tool, classify.

use crate::runner::{ProcessRunner, RunError, TokioProcessRunner};
use crate::tool::BuildTool;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use texdraft_core::{
    artifact_filename, Artifact, CompileResult, Manuscript, ValidationError,
};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs a [`BuildTool`] through a [`ProcessRunner`] and turns whatever
/// happens into a [`CompileResult`].
///
/// No locking is done around the working directory. Two overlapping
/// compiles against the same directory race on the tool's intermediate
/// files; callers must serialize compiles per directory.
#[derive(Debug, Clone)]
pub struct Compiler<R = TokioProcessRunner> {
    runner: R,
    tool: BuildTool,
}

impl Compiler<TokioProcessRunner> {
    /// Real processes, latexmk defaults.
    pub fn latexmk() -> Self {
        Self::new(TokioProcessRunner, BuildTool::latexmk())
    }
}

impl<R: ProcessRunner> Compiler<R> {
    pub fn new(runner: R, tool: BuildTool) -> Self {
        Self { runner, tool }
    }

    pub fn tool(&self) -> &BuildTool {
        &self.tool
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Compile `source` with `working_dir` as the tool's execution context.
    ///
    /// Returns `Err` only when a precondition fails, in which case the
    /// build tool is never started. Every other outcome, including spawn
    /// failures and unreadable artifacts, is folded into the returned
    /// `CompileResult`. The source file itself is never written.
    pub async fn compile(
        &self,
        source: &Path,
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<CompileResult, ValidationError> {
        validate(source, working_dir, timeout)?;
        // The tool runs with `working_dir` as its cwd, so a relative source
        // path would be resolved twice.
        let source = absolute(source, ValidationError::UnreadableSource)?;
        let working_dir = absolute(working_dir, ValidationError::MissingDirectory)?;

        let id = Uuid::new_v4();
        let span = info_span!("compile", compile_id = %id, source = %source.display());
        Ok(self
            .run_validated(id, &source, &working_dir, timeout)
            .instrument(span)
            .await)
    }

    /// Compile a located manuscript in its own directory.
    pub async fn compile_manuscript(
        &self,
        manuscript: &Manuscript,
        timeout: Duration,
    ) -> Result<CompileResult, ValidationError> {
        self.compile(manuscript.source(), manuscript.dir(), timeout)
            .await
    }

    async fn run_validated(
        &self,
        id: Uuid,
        source: &Path,
        working_dir: &Path,
        timeout: Duration,
    ) -> CompileResult {
        let start = Instant::now();
        let command = self.tool.command_for(source, working_dir);
        info!(program = %command.program, timeout_ms = timeout.as_millis() as u64, "Starting compile");

        let output = match self.runner.run(&command, timeout).await {
            Ok(output) => output,
            Err(RunError::TimedOut { timeout }) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Compile timed out");
                return CompileResult::timeout(id, timeout, elapsed_ms(start));
            }
            Err(e) => {
                error!(error = %e, "Build tool could not be run");
                return CompileResult::tool_error(id, e.to_string(), elapsed_ms(start));
            }
        };

        let artifact_path = self.tool.artifact_path(source, working_dir);
        if !output.success() {
            info!(exit_code = ?output.exit_code, "Compile failed");
            return CompileResult::failure(id, output.combined(), elapsed_ms(start));
        }
        if !artifact_path.is_file() {
            warn!(artifact = %artifact_path.display(), "Build tool exited cleanly without output");
            let mut log = output.combined();
            if log.is_empty() {
                log = format!(
                    "{} exited successfully but did not produce {}",
                    command.program,
                    artifact_path.display()
                );
            }
            return CompileResult::failure(id, log, elapsed_ms(start));
        }

        let bytes = match tokio::fs::read(&artifact_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, artifact = %artifact_path.display(), "Failed to read artifact");
                return CompileResult::tool_error(
                    id,
                    format!("failed to read {}: {}", artifact_path.display(), e),
                    elapsed_ms(start),
                );
            }
        };

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = artifact_filename(&stem, &self.tool.output_extension, Utc::now());
        info!(artifact = %filename, bytes = bytes.len(), "Compile succeeded");

        CompileResult::success(id, Artifact { filename, bytes }, elapsed_ms(start))
    }
}

fn validate(source: &Path, working_dir: &Path, timeout: Duration) -> Result<(), ValidationError> {
    if !working_dir.exists() {
        return Err(ValidationError::MissingDirectory(working_dir.to_path_buf()));
    }
    if !working_dir.is_dir() {
        return Err(ValidationError::NotADirectory(working_dir.to_path_buf()));
    }
    let writable = std::fs::metadata(working_dir)
        .map(|meta| !meta.permissions().readonly())
        .unwrap_or(false);
    if !writable {
        return Err(ValidationError::ReadOnlyDirectory(working_dir.to_path_buf()));
    }
    if !source.is_file() || std::fs::File::open(source).is_err() {
        return Err(ValidationError::UnreadableSource(source.to_path_buf()));
    }
    if timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout);
    }
    Ok(())
}

fn absolute(
    path: &Path,
    on_error: fn(PathBuf) -> ValidationError,
) -> Result<PathBuf, ValidationError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|_| on_error(path.to_path_buf()))
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
