//! Integration tests for the compile orchestrator against real processes.
//!
//! `sh -c <script> <source>` stands in for the build tool: the source path
//! arrives as `$0`, and the script runs inside the working directory.

#![cfg(unix)]

use chrono::Utc;
use std::path::Path;
use std::time::{Duration, Instant};
use texdraft_build::{BuildTool, Compiler, TokioProcessRunner};
use texdraft_core::{
    CompileStatus, EditorConfig, EditorSession, Effect, Manuscript, SessionAction,
    ValidationError,
};
use tempfile::tempdir;

const MINIMAL_DOC: &str = "\\documentclass{article}\n\\begin{document}\n\\section{Introduction}\nTest document.\n\\end{document}\n";

fn stub(script: &str) -> Compiler<TokioProcessRunner> {
    Compiler::new(
        TokioProcessRunner,
        BuildTool::custom("sh", vec!["-c".to_string(), script.to_string()], "pdf"),
    )
}

fn write_manuscript(dir: &Path) -> std::path::PathBuf {
    let source = dir.join("paper.tex");
    std::fs::write(&source, MINIMAL_DOC).unwrap();
    source
}

/// Test: zero exit plus matching output file yields the artifact bytes
#[tokio::test]
async fn test_successful_compile_returns_artifact() {
    let dir = tempdir().unwrap();
    let source = write_manuscript(dir.path());
    let compiler = stub(r#"echo '%PDF-1.4 /Type /Page' > "$(basename "$0" .tex).pdf""#);

    let result = compiler
        .compile(&source, dir.path(), Duration::from_secs(30))
        .await
        .expect("validation failed");

    assert_eq!(result.status(), CompileStatus::Success);
    let artifact = result.into_artifact().expect("artifact");
    assert!(!artifact.bytes.is_empty());
    assert!(artifact.bytes.starts_with(b"%PDF-1.4"));
    assert!(artifact.filename.starts_with("compiled_paper_"));
}

/// Test: non-zero exit reports stdout followed by stderr
#[tokio::test]
async fn test_failed_compile_captures_combined_output() {
    let dir = tempdir().unwrap();
    let source = write_manuscript(dir.path());
    let compiler = stub("echo 'Latexmk: errors'; echo '! Emergency stop.' >&2; exit 12");

    let result = compiler
        .compile(&source, dir.path(), Duration::from_secs(30))
        .await
        .expect("validation failed");

    assert_eq!(result.status(), CompileStatus::Failure);
    assert_eq!(result.diagnostics(), "Latexmk: errors\n! Emergency stop.\n");
    assert!(result.artifact().is_none());
}

/// Test: clean exit without the expected output is still a failure
#[tokio::test]
async fn test_clean_exit_without_output_is_failure() {
    let dir = tempdir().unwrap();
    let source = write_manuscript(dir.path());
    let compiler = stub("echo 'nothing to do'; echo x > other.pdf");

    let result = compiler
        .compile(&source, dir.path(), Duration::from_secs(30))
        .await
        .expect("validation failed");

    assert_eq!(result.status(), CompileStatus::Failure);
    assert_eq!(result.diagnostics(), "nothing to do\n");
}

/// Test: a tool that never returns is cut off near the timeout
#[tokio::test]
async fn test_hanging_tool_times_out_promptly() {
    let dir = tempdir().unwrap();
    let source = write_manuscript(dir.path());
    let compiler = stub("sleep 30");

    let start = Instant::now();
    let result = compiler
        .compile(&source, dir.path(), Duration::from_secs(1))
        .await
        .expect("validation failed");

    assert_eq!(result.status(), CompileStatus::Timeout);
    assert!(
        start.elapsed() < Duration::from_secs(10),
        "caller blocked for {:?}",
        start.elapsed()
    );
}

/// Test: a missing program surfaces as a tool error, not a panic or Err
#[tokio::test]
async fn test_missing_program_is_tool_error() {
    let dir = tempdir().unwrap();
    let source = write_manuscript(dir.path());
    let compiler = Compiler::new(
        TokioProcessRunner,
        BuildTool::custom("texdraft-definitely-not-installed", vec![], "pdf"),
    );

    let result = compiler
        .compile(&source, dir.path(), Duration::from_secs(5))
        .await
        .expect("validation failed");

    assert_eq!(result.status(), CompileStatus::ToolError);
    assert!(!result.diagnostics().is_empty());
}

/// Test: a manuscript opened by relative path still hands the tool a source it can find
#[tokio::test]
async fn test_relative_manuscript_dir_compiles() {
    let cwd = std::env::current_dir().unwrap();
    let dir = tempfile::Builder::new()
        .prefix("texdraft-relative-")
        .tempdir_in(&cwd)
        .unwrap();
    write_manuscript(dir.path());
    let relative = dir.path().strip_prefix(&cwd).unwrap();
    assert!(relative.is_relative());

    let manuscript = Manuscript::open(relative).unwrap();
    let compiler = stub(
        r#"test -f "$0" || { echo "cannot find $0 from $(pwd)"; exit 1; }; echo '%PDF-1.4' > "$(basename "$0" .tex).pdf""#,
    );
    let result = compiler
        .compile_manuscript(&manuscript, Duration::from_secs(30))
        .await
        .expect("validation failed");

    assert_eq!(
        result.status(),
        CompileStatus::Success,
        "diagnostics: {}",
        result.diagnostics()
    );
    assert!(dir.path().join("paper.pdf").is_file());
}

/// Test: missing working directory is rejected before the tool runs
#[tokio::test]
async fn test_missing_working_directory_is_validation_error() {
    let dir = tempdir().unwrap();
    let source = write_manuscript(dir.path());
    let marker = dir.path().join("ran");
    let compiler = stub(&format!("touch {}", marker.display()));

    let err = compiler
        .compile(&source, &dir.path().join("absent"), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, ValidationError::MissingDirectory(_)));
    assert!(!marker.exists(), "build tool must not run");
}

/// Test: edit, save-then-compile through the session, then preview
#[tokio::test]
async fn test_session_save_then_compile_round() {
    let dir = tempdir().unwrap();
    write_manuscript(dir.path());
    let manuscript = Manuscript::open(dir.path()).unwrap();
    let config = EditorConfig {
        auto_compile: true,
        compile_debounce_ms: 0,
    };
    let session = EditorSession::from_manuscript(&manuscript, &config).unwrap();
    assert_eq!(session.outline().len(), 1);

    let edited = MINIMAL_DOC.replace("Test document.", "\\subsection{Method}\nBody.");
    let (session, _) = session.apply(SessionAction::Edit(edited.clone()), Utc::now());
    let (session, effect) = session.apply(SessionAction::Save, Utc::now());
    let text = match effect {
        Effect::WriteAndCompile { text } => text,
        other => panic!("expected save-then-compile, got {other:?}"),
    };
    manuscript.save_source(&text).unwrap();

    let compiler = stub(r#"echo '%PDF-1.4 /Type /Page /Type /Page' > "$(basename "$0" .tex).pdf""#);
    let result = compiler
        .compile_manuscript(&manuscript, Duration::from_secs(30))
        .await
        .unwrap();
    let session = session.record_compile(result);

    assert_eq!(manuscript.read_source().unwrap(), edited);
    assert_eq!(session.outline().len(), 2);
    let preview = session.preview().expect("preview");
    assert_eq!(preview.total_pages, 2);
    assert!(!session.is_preview_stale());
}
