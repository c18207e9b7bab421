//! Domain-level error taxonomy for Texdraft.

use std::path::PathBuf;

/// Precondition failures detected before any work begins.
///
/// These are terminal: nothing has been written and no external tool has run.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("working directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("working directory is not writable: {}", .0.display())]
    ReadOnlyDirectory(PathBuf),

    #[error("no .tex file found in {}", .0.display())]
    NoSourceFile(PathBuf),

    #[error("source file not found or unreadable: {}", .0.display())]
    UnreadableSource(PathBuf),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Texdraft domain errors.
#[derive(Debug, thiserror::Error)]
pub enum TexdraftError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("config error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Texdraft domain operations.
pub type Result<T> = std::result::Result<T, TexdraftError>;
