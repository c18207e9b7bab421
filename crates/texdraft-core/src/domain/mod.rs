//! Domain models for Texdraft.
//!
//! Canonical definitions for the compile workflow:
//! - `CompileResult`: Immutable outcome of one build tool invocation
//! - `Artifact`: The binary output handed to the caller on success
//! - `ValidationError` / `TexdraftError`: Error taxonomy

pub mod compile;
pub mod error;

// Re-export main types and errors
pub use compile::{artifact_filename, Artifact, CompileResult, CompileStatus};
pub use error::{Result, TexdraftError, ValidationError};
