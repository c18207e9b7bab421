//! Texdraft Build - external build tool invocation
//!
//! Provides the compile orchestrator that:
//! - Validates the working directory and source before doing anything
//! - Runs the build tool (latexmk by default) under a wall-clock timeout
//! - Classifies the outcome as success, failure, timeout or tool error

pub mod compiler;
pub mod fakes;
pub mod runner;
pub mod tool;

// Re-export key types
pub use compiler::Compiler;
pub use runner::{ProcessCommand, ProcessOutput, ProcessRunner, RunError, TokioProcessRunner};
pub use texdraft_core::DEFAULT_TIMEOUT_SECS;
pub use tool::BuildTool;
