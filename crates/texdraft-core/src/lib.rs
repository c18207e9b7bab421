//! Texdraft Core Library
//!
//! Outline extraction, manuscript discovery, compile result types and the
//! caller-owned editor session. Process execution lives in `texdraft-build`.

pub mod config;
pub mod domain;
pub mod manuscript;
pub mod outline;
pub mod pdf;
pub mod session;
pub mod telemetry;

pub use config::{
    BuildConfig, EditorConfig, ManuscriptConfig, TexdraftConfig, CONFIG_FILE_NAME,
    DEFAULT_TIMEOUT_SECS,
};
pub use domain::{
    artifact_filename, Artifact, CompileResult, CompileStatus, Result, TexdraftError,
    ValidationError,
};
pub use manuscript::{list_files, source_digest, Manuscript};
pub use outline::{
    build_tree, extract_outline, extract_outline_tree, parse_section_label, section_label,
    OutlineEntry, OutlineNode, SectionLevel,
};
pub use pdf::count_pages;
pub use session::{CompileFailure, EditorSession, Effect, Preview, SessionAction};
pub use telemetry::init_tracing;

/// Texdraft version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
