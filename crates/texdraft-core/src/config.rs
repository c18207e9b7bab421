//! Effective configuration: defaults, `texdraft.toml`, then environment.
//!
//! ```toml
//! [manuscript]
//! dir = "manuscript"
//!
//! [build]
//! program = "latexmk"
//! args = ["-pdf", "-pdflatex=pdflatex", "-interaction=nonstopmode"]
//! output_extension = "pdf"
//! timeout_secs = 120
//!
//! [editor]
//! auto_compile = true
//! compile_debounce_ms = 500
//! ```
//!
//! Environment overrides:
//! - TEXDRAFT_MANUSCRIPT_DIR
//! - TEXDRAFT_BUILD_PROGRAM
//! - TEXDRAFT_TIMEOUT_SECS

use crate::domain::{Result, TexdraftError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "texdraft.toml";

/// Wall-clock budget for one compile.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexdraftConfig {
    pub manuscript: ManuscriptConfig,
    pub build: BuildConfig,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManuscriptConfig {
    /// Working directory holding the primary `.tex` file.
    pub dir: PathBuf,
}

impl Default for ManuscriptConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("manuscript"),
        }
    }
}

/// External build tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub program: String,
    /// Arguments placed before the source path.
    pub args: Vec<String>,
    pub output_extension: String,
    pub timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: "latexmk".to_string(),
            args: vec![
                "-pdf".to_string(),
                "-pdflatex=pdflatex".to_string(),
                "-interaction=nonstopmode".to_string(),
            ],
            output_extension: "pdf".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Compile right after every save.
    pub auto_compile: bool,
    /// Compile requests closer together than this are ignored.
    pub compile_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            auto_compile: true,
            compile_debounce_ms: 500,
        }
    }
}

impl TexdraftConfig {
    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file; using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|message| TexdraftError::Config {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parse TOML text. Unset keys keep their defaults.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Apply `TEXDRAFT_*` environment variables.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("TEXDRAFT_MANUSCRIPT_DIR") {
            self.manuscript.dir = PathBuf::from(dir);
        }
        if let Some(program) = lookup("TEXDRAFT_BUILD_PROGRAM") {
            self.build.program = program;
        }
        if let Some(raw) = lookup("TEXDRAFT_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.build.timeout_secs = secs,
                _ => warn!(value = %raw, "Ignoring invalid TEXDRAFT_TIMEOUT_SECS"),
            }
        }
        self
    }
}
