//! Manuscript directory discovery and source persistence.
//!
//! A manuscript directory holds exactly one primary `.tex` document plus any
//! class, bibliography and image files it references. The directory doubles
//! as the build tool's working directory.

use crate::domain::{Result, ValidationError};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of the primary source document.
pub const SOURCE_EXTENSION: &str = "tex";

/// A located manuscript: its working directory and primary source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manuscript {
    dir: PathBuf,
    source: PathBuf,
}

impl Manuscript {
    /// Locate the primary source in `dir`.
    ///
    /// When several `.tex` files are present the lexicographically first one
    /// is chosen.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ValidationError::MissingDirectory(dir.to_path_buf()).into());
        }
        if !dir.is_dir() {
            return Err(ValidationError::NotADirectory(dir.to_path_buf()).into());
        }

        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file()
                && path
                    .extension()
                    .map(|e| e == SOURCE_EXTENSION)
                    .unwrap_or(false)
            {
                candidates.push(path);
            }
        }
        candidates.sort();

        let source = candidates
            .into_iter()
            .next()
            .ok_or_else(|| ValidationError::NoSourceFile(dir.to_path_buf()))?;
        debug!(source = %source.display(), "Located manuscript source");

        Ok(Self {
            dir: dir.to_path_buf(),
            source,
        })
    }

    /// Working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Primary source path.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Source file name, e.g. `paper.tex`.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Source base name without extension, e.g. `paper`.
    pub fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn read_source(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.source)?)
    }

    /// Replace the primary source. No other file is touched.
    pub fn save_source(&self, text: &str) -> Result<()> {
        std::fs::write(&self.source, text)?;
        debug!(source = %self.source.display(), bytes = text.len(), "Saved manuscript source");
        Ok(())
    }
}

/// Every file under `dir`, recursively, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = walk(dir)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if dir.is_dir() {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                files.extend(walk(&path)?);
            } else {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// SHA-256 hex digest of source text.
pub fn source_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
