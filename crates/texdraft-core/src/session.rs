//! Editor session state.
//!
//! An [`EditorSession`] is owned by the caller and threaded through every
//! interaction: `apply(session, action, now)` returns the next session plus
//! the [`Effect`] the caller must carry out (write the source, start a
//! compile, move the editor cursor). The session never touches the
//! filesystem or spawns processes itself.
//!
//! ## Lifecycle
//!
//! ```text
//! Edit ──► dirty ──Save──► WriteSource / WriteAndCompile ──► record_compile
//!                  └─Compile─► WriteAndCompile ───────────────┘
//! ```

use crate::config::EditorConfig;
use crate::domain::{CompileResult, CompileStatus, Result};
use crate::manuscript::{source_digest, Manuscript};
use crate::outline::{extract_outline, OutlineEntry};
use crate::pdf::count_pages;
use chrono::{DateTime, Duration, Local, Utc};
use tracing::debug;

/// User interaction fed into [`EditorSession::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Replace the in-editor text.
    Edit(String),

    /// Jump to the outline entry at this index.
    SelectSection(usize),

    /// The editor has performed the pending jump.
    JumpHandled,

    /// Persist the in-editor text.
    Save,

    /// Compile, saving first if the text has unsaved changes.
    Compile,

    SetAutoCompile(bool),

    NextPage,

    PreviousPage,

    /// One-based page number; clamped to the available range.
    GoToPage(usize),
}

/// Work the caller must perform after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,

    /// Move the editor cursor to this zero-based line.
    JumpTo { line: usize },

    /// Write `text` to the primary source.
    WriteSource { text: String },

    /// Write `text` to the primary source, then compile.
    WriteAndCompile { text: String },

    /// Compile the source as it is on disk.
    Compile,

    /// A compile request was dropped.
    Ignored { reason: String },
}

/// The most recent successful artifact and the page being viewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub total_pages: usize,
    /// One-based.
    pub current_page: usize,
    pub compiled_at: DateTime<Utc>,
    /// Digest of the saved source this artifact was built from.
    pub source_digest: String,
}

/// Most recent non-success compile outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFailure {
    pub status: CompileStatus,
    pub diagnostics: String,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    source_name: String,
    text: String,
    outline: Vec<OutlineEntry>,
    saved_digest: String,
    auto_compile: bool,
    debounce: Duration,
    pending_jump: Option<usize>,
    last_compile_request: Option<DateTime<Utc>>,
    compiling_digest: Option<String>,
    preview: Option<Preview>,
    last_failure: Option<CompileFailure>,
}

impl EditorSession {
    /// Start a session over already-saved source text.
    pub fn new(source_name: impl Into<String>, text: impl Into<String>, config: &EditorConfig) -> Self {
        let text = text.into();
        Self {
            source_name: source_name.into(),
            outline: extract_outline(&text),
            saved_digest: source_digest(&text),
            text,
            auto_compile: config.auto_compile,
            debounce: Duration::milliseconds(
                i64::try_from(config.compile_debounce_ms).unwrap_or(i64::MAX),
            ),
            pending_jump: None,
            last_compile_request: None,
            compiling_digest: None,
            preview: None,
            last_failure: None,
        }
    }

    /// Start a session from the manuscript's current source.
    pub fn from_manuscript(manuscript: &Manuscript, config: &EditorConfig) -> Result<Self> {
        let text = manuscript.read_source()?;
        Ok(Self::new(manuscript.source_name(), text, config))
    }

    /// Advance the session by one user action.
    pub fn apply(mut self, action: SessionAction, now: DateTime<Utc>) -> (Self, Effect) {
        let effect = match action {
            SessionAction::Edit(text) => {
                if text != self.text {
                    self.outline = extract_outline(&text);
                    self.text = text;
                }
                Effect::None
            }
            SessionAction::SelectSection(index) => match self.outline.get(index) {
                Some(entry) => {
                    let line = entry.line;
                    self.pending_jump = Some(line);
                    Effect::JumpTo { line }
                }
                None => Effect::None,
            },
            SessionAction::JumpHandled => {
                self.pending_jump = None;
                Effect::None
            }
            SessionAction::Save => {
                let text = self.text.clone();
                self.saved_digest = source_digest(&text);
                if self.auto_compile && self.request_compile(now) {
                    self.compiling_digest = Some(self.saved_digest.clone());
                    Effect::WriteAndCompile { text }
                } else {
                    Effect::WriteSource { text }
                }
            }
            SessionAction::Compile => {
                if !self.request_compile(now) {
                    Effect::Ignored {
                        reason: "compile requested again within the debounce window".to_string(),
                    }
                } else if self.is_dirty() {
                    let text = self.text.clone();
                    self.saved_digest = source_digest(&text);
                    self.compiling_digest = Some(self.saved_digest.clone());
                    Effect::WriteAndCompile { text }
                } else {
                    self.compiling_digest = Some(self.saved_digest.clone());
                    Effect::Compile
                }
            }
            SessionAction::SetAutoCompile(enabled) => {
                self.auto_compile = enabled;
                Effect::None
            }
            SessionAction::NextPage => {
                if let Some(preview) = self.preview.as_mut() {
                    preview.current_page = (preview.current_page + 1).min(preview.total_pages.max(1));
                }
                Effect::None
            }
            SessionAction::PreviousPage => {
                if let Some(preview) = self.preview.as_mut() {
                    preview.current_page = preview.current_page.saturating_sub(1).max(1);
                }
                Effect::None
            }
            SessionAction::GoToPage(page) => {
                if let Some(preview) = self.preview.as_mut() {
                    preview.current_page = page.clamp(1, preview.total_pages.max(1));
                }
                Effect::None
            }
        };
        debug!(effect = effect_name(&effect), "Session action applied");
        (self, effect)
    }

    fn debounced(&self, now: DateTime<Utc>) -> bool {
        self.last_compile_request
            .map(|last| now - last < self.debounce)
            .unwrap_or(false)
    }

    /// Stamp a compile request, unless it falls inside the debounce window.
    fn request_compile(&mut self, now: DateTime<Utc>) -> bool {
        if self.debounced(now) {
            return false;
        }
        self.last_compile_request = Some(now);
        true
    }

    /// Fold a compile outcome into the session.
    ///
    /// A success replaces the preview and resets to page 1. Any other
    /// outcome records its diagnostics and keeps the previous preview.
    pub fn record_compile(mut self, result: CompileResult) -> Self {
        let status = result.status();
        let compiled_at = result.finished_at();
        let diagnostics = result.diagnostics().to_string();
        let digest = self
            .compiling_digest
            .take()
            .unwrap_or_else(|| self.saved_digest.clone());

        if status == CompileStatus::Success {
            if let Some(artifact) = result.into_artifact() {
                let total_pages = count_pages(&artifact.bytes).max(1);
                self.preview = Some(Preview {
                    filename: artifact.filename,
                    bytes: artifact.bytes,
                    total_pages,
                    current_page: 1,
                    compiled_at,
                    source_digest: digest,
                });
                self.last_failure = None;
                return self;
            }
        }

        self.last_failure = Some(CompileFailure {
            status,
            diagnostics,
        });
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Outline of the in-editor text.
    pub fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }

    pub fn auto_compile(&self) -> bool {
        self.auto_compile
    }

    pub fn pending_jump(&self) -> Option<usize> {
        self.pending_jump
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn last_failure(&self) -> Option<&CompileFailure> {
        self.last_failure.as_ref()
    }

    /// In-editor text differs from what was last saved.
    pub fn is_dirty(&self) -> bool {
        source_digest(&self.text) != self.saved_digest
    }

    /// A preview exists but was built from different text than the editor
    /// now holds.
    pub fn is_preview_stale(&self) -> bool {
        self.preview
            .as_ref()
            .map(|p| p.source_digest != source_digest(&self.text))
            .unwrap_or(false)
    }

    /// One-line summary for a status bar.
    pub fn status_line(&self) -> String {
        match &self.preview {
            Some(preview) => format!(
                "Last compiled: {} | Editing: {} | Pages: {}",
                preview
                    .compiled_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S"),
                self.source_name,
                preview.total_pages
            ),
            None => format!("Ready to compile | Editing: {}", self.source_name),
        }
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::None => "none",
        Effect::JumpTo { .. } => "jump_to",
        Effect::WriteSource { .. } => "write_source",
        Effect::WriteAndCompile { .. } => "write_and_compile",
        Effect::Compile => "compile",
        Effect::Ignored { .. } => "ignored",
    }
}
