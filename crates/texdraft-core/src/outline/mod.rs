//! Heading outline extraction for LaTeX sources.
//!
//! The scanner is line-oriented and regex-based. It finds sectioning commands
//! (`\part` through `\subparagraph`, starred or not) followed by a braced
//! title, and reports them in source order.
//!
//! ## Known limitations
//!
//! This is a best-effort heading scanner, not a LaTeX parser:
//! - the title ends at the first `}`, so `\section{A \emph{B} C}` yields `A \emph{B`
//! - commented-out headings (`% \section{Old}`) are still reported
//! - headings inside `verbatim`-like environments are still reported
//! - a title argument spanning several lines is not recognized
//! - only the first heading on a line is reported

mod level;
mod tree;

pub use level::SectionLevel;
pub use tree::{build_tree, extract_outline_tree, OutlineNode};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One heading in a flat outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading text, verbatim between the braces. May be empty.
    pub title: String,

    /// Sectioning level.
    pub level: SectionLevel,

    /// Zero-based line index in the source.
    pub line: usize,

    /// Indentation depth derived from `level`.
    pub depth: usize,
}

impl OutlineEntry {
    /// Create an entry, deriving `depth` from `level`.
    pub fn new(title: impl Into<String>, level: SectionLevel, line: usize) -> Self {
        Self {
            title: title.into(),
            level,
            line,
            depth: level.depth(),
        }
    }
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\\(part|chapter|section|subsection|subsubsection|paragraph|subparagraph)\*?\s*\{([^}]*)\}",
        )
        .expect("heading pattern is a valid regex")
    })
}

/// Match the first heading command on a single line.
fn match_heading(line: &str) -> Option<(SectionLevel, &str)> {
    let caps = heading_pattern().captures(line)?;
    let level = SectionLevel::from_command(caps.get(1)?.as_str())?;
    let title = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    Some((level, title))
}

/// Extract a flat outline, one entry per line that carries a heading.
///
/// Pure and deterministic; heading-free input yields an empty vector.
pub fn extract_outline(source: &str) -> Vec<OutlineEntry> {
    source
        .split('\n')
        .enumerate()
        .filter_map(|(line, text)| {
            let text = text.strip_suffix('\r').unwrap_or(text);
            match_heading(text).map(|(level, title)| OutlineEntry::new(title, level, line))
        })
        .collect()
}

/// Navigation label for an entry: `"<title> (line <n>)"` with a one-based line.
pub fn section_label(entry: &OutlineEntry) -> String {
    format!("{} (line {})", entry.title, entry.line + 1)
}

/// Recover the zero-based line from a label produced by [`section_label`].
///
/// Titles may themselves contain `(line `, so the last occurrence wins.
pub fn parse_section_label(label: &str) -> Option<usize> {
    let (_, tail) = label.rsplit_once("(line ")?;
    let number: usize = tail.strip_suffix(')')?.trim().parse().ok()?;
    number.checked_sub(1)
}
