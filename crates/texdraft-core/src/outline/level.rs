//! Sectioning levels recognized by the outline scanner.

use serde::{Deserialize, Serialize};

/// LaTeX sectioning commands, ordered from shallowest to deepest.
///
/// The derived `Ord` follows declaration order, so `Part < Chapter < ... <
/// Subparagraph` and "deeper" always compares greater.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionLevel {
    /// \part
    Part,

    /// \chapter
    Chapter,

    /// \section
    Section,

    /// \subsection
    Subsection,

    /// \subsubsection
    Subsubsection,

    /// \paragraph
    Paragraph,

    /// \subparagraph
    Subparagraph,
}

impl SectionLevel {
    /// Every level in nesting order.
    pub const ALL: [SectionLevel; 7] = [
        SectionLevel::Part,
        SectionLevel::Chapter,
        SectionLevel::Section,
        SectionLevel::Subsection,
        SectionLevel::Subsubsection,
        SectionLevel::Paragraph,
        SectionLevel::Subparagraph,
    ];

    /// Command name without the leading backslash.
    pub fn command(&self) -> &'static str {
        match self {
            SectionLevel::Part => "part",
            SectionLevel::Chapter => "chapter",
            SectionLevel::Section => "section",
            SectionLevel::Subsection => "subsection",
            SectionLevel::Subsubsection => "subsubsection",
            SectionLevel::Paragraph => "paragraph",
            SectionLevel::Subparagraph => "subparagraph",
        }
    }

    /// Parse a command name (no backslash, no star).
    pub fn from_command(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|level| level.command() == name)
    }

    /// Display indentation depth. Only meaningful for ordering.
    pub fn depth(&self) -> usize {
        match self {
            SectionLevel::Part => 0,
            SectionLevel::Chapter => 1,
            SectionLevel::Section => 2,
            SectionLevel::Subsection => 3,
            SectionLevel::Subsubsection => 4,
            SectionLevel::Paragraph => 5,
            SectionLevel::Subparagraph => 6,
        }
    }
}

impl std::fmt::Display for SectionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered_shallow_to_deep() {
        for pair in SectionLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].depth() < pair[1].depth());
        }
    }

    #[test]
    fn test_from_command() {
        assert_eq!(
            SectionLevel::from_command("subsection"),
            Some(SectionLevel::Subsection)
        );
        assert_eq!(SectionLevel::from_command("section*"), None);
        assert_eq!(SectionLevel::from_command("caption"), None);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&SectionLevel::Subsubsection).unwrap();
        assert_eq!(json, "\"subsubsection\"");
    }
}
