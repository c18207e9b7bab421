//! Nested outline built from the flat scan.

use super::{extract_outline, OutlineEntry, SectionLevel};
use serde::{Deserialize, Serialize};

/// One heading in a nested outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub title: String,
    pub level: SectionLevel,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn leaf(entry: &OutlineEntry) -> Self {
        Self {
            title: entry.title.clone(),
            level: entry.level,
            line: entry.line,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::node_count).sum::<usize>()
    }

    /// Pre-order traversal back into flat entries.
    pub fn flatten(&self) -> Vec<OutlineEntry> {
        let mut out = Vec::with_capacity(self.node_count());
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<OutlineEntry>) {
        out.push(OutlineEntry::new(self.title.clone(), self.level, self.line));
        for child in &self.children {
            child.flatten_into(out);
        }
    }
}

/// Nest flat entries by level.
///
/// Each entry becomes a child of the most recent still-open entry with a
/// strictly shallower level. An entry with no such ancestor (for example a
/// `\subsection` before any `\section`) becomes a root.
pub fn build_tree(entries: &[OutlineEntry]) -> Vec<OutlineNode> {
    let mut roots: Vec<OutlineNode> = Vec::new();
    // Open branch, shallowest first. Every element is strictly deeper than
    // the one below it.
    let mut open: Vec<OutlineNode> = Vec::new();

    for entry in entries {
        while open.last().is_some_and(|top| top.level >= entry.level) {
            close_top(&mut open, &mut roots);
        }
        open.push(OutlineNode::leaf(entry));
    }
    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }

    roots
}

fn close_top(open: &mut Vec<OutlineNode>, roots: &mut Vec<OutlineNode>) {
    if let Some(node) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Extract a nested outline directly from source text.
pub fn extract_outline_tree(source: &str) -> Vec<OutlineNode> {
    build_tree(&extract_outline(source))
}
