//! Page counting for compiled artifacts.
//!
//! Only enough PDF awareness to drive page navigation. Counts `/Type /Page`
//! dictionary entries; objects inside compressed object streams are not
//! visible, so the count is a lower bound.

use regex::bytes::Regex;
use std::sync::OnceLock;

fn page_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `\b` rejects `/Pages` tree nodes.
    PATTERN.get_or_init(|| {
        Regex::new(r"(?-u)/Type\s*/Page\b").expect("page pattern is a valid regex")
    })
}

/// Best-effort page count. Empty input has zero pages; any other input has
/// at least one.
pub fn count_pages(bytes: &[u8]) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    page_pattern().find_iter(bytes).count().max(1)
}
