//! Protected ranges: spans of a body that auto-linking must leave alone

use super::parser::{ELEMENT_CLOSE, TARGET_ELEMENT_OPEN, UUID_PATTERN};
use regex_lite::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Any tag, opening or closing
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Whole link element, content included: any element the extractor could
/// read a target from, whatever its `data-type` or quote style
static TARGET_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?is){}[^"'>]*["'][^>]*>.*?{}"#,
        TARGET_ELEMENT_OPEN, ELEMENT_CLOSE
    ))
    .expect("link element pattern is valid")
});

/// Whole external-link element, content included
static EXTERNAL_LINK_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span[^>]*data-type="external-link"[^>]*>.*?</span>"#)
        .expect("external-link element pattern is valid")
});

/// Plain anchors
static ANCHOR_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<a(?:\s[^>]*)?>.*?</a\s*>").expect("anchor pattern is valid")
});

static LEGACY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\[\[{}(?:\|[^\]]+)?\]\]", UUID_PATTERN))
        .expect("legacy pattern is valid")
});

/// Half-open byte interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtectedRange {
    pub start: usize,
    pub end: usize,
}

impl ProtectedRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether `[start, start + len)` intersects this range
    pub fn overlaps(&self, start: usize, len: usize) -> bool {
        let end = start.saturating_add(len);
        !(end <= self.start || start >= self.end)
    }
}

/// True iff `[start, start + len)` intersects any range in `ranges`
pub fn overlaps_protected(start: usize, len: usize, ranges: &[ProtectedRange]) -> bool {
    ranges.iter().any(|r| r.overlaps(start, len))
}

/// Every span of `body` already occupied by markup.
///
/// Covers each tag, each element carrying a `data-target-id`, each
/// external-link and anchor element in full, and each legacy bracket link.
/// Ranges may overlap each other; they come back sorted by start.
pub fn protected_ranges(body: &str) -> Vec<ProtectedRange> {
    let mut ranges = Vec::new();
    for pattern in [
        &*HTML_TAG,
        &*TARGET_ELEMENT,
        &*EXTERNAL_LINK_ELEMENT,
        &*ANCHOR_ELEMENT,
        &*LEGACY_LINK,
    ] {
        ranges.extend(
            pattern
                .find_iter(body)
                .map(|m| ProtectedRange::new(m.start(), m.end())),
        );
    }
    ranges.sort_by_key(|r| (r.start, r.end));
    ranges
}
