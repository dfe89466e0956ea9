//! Link extractor
//!
//! Pulls article references out of a body. Two grammars are understood:
//!
//! - legacy brackets: `[[<uuid>]]` or `[[<uuid>|display text]]`
//! - inline elements carrying `data-target-id="<uuid>"`, whose text content
//!   is the display text
//!
//! Anything that does not parse is simply not a link.

use crate::wiki::ArticleId;
use regex_lite::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use uuid::Uuid;

/// Canonical hyphenated UUID, hex digits in either case
pub(crate) const UUID_PATTERN: &str =
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

static LEGACY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\[\[({})(?:\|([^\]]+))?\]\]", UUID_PATTERN))
        .expect("legacy link pattern is valid")
});

/// Opening tag of a link element, up to the quote that starts the target id.
/// The protected-range scan builds on the same prefix.
pub(crate) const TARGET_ELEMENT_OPEN: &str = r#"<[a-z][a-z0-9-]*\s[^>]*?data-target-id=["']"#;

/// Any closing tag
pub(crate) const ELEMENT_CLOSE: &str = r"</[a-z][a-z0-9-]*\s*>";

static HTML_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i){}({})["'][^>]*>([^<]*){}"#,
        TARGET_ELEMENT_OPEN, UUID_PATTERN, ELEMENT_CLOSE
    ))
    .expect("html link pattern is valid")
});

/// One reference found in a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLink {
    pub target: ArticleId,
    /// Trimmed display text; `None` when absent or blank
    pub display_text: Option<String>,
    /// Byte offset where the link markup starts
    pub position: usize,
}

fn display_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn collect(pattern: &Regex, body: &str, found: &mut Vec<ParsedLink>) {
    for caps in pattern.captures_iter(body) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(uuid) = Uuid::parse_str(id.as_str()) else {
            continue;
        };
        found.push(ParsedLink {
            target: ArticleId::from_uuid(uuid),
            display_text: display_text(caps.get(2).map(|m| m.as_str())),
            position: whole.start(),
        });
    }
}

/// Extract every distinct link target from `body`.
///
/// Results are ordered by position. When a target is referenced more than
/// once only its first occurrence is kept, so the result has exactly one
/// entry per target.
pub fn extract_links(body: Option<&str>) -> Vec<ParsedLink> {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    if body.contains("data-target-id=") {
        collect(&HTML_LINK, body, &mut found);
    }
    if body.contains("[[") {
        collect(&LEGACY_LINK, body, &mut found);
    }

    found.sort_by_key(|link| link.position);
    let mut seen = HashSet::new();
    found.retain(|link| seen.insert(link.target));
    found
}
