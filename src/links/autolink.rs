//! Auto-link detector
//!
//! Scans a body for plain-text mentions of other articles in the same world
//! and turns them into link markup. Anything already inside markup (tags,
//! existing links) is a protected range and is never touched.

use super::ranges::{overlaps_protected, protected_ranges, ProtectedRange};
use crate::cancel::{self, CancellationToken};
use crate::sanitize::sanitize_for_log;
use crate::storage::{ArticleStore, LinkCandidate};
use crate::wiki::{ArticleId, WikiResult, WorldId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Whether the pass rewrites the body or only reports what it would link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoLinkMode {
    #[default]
    Insert,
    DetectOnly,
}

/// Markup written for an inserted link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMarkup {
    /// `<span data-type="wiki-link" data-target-id="…">text</span>`
    #[default]
    Html,
    /// `[[…|text]]`
    Legacy,
}

/// Tuning for the auto-link pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoLinkConfig {
    /// Require word boundaries around a term's word-character ends
    pub whole_word: bool,
    /// Terms shorter than this many chars are not searched for
    pub min_term_length: usize,
    /// Search aliases as well as titles
    pub include_aliases: bool,
    pub markup: LinkMarkup,
}

impl Default for AutoLinkConfig {
    fn default() -> Self {
        Self {
            whole_word: true,
            min_term_length: 1,
            include_aliases: true,
            markup: LinkMarkup::Html,
        }
    }
}

/// A mention the pass linked (or would link)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoLinkMatch {
    pub article_id: ArticleId,
    /// Canonical title of the target, even for alias matches
    pub article_title: String,
    /// The body text exactly as it appeared
    pub matched_text: String,
    /// Byte offsets into the input body
    pub start: usize,
    pub end: usize,
    pub is_alias: bool,
}

/// Result of one auto-link pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoLinkOutcome {
    /// The enriched body, or the input unchanged in detect-only mode
    pub body: String,
    /// Sorted by start offset
    pub matches: Vec<AutoLinkMatch>,
    pub mode: AutoLinkMode,
}

impl AutoLinkOutcome {
    fn unchanged(body: &str, mode: AutoLinkMode) -> Self {
        Self {
            body: body.to_string(),
            matches: Vec::new(),
            mode,
        }
    }

    pub fn links_found(&self) -> usize {
        self.matches.len()
    }

    pub fn is_modified(&self) -> bool {
        self.mode == AutoLinkMode::Insert && !self.matches.is_empty()
    }
}

struct SearchTerm<'a> {
    term: &'a str,
    candidate: &'a LinkCandidate,
    is_alias: bool,
}

/// Word characters in the Unicode sense, matching `\b` in the term pattern
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Render the markup for a link to `target` showing `text`
pub fn render_link(markup: LinkMarkup, target: &ArticleId, text: &str) -> String {
    match markup {
        LinkMarkup::Html => format!(
            r#"<span data-type="wiki-link" data-target-id="{}">{}</span>"#,
            target, text
        ),
        // A `]` would end the bracket early, so such text is dropped
        LinkMarkup::Legacy if text.contains(']') => format!("[[{}]]", target),
        LinkMarkup::Legacy => format!("[[{}|{}]]", target, text),
    }
}

/// The auto-link detector
///
/// Stateless apart from its configuration; one instance can serve any
/// number of passes.
#[derive(Debug, Clone, Default)]
pub struct AutoLinker {
    config: AutoLinkConfig,
    cancel: Option<CancellationToken>,
}

impl AutoLinker {
    pub fn new(config: AutoLinkConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Check `token` between candidate terms
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &AutoLinkConfig {
        &self.config
    }

    /// Load the world's other articles from `store` and run a pass over `body`.
    pub async fn run<S: ArticleStore + ?Sized>(
        &self,
        store: &S,
        article_id: &ArticleId,
        world_id: &WorldId,
        body: &str,
        mode: AutoLinkMode,
    ) -> WikiResult<AutoLinkOutcome> {
        if body.trim().is_empty() {
            return Ok(AutoLinkOutcome::unchanged(body, mode));
        }
        let candidates = store.link_candidates(world_id, article_id).await?;
        self.link(article_id, body, &candidates, mode)
    }

    /// Run a pass over `body` against an explicit candidate list.
    pub fn link(
        &self,
        article_id: &ArticleId,
        body: &str,
        candidates: &[LinkCandidate],
        mode: AutoLinkMode,
    ) -> WikiResult<AutoLinkOutcome> {
        let matches = self.find_matches(article_id, body, candidates)?;

        debug!(
            article = %article_id,
            matches = matches.len(),
            ?mode,
            "auto-link pass complete"
        );

        let body = match mode {
            AutoLinkMode::Insert if !matches.is_empty() => self.apply(body, &matches),
            _ => body.to_string(),
        };
        Ok(AutoLinkOutcome {
            body,
            matches,
            mode,
        })
    }

    /// Find every unprotected mention, longest terms first.
    ///
    /// Once a span is claimed by a match, later (shorter) terms treat it as
    /// protected, so no text is linked twice.
    pub fn find_matches(
        &self,
        article_id: &ArticleId,
        body: &str,
        candidates: &[LinkCandidate],
    ) -> WikiResult<Vec<AutoLinkMatch>> {
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let terms = self.search_terms(article_id, candidates);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let protected = protected_ranges(body);
        let mut claimed: Vec<ProtectedRange> = Vec::new();
        let mut matches = Vec::new();

        for term in terms {
            cancel::check(self.cancel.as_ref())?;

            let Some(pattern) = self.term_pattern(term.term) else {
                continue;
            };

            for m in pattern.find_iter(body) {
                if m.is_empty()
                    || overlaps_protected(m.start(), m.len(), &protected)
                    || overlaps_protected(m.start(), m.len(), &claimed)
                {
                    continue;
                }

                matches.push(AutoLinkMatch {
                    article_id: term.candidate.id,
                    article_title: term.candidate.title.clone(),
                    matched_text: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                    is_alias: term.is_alias,
                });
                claimed.push(ProtectedRange::new(m.start(), m.end()));
            }
        }

        matches.sort_by_key(|m| m.start);
        Ok(matches)
    }

    fn search_terms<'a>(
        &self,
        article_id: &ArticleId,
        candidates: &'a [LinkCandidate],
    ) -> Vec<SearchTerm<'a>> {
        let min = self.config.min_term_length.max(1);
        let mut terms = Vec::new();

        for candidate in candidates.iter().filter(|c| c.id != *article_id) {
            let title = candidate.title.trim();
            if title.chars().count() >= min {
                terms.push(SearchTerm {
                    term: title,
                    candidate,
                    is_alias: false,
                });
            }
            if !self.config.include_aliases {
                continue;
            }
            for alias in &candidate.aliases {
                let alias = alias.trim();
                if alias.chars().count() >= min {
                    terms.push(SearchTerm {
                        term: alias,
                        candidate,
                        is_alias: true,
                    });
                }
            }
        }

        // Longest first so "Waterdeep" claims its span before "Water" can
        terms.sort_by(|a, b| b.term.chars().count().cmp(&a.term.chars().count()));
        terms
    }

    fn term_pattern(&self, term: &str) -> Option<Regex> {
        let boundary = |c: Option<char>| {
            if self.config.whole_word && c.is_some_and(is_word_char) {
                r"\b"
            } else {
                ""
            }
        };
        let pattern = format!(
            "(?i){}{}{}",
            boundary(term.chars().next()),
            regex::escape(term),
            boundary(term.chars().last())
        );

        match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(term = %sanitize_for_log(term), error = %e, "skipping unsearchable term");
                None
            }
        }
    }

    fn apply(&self, body: &str, matches: &[AutoLinkMatch]) -> String {
        let mut out = String::with_capacity(body.len() + matches.len() * 80);
        let mut cursor = 0;
        for m in matches {
            out.push_str(&body[cursor..m.start]);
            out.push_str(&render_link(self.config.markup, &m.article_id, &m.matched_text));
            cursor = m.end;
        }
        out.push_str(&body[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::extract_links;
    use crate::wiki::WikiError;

    fn candidate(title: &str) -> LinkCandidate {
        LinkCandidate {
            id: ArticleId::new(),
            title: title.to_string(),
            aliases: Vec::new(),
        }
    }

    fn linker() -> AutoLinker {
        AutoLinker::default()
    }

    #[test]
    fn test_links_plain_mention() {
        let me = ArticleId::new();
        let city = candidate("Waterdeep");
        let outcome = linker()
            .link(&me, "We sailed to waterdeep at dawn.", &[city.clone()], AutoLinkMode::Insert)
            .unwrap();

        assert_eq!(outcome.links_found(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.matched_text, "waterdeep");
        assert_eq!(m.article_title, "Waterdeep");
        assert_eq!((m.start, m.end), (13, 22));
        assert_eq!(
            outcome.body,
            format!(
                r#"We sailed to <span data-type="wiki-link" data-target-id="{}">waterdeep</span> at dawn."#,
                city.id
            )
        );
        assert!(outcome.is_modified());
    }

    #[test]
    fn test_mention_inside_existing_link_is_not_relinked() {
        let city = candidate("Waterdeep");
        let body = format!(
            r#"<p>Back in <span data-type="wiki-link" data-target-id="{}">Waterdeep</span> again.</p>"#,
            city.id
        );
        let outcome = linker()
            .link(&ArticleId::new(), &body, &[city], AutoLinkMode::Insert)
            .unwrap();
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.body, body);
    }

    #[test]
    fn test_bare_and_single_quoted_link_elements_keep_their_target() {
        let old = ArticleId::new();
        let city = candidate("Waterdeep");
        for body in [
            format!(r#"<p><span data-target-id="{}">Waterdeep</span></p>"#, old),
            format!(
                r#"<p><span data-type='wiki-link' data-target-id='{}'>Waterdeep</span></p>"#,
                old
            ),
        ] {
            assert_eq!(extract_links(Some(&body))[0].target, old);

            let outcome = linker()
                .link(&ArticleId::new(), &body, &[city.clone()], AutoLinkMode::Insert)
                .unwrap();
            assert!(outcome.matches.is_empty());
            assert_eq!(outcome.body, body);

            let links = extract_links(Some(&outcome.body));
            assert_eq!(links.len(), 1);
            assert_eq!(links[0].target, old);
        }
    }

    #[test]
    fn test_unprotected_mention_linked_once_beside_linked_one() {
        let city = candidate("Waterdeep");
        let body = format!(
            r#"<p><span data-type="wiki-link" data-target-id="{}">Waterdeep</span> is far from Waterdeep's docks.</p>"#,
            city.id
        );
        let outcome = linker()
            .link(&ArticleId::new(), &body, &[city], AutoLinkMode::Insert)
            .unwrap();
        assert_eq!(outcome.links_found(), 1);
        assert_eq!(outcome.matches[0].start, body.rfind("Waterdeep").unwrap());
    }

    #[test]
    fn test_never_matches_inside_tag_attributes() {
        let city = candidate("Waterdeep");
        let body = r#"<img alt="Waterdeep" src="waterdeep.png">"#;
        let outcome = linker()
            .link(&ArticleId::new(), body, &[city], AutoLinkMode::Insert)
            .unwrap();
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_longer_titles_claim_span_first() {
        let long = candidate("Lords of Waterdeep");
        let short = candidate("Waterdeep");
        let body = "The Lords of Waterdeep met. Waterdeep slept.";
        let outcome = linker()
            .link(
                &ArticleId::new(),
                body,
                &[short.clone(), long.clone()],
                AutoLinkMode::DetectOnly,
            )
            .unwrap();

        assert_eq!(outcome.links_found(), 2);
        assert_eq!(outcome.matches[0].article_id, long.id);
        assert_eq!(outcome.matches[1].article_id, short.id);
        assert_eq!(outcome.matches[1].start, body.rfind("Waterdeep").unwrap());
    }

    #[test]
    fn test_whole_word_only_by_default() {
        let water = candidate("Water");
        let body = "Waterdeep has clean water.";
        let outcome = linker()
            .link(&ArticleId::new(), body, &[water.clone()], AutoLinkMode::DetectOnly)
            .unwrap();
        assert_eq!(outcome.links_found(), 1);
        assert_eq!(outcome.matches[0].matched_text, "water");

        let loose = AutoLinker::new(AutoLinkConfig {
            whole_word: false,
            ..Default::default()
        });
        let outcome = loose
            .link(&ArticleId::new(), body, &[water], AutoLinkMode::DetectOnly)
            .unwrap();
        assert_eq!(outcome.links_found(), 2);
    }

    #[test]
    fn test_case_folding_covers_accented_letters() {
        let vale = candidate("Ærindale");
        let outcome = linker()
            .link(&ArticleId::new(), "Rain over ærindale.", &[vale], AutoLinkMode::DetectOnly)
            .unwrap();
        assert_eq!(outcome.links_found(), 1);
        assert_eq!(outcome.matches[0].matched_text, "ærindale");
        assert_eq!(outcome.matches[0].start, "Rain over ".len());
    }

    #[test]
    fn test_accented_term_edge_respects_word_boundary() {
        let zoe = candidate("Zoë");
        let outcome = linker()
            .link(
                &ArticleId::new(),
                "Zoëlle met Zoë.",
                &[zoe],
                AutoLinkMode::DetectOnly,
            )
            .unwrap();
        assert_eq!(outcome.links_found(), 1);
        assert_eq!(outcome.matches[0].start, "Zoëlle met ".len());
    }

    #[test]
    fn test_terms_with_punctuation_edges() {
        let lang = candidate("C++");
        let outcome = linker()
            .link(&ArticleId::new(), "We write C++ here.", &[lang], AutoLinkMode::DetectOnly)
            .unwrap();
        assert_eq!(outcome.links_found(), 1);
        assert_eq!(outcome.matches[0].matched_text, "C++");
    }

    #[test]
    fn test_alias_matches_are_flagged() {
        let mut city = candidate("Waterdeep");
        city.aliases.push("City of Splendors".to_string());
        let outcome = linker()
            .link(
                &ArticleId::new(),
                "The City of Splendors glittered.",
                &[city.clone()],
                AutoLinkMode::DetectOnly,
            )
            .unwrap();
        assert_eq!(outcome.links_found(), 1);
        assert!(outcome.matches[0].is_alias);
        assert_eq!(outcome.matches[0].article_title, "Waterdeep");

        let no_aliases = AutoLinker::new(AutoLinkConfig {
            include_aliases: false,
            ..Default::default()
        });
        let outcome = no_aliases
            .link(&ArticleId::new(), "The City of Splendors.", &[city], AutoLinkMode::DetectOnly)
            .unwrap();
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_detect_only_leaves_body_untouched() {
        let body = "Neverwinter burns.";
        let outcome = linker()
            .link(&ArticleId::new(), body, &[candidate("Neverwinter")], AutoLinkMode::DetectOnly)
            .unwrap();
        assert_eq!(outcome.links_found(), 1);
        assert_eq!(outcome.body, body);
        assert!(!outcome.is_modified());
    }

    #[test]
    fn test_self_and_empty_body_produce_nothing() {
        let me = candidate("Neverwinter");
        let outcome = linker()
            .link(&me.id, "Neverwinter burns.", &[me.clone()], AutoLinkMode::Insert)
            .unwrap();
        assert!(outcome.matches.is_empty());

        let outcome = linker()
            .link(&ArticleId::new(), "   ", &[me], AutoLinkMode::Insert)
            .unwrap();
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_inserted_links_round_trip_through_extractor() {
        let keep = candidate("Candlekeep");
        let gate = candidate("Baldur's Gate");
        for markup in [LinkMarkup::Html, LinkMarkup::Legacy] {
            let linker = AutoLinker::new(AutoLinkConfig {
                markup,
                ..Default::default()
            });
            let outcome = linker
                .link(
                    &ArticleId::new(),
                    "From Candlekeep to Baldur's Gate.",
                    &[keep.clone(), gate.clone()],
                    AutoLinkMode::Insert,
                )
                .unwrap();

            let links = extract_links(Some(&outcome.body));
            assert_eq!(links.len(), 2);
            assert_eq!(links[0].target, keep.id);
            assert_eq!(links[0].display_text.as_deref(), Some("Candlekeep"));
            assert_eq!(links[1].target, gate.id);

            // A second pass finds nothing new
            let again = linker
                .link(&ArticleId::new(), &outcome.body, &[keep.clone(), gate.clone()], AutoLinkMode::Insert)
                .unwrap();
            assert!(again.matches.is_empty());
        }
    }

    #[test]
    fn test_cancelled_pass_returns_error() {
        let token = CancellationToken::new();
        token.cancel();
        let result = linker()
            .with_cancellation(token)
            .link(&ArticleId::new(), "Neverwinter", &[candidate("Neverwinter")], AutoLinkMode::Insert);
        assert!(matches!(result, Err(WikiError::Cancelled)));
    }

    #[test]
    fn test_min_term_length_filters_short_titles() {
        let linker = AutoLinker::new(AutoLinkConfig {
            min_term_length: 3,
            ..Default::default()
        });
        let outcome = linker
            .link(&ArticleId::new(), "Go to Ox town", &[candidate("Ox")], AutoLinkMode::DetectOnly)
            .unwrap();
        assert!(outcome.matches.is_empty());
    }
}
