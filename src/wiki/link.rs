//! Persisted link edges between articles

use super::article::ArticleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a link edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(Uuid);

impl LinkId {
    /// Create a new random LinkId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LinkId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A directed reference from one article's body to another article
///
/// Edges are only ever written as a full set per source article; there is
/// no in-place update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEdge {
    pub id: LinkId,
    pub source: ArticleId,
    /// Not guaranteed to exist; broken links are still recorded
    pub target: ArticleId,
    pub display_text: Option<String>,
    /// Byte offset of the reference within the source body
    pub position: usize,
    pub created_at: DateTime<Utc>,
}

impl LinkEdge {
    pub fn new(
        source: ArticleId,
        target: ArticleId,
        display_text: Option<String>,
        position: usize,
    ) -> Self {
        Self {
            id: LinkId::new(),
            source,
            target,
            display_text,
            position,
            created_at: Utc::now(),
        }
    }
}
