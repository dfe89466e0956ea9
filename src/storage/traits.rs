//! Storage trait definitions

use crate::wiki::{Article, ArticleId, Campaign, LinkEdge, StoryArc, World, WorldId};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Invalid id in storage: {0}")]
    InvalidId(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An article the auto-linker may point at
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCandidate {
    pub id: ArticleId,
    pub title: String,
    pub aliases: Vec<String>,
}

/// Read access to articles and the containers around them
///
/// Every lookup returns `Ok(None)` for a missing record; only genuine
/// storage failures are errors.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    // === Worlds, campaigns, arcs ===

    /// Create or update a world
    async fn save_world(&self, world: &World) -> StorageResult<()>;

    async fn get_world(&self, id: &WorldId) -> StorageResult<Option<World>>;

    async fn save_campaign(&self, campaign: &Campaign) -> StorageResult<()>;

    async fn get_campaign(&self, id: &Uuid) -> StorageResult<Option<Campaign>>;

    async fn save_arc(&self, arc: &StoryArc) -> StorageResult<()>;

    async fn get_arc(&self, id: &Uuid) -> StorageResult<Option<StoryArc>>;

    // === Articles ===

    /// Create or update an article, replacing its aliases
    async fn save_article(&self, article: &Article) -> StorageResult<()>;

    /// Load an article by ID
    async fn get_article(&self, id: &ArticleId) -> StorageResult<Option<Article>>;

    /// Every article in `world_id` with a non-blank title, except `exclude`
    async fn link_candidates(
        &self,
        world_id: &WorldId,
        exclude: &ArticleId,
    ) -> StorageResult<Vec<LinkCandidate>>;
}

/// Write access to the link graph
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Swap every edge whose source is `source` for `links`.
    ///
    /// The delete and the inserts commit as one unit: on failure the previous
    /// edge set is left intact. Edges of other sources are never touched.
    async fn replace_links(&self, source: &ArticleId, links: &[LinkEdge]) -> StorageResult<()>;

    /// Edges leaving an article, ordered by position
    async fn links_from(&self, source: &ArticleId) -> StorageResult<Vec<LinkEdge>>;

    /// Edges pointing at an article (backlinks)
    async fn links_to(&self, target: &ArticleId) -> StorageResult<Vec<LinkEdge>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
