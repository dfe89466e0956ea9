//! Link graph synchronizer
//!
//! Keeps the persisted edge set of an article equal to what its body
//! currently references. Every call is a full rebuild: parse the body, build
//! the whole edge set, swap it in.

use super::parser::extract_links;
use crate::storage::{LinkStore, StorageResult};
use crate::wiki::{ArticleId, LinkEdge};
use std::sync::Arc;
use tracing::debug;

/// Rewrites an article's outgoing edges from its body
pub struct LinkSynchronizer<S: ?Sized> {
    store: Arc<S>,
}

impl<S: LinkStore + ?Sized> LinkSynchronizer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Replace every edge sourced at `article_id` with the links in `body`.
    ///
    /// Targets are not checked for existence. An absent or empty body clears
    /// the article's edges. Returns the edge set that was written.
    pub async fn synchronize(
        &self,
        article_id: &ArticleId,
        body: Option<&str>,
    ) -> StorageResult<Vec<LinkEdge>> {
        let edges: Vec<LinkEdge> = extract_links(body)
            .into_iter()
            .map(|link| LinkEdge::new(*article_id, link.target, link.display_text, link.position))
            .collect();

        self.store.replace_links(article_id, &edges).await?;

        debug!(article = %article_id, edges = edges.len(), "link graph synchronized");
        Ok(edges)
    }
}
