//! WikiEngine: the main entry point for the wiki core

use super::article::{Article, ArticleId};
use super::link::LinkEdge;
use crate::cancel::CancellationToken;
use crate::config::WikiConfig;
use crate::hierarchy::{Breadcrumb, HierarchyWalker, WalkOptions};
use crate::links::{AutoLinkMode, AutoLinkOutcome, AutoLinker, LinkSynchronizer};
use crate::storage::{ArticleStore, LinkStore, StorageError};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Errors that can occur in wiki operations
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Article not found: {0}")]
    ArticleNotFound(ArticleId),

    #[error("Article has no world: {0}")]
    MissingWorld(ArticleId),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for wiki operations
pub type WikiResult<T> = Result<T, WikiError>;

/// The wiki engine
///
/// Wires a store to the extractor, synchronizer, auto-linker and walker.
/// Saves of the same article are serialized; everything else runs freely.
pub struct WikiEngine<S> {
    store: Arc<S>,
    config: WikiConfig,
    save_locks: DashMap<ArticleId, Arc<Mutex<()>>>,
}

impl<S: ArticleStore + LinkStore + 'static> WikiEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, WikiConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: WikiConfig) -> Self {
        Self {
            store,
            config,
            save_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    fn save_lock(&self, id: &ArticleId) -> Arc<Mutex<()>> {
        self.save_locks.entry(*id).or_default().clone()
    }

    /// Drop the lock entry once no other save holds or awaits it.
    /// Callers must have dropped their own clone first.
    fn release_save_lock(&self, id: &ArticleId) {
        self.save_locks.remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn synchronizer(&self) -> LinkSynchronizer<S> {
        LinkSynchronizer::new(self.store.clone())
    }

    fn walker(&self) -> HierarchyWalker<S> {
        HierarchyWalker::new(self.store.clone()).with_max_depth(self.config.hierarchy.max_depth)
    }

    /// Persist an article, then rebuild its outgoing edges.
    ///
    /// Returns the edge set now stored for the article.
    pub async fn save_article(&self, article: &Article) -> WikiResult<Vec<LinkEdge>> {
        let lock = self.save_lock(&article.id);
        let result = {
            let _guard = lock.lock().await;
            self.persist_and_sync(article).await
        };
        drop(lock);
        self.release_save_lock(&article.id);
        result
    }

    async fn persist_and_sync(&self, article: &Article) -> WikiResult<Vec<LinkEdge>> {
        self.store.save_article(article).await?;
        let edges = self
            .synchronizer()
            .synchronize(&article.id, article.body.as_deref())
            .await?;

        debug!(article = %article.id, edges = edges.len(), "article saved");
        Ok(edges)
    }

    /// Rebuild an article's edges from its stored body
    pub async fn resync_links(&self, article_id: &ArticleId) -> WikiResult<Vec<LinkEdge>> {
        let lock = self.save_lock(article_id);
        let result = {
            let _guard = lock.lock().await;
            self.resync_stored(article_id).await
        };
        drop(lock);
        self.release_save_lock(article_id);
        result
    }

    async fn resync_stored(&self, article_id: &ArticleId) -> WikiResult<Vec<LinkEdge>> {
        let article = self
            .store
            .get_article(article_id)
            .await?
            .ok_or(WikiError::ArticleNotFound(*article_id))?;
        Ok(self
            .synchronizer()
            .synchronize(article_id, article.body.as_deref())
            .await?)
    }

    /// Run the auto-linker over `body` against the article's world
    pub async fn auto_link(
        &self,
        article_id: &ArticleId,
        body: &str,
        mode: AutoLinkMode,
    ) -> WikiResult<AutoLinkOutcome> {
        self.auto_link_with(article_id, body, mode, None).await
    }

    /// As [`auto_link`](Self::auto_link), checking `cancel` between terms
    pub async fn auto_link_with(
        &self,
        article_id: &ArticleId,
        body: &str,
        mode: AutoLinkMode,
        cancel: Option<CancellationToken>,
    ) -> WikiResult<AutoLinkOutcome> {
        let article = self
            .store
            .get_article(article_id)
            .await?
            .ok_or(WikiError::ArticleNotFound(*article_id))?;
        let world_id = article
            .world_id
            .ok_or(WikiError::MissingWorld(*article_id))?;

        let mut linker = AutoLinker::new(self.config.auto_link.clone());
        if let Some(token) = cancel {
            linker = linker.with_cancellation(token);
        }
        linker
            .run(self.store.as_ref(), article_id, &world_id, body, mode)
            .await
    }

    /// Breadcrumb trail with the configured depth cap applied
    pub async fn breadcrumbs(
        &self,
        article_id: &ArticleId,
        options: WalkOptions,
    ) -> WikiResult<Vec<Breadcrumb>> {
        let options = options.with_max_depth(self.config.hierarchy.max_depth);
        self.walker().build_breadcrumbs(article_id, &options).await
    }

    pub async fn path(&self, article_id: &ArticleId) -> WikiResult<String> {
        self.walker().build_path(article_id).await
    }

    pub async fn display_path(
        &self,
        article_id: &ArticleId,
        strip_first_level: bool,
    ) -> WikiResult<String> {
        self.walker()
            .build_display_path(article_id, strip_first_level)
            .await
    }

    pub async fn outgoing_links(&self, article_id: &ArticleId) -> WikiResult<Vec<LinkEdge>> {
        Ok(self.store.links_from(article_id).await?)
    }

    pub async fn backlinks(&self, article_id: &ArticleId) -> WikiResult<Vec<LinkEdge>> {
        Ok(self.store.links_to(article_id).await?)
    }
}
