//! Hierarchy walker
//!
//! Builds root-to-leaf trails by following `parent_id` upward one lookup at
//! a time. Parent graphs are untrusted: a visited set and a depth cap bound
//! every walk, so cycles and dangling parents only ever shorten the result.

use super::breadcrumb::Breadcrumb;
use super::options::{WalkOptions, DEFAULT_MAX_DEPTH};
use crate::cancel::{self, CancellationToken};
use crate::sanitize::sanitize_for_log;
use crate::storage::ArticleStore;
use crate::wiki::{Article, ArticleId, ArticleType, WikiResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Walks article ancestry in a store
pub struct HierarchyWalker<S: ?Sized> {
    store: Arc<S>,
    cancel: Option<CancellationToken>,
    /// Depth cap for `build_path` and `build_display_path`
    max_depth: usize,
}

impl<S: ArticleStore + ?Sized> HierarchyWalker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cancel: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check `token` before every ancestor lookup
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the breadcrumb trail for `article_id`.
    ///
    /// A missing article yields an empty trail, not an error.
    pub async fn build_breadcrumbs(
        &self,
        article_id: &ArticleId,
        options: &WalkOptions,
    ) -> WikiResult<Vec<Breadcrumb>> {
        let chain = self.walk(article_id, options).await?;
        let (Some(root), Some(target)) = (chain.first(), chain.last()) else {
            return Ok(Vec::new());
        };

        let mut trail = Vec::with_capacity(chain.len() + 3);

        if options.include_world {
            if let Some(world) = self.world_breadcrumb(root, options).await? {
                trail.push(world);
            }
        }

        if options.include_virtual_groups {
            trail.extend(self.virtual_groups(root, target).await?);
        }

        let articles = if options.include_self {
            &chain[..]
        } else {
            &chain[..chain.len() - 1]
        };
        trail.extend(articles.iter().map(Breadcrumb::article));

        debug!(article = %article_id, depth = chain.len(), nodes = trail.len(), "breadcrumbs built");
        Ok(trail)
    }

    /// `world-slug/root-slug/…/leaf-slug`, ignoring visibility
    pub async fn build_path(&self, article_id: &ArticleId) -> WikiResult<String> {
        let trail = self
            .build_breadcrumbs(
                article_id,
                &WalkOptions::default().with_max_depth(self.max_depth),
            )
            .await?;
        Ok(trail
            .iter()
            .map(|b| b.slug.as_str())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Article titles root to leaf, joined by ` / `.
    ///
    /// With `strip_first_level` the root title is dropped, unless it is the
    /// only one.
    pub async fn build_display_path(
        &self,
        article_id: &ArticleId,
        strip_first_level: bool,
    ) -> WikiResult<String> {
        let trail = self
            .build_breadcrumbs(
                article_id,
                &WalkOptions::default()
                    .without_world()
                    .with_max_depth(self.max_depth),
            )
            .await?;

        let mut titles: Vec<&str> = trail.iter().map(|b| b.title.as_str()).collect();
        if strip_first_level && titles.len() > 1 {
            titles.remove(0);
        }
        Ok(titles.join(" / "))
    }

    /// Collect the article and its ancestors, root first.
    ///
    /// The queried article is always walked, even when private; it is
    /// dropped later if the caller asked for ancestors only.
    async fn walk(&self, article_id: &ArticleId, options: &WalkOptions) -> WikiResult<Vec<Article>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(*article_id);

        while let Some(id) = current {
            cancel::check(self.cancel.as_ref())?;

            if !visited.insert(id) {
                warn!(article = %article_id, cycle_at = %id, "cycle in article hierarchy");
                break;
            }

            if chain.len() >= options.max_depth {
                error!(
                    article = %article_id,
                    max_depth = options.max_depth,
                    "article hierarchy exceeds max depth"
                );
                break;
            }

            let Some(article) = self.store.get_article(&id).await? else {
                break;
            };

            if options.public_only && id != *article_id && !article.visibility.is_public() {
                debug!(
                    article = %article_id,
                    stopped_at = %sanitize_for_log(article.display_title()),
                    "walk stopped at private ancestor"
                );
                break;
            }

            current = article.parent_id;
            chain.push(article);
        }

        chain.reverse();
        Ok(chain)
    }

    async fn world_breadcrumb(
        &self,
        root: &Article,
        options: &WalkOptions,
    ) -> WikiResult<Option<Breadcrumb>> {
        if let Some(world) = &options.world {
            return Ok(Some(Breadcrumb::world(world)));
        }
        let Some(world_id) = root.world_id else {
            return Ok(None);
        };
        Ok(self
            .store
            .get_world(&world_id)
            .await?
            .map(|world| Breadcrumb::world(&world)))
    }

    /// Sessions get campaign and arc nodes; everything else is grouped by
    /// the type of the root-most article.
    async fn virtual_groups(&self, root: &Article, target: &Article) -> WikiResult<Vec<Breadcrumb>> {
        let mut groups = Vec::new();

        if target.is_session() {
            if let Some(campaign_id) = target.campaign_id {
                if let Some(campaign) = self.store.get_campaign(&campaign_id).await? {
                    groups.push(Breadcrumb::campaign(&campaign));
                }
            }
            if let Some(arc_id) = target.arc_id {
                if let Some(arc) = self.store.get_arc(&arc_id).await? {
                    groups.push(Breadcrumb::arc(&arc));
                }
            }
            return Ok(groups);
        }

        match root.article_type {
            t if t.is_character() => groups.push(Breadcrumb::player_characters()),
            ArticleType::WikiArticle => groups.push(Breadcrumb::wiki()),
            _ => {}
        }
        Ok(groups)
    }
}
