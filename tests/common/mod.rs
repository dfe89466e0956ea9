//! Common test utilities for lorekeep integration tests
//!
//! Builds an in-memory engine seeded with one world and a handful of article
//! trees that the hierarchy and link tests share.

#![allow(dead_code)]

use lorekeep::{
    Article, ArticleStore, ArticleType, Campaign, OpenStore, SqliteStore, StoryArc, Visibility,
    WikiEngine, World,
};
use std::sync::Arc;

/// Seeded engine plus handles to every fixture record
pub struct Seeded {
    pub engine: WikiEngine<SqliteStore>,
    pub world: World,
    pub campaign: Campaign,
    pub arc: StoryArc,
    /// Root Article -> Child Article -> Grandchild Article, all public
    pub root: Article,
    pub child: Article,
    pub grandchild: Article,
    /// Realm (public) -> Vault (private) -> Ledger (public) -> Entry (public)
    pub realm: Article,
    pub vault: Article,
    pub ledger: Article,
    pub entry: Article,
    /// A character sheet and a session inside the campaign arc
    pub hero: Article,
    pub session: Article,
}

impl Seeded {
    pub fn store(&self) -> &Arc<SqliteStore> {
        self.engine.store()
    }
}

fn public_article(seed: &World, title: &str, parent: Option<&Article>) -> Article {
    let mut article = Article::new(seed.id, title).public();
    if let Some(parent) = parent {
        article = article.with_parent(parent.id);
    }
    article
}

/// Build an in-memory engine with the shared fixture saved
pub async fn seeded() -> Seeded {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store"));
    let engine = WikiEngine::new(store.clone());

    let world = World::new("Test World");
    let campaign = Campaign::new(world.id, "Storm King's Thunder");
    let arc = StoryArc::new(campaign.id, "Giant Unrest");
    store.save_world(&world).await.expect("save world");
    store.save_campaign(&campaign).await.expect("save campaign");
    store.save_arc(&arc).await.expect("save arc");

    let root = public_article(&world, "Root Article", None);
    let child = public_article(&world, "Child Article", Some(&root));
    let grandchild = public_article(&world, "Grandchild Article", Some(&child));

    let realm = public_article(&world, "Realm", None);
    let vault = Article::new(world.id, "Vault")
        .with_parent(realm.id)
        .with_visibility(Visibility::Private);
    let ledger = public_article(&world, "Ledger", Some(&vault));
    let entry = public_article(&world, "Entry", Some(&ledger));

    let hero = public_article(&world, "Hero", None).with_type(ArticleType::Character);
    let session = public_article(&world, "Session One", None)
        .with_type(ArticleType::Session)
        .in_campaign(campaign.id, Some(arc.id));

    for article in [
        &root, &child, &grandchild, &realm, &vault, &ledger, &entry, &hero, &session,
    ] {
        engine.save_article(article).await.expect("save article");
    }

    Seeded {
        engine,
        world,
        campaign,
        arc,
        root,
        child,
        grandchild,
        realm,
        vault,
        ledger,
        entry,
        hero,
        session,
    }
}
