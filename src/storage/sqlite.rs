//! SQLite storage backend for the wiki

use super::traits::{
    ArticleStore, LinkCandidate, LinkStore, OpenStore, StorageError, StorageResult,
};
use crate::wiki::{Article, ArticleId, Campaign, LinkEdge, StoryArc, World, WorldId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// SQLite-backed wiki store
///
/// Uses a single SQLite database file with tables for worlds, campaigns,
/// arcs, articles, aliases and link edges. Thread-safe via internal mutex
/// on the connection; no lock is held across an await point.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Raw article columns, converted to an `Article` outside the row closure
struct ArticleRow {
    id: String,
    world_id: Option<String>,
    parent_id: Option<String>,
    campaign_id: Option<String>,
    arc_id: Option<String>,
    title: String,
    slug: String,
    body: Option<String>,
    article_type: String,
    visibility: String,
    created_at: String,
    modified_at: Option<String>,
}

/// Raw link columns
type LinkRow = (String, String, String, Option<String>, i64, String);

const ARTICLE_COLUMNS: &str = "id, world_id, parent_id, campaign_id, arc_id, title, slug, body, \
                               article_type, visibility, created_at, modified_at";

const LINK_COLUMNS: &str = "id, source_id, target_id, display_text, position, created_at";

fn parse_uuid(s: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(s).map_err(|_| StorageError::InvalidId(s.to_string()))
}

fn parse_opt_uuid(s: Option<&str>) -> StorageResult<Option<Uuid>> {
    s.map(parse_uuid).transpose()
}

fn parse_time(s: &str) -> StorageResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| StorageError::DateParse(e.to_string()))?
        .with_timezone(&Utc))
}

impl SqliteStore {
    /// Initialize the database schema
    ///
    /// `articles.parent_id` deliberately has no foreign key: dangling and
    /// cyclic parent chains must be storable so the walker can be tested
    /// against them.
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS worlds (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS campaigns (
                id TEXT PRIMARY KEY,
                world_id TEXT NOT NULL,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS arcs (
                id TEXT PRIMARY KEY,
                campaign_id TEXT NOT NULL,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                world_id TEXT,
                parent_id TEXT,
                campaign_id TEXT,
                arc_id TEXT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                body TEXT,
                article_type TEXT NOT NULL,
                visibility TEXT NOT NULL,
                created_at TEXT NOT NULL,
                modified_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_articles_world
                ON articles(world_id);
            CREATE INDEX IF NOT EXISTS idx_articles_parent
                ON articles(parent_id);

            CREATE TABLE IF NOT EXISTS article_aliases (
                article_id TEXT NOT NULL,
                alias TEXT NOT NULL,
                PRIMARY KEY (article_id, alias),
                FOREIGN KEY (article_id) REFERENCES articles(id) ON DELETE CASCADE
            );

            -- One row per distinct target per source
            CREATE TABLE IF NOT EXISTS article_links (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                display_text TEXT,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (source_id, target_id)
            );

            CREATE INDEX IF NOT EXISTS idx_links_target
                ON article_links(target_id);

            PRAGMA foreign_keys = ON;

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn row_to_article(row: ArticleRow, aliases: Vec<String>) -> StorageResult<Article> {
        Ok(Article {
            id: ArticleId::from_uuid(parse_uuid(&row.id)?),
            title: row.title,
            slug: row.slug,
            body: row.body,
            parent_id: parse_opt_uuid(row.parent_id.as_deref())?.map(ArticleId::from_uuid),
            world_id: parse_opt_uuid(row.world_id.as_deref())?.map(WorldId::from_uuid),
            campaign_id: parse_opt_uuid(row.campaign_id.as_deref())?,
            arc_id: parse_opt_uuid(row.arc_id.as_deref())?,
            article_type: row
                .article_type
                .parse()
                .map_err(StorageError::InvalidValue)?,
            visibility: row.visibility.parse().map_err(StorageError::InvalidValue)?,
            aliases,
            created_at: parse_time(&row.created_at)?,
            modified_at: row.modified_at.as_deref().map(parse_time).transpose()?,
        })
    }

    fn row_to_link(row: LinkRow) -> StorageResult<LinkEdge> {
        let (id, source, target, display_text, position, created_at) = row;
        Ok(LinkEdge {
            id: id
                .parse()
                .map_err(|_| StorageError::InvalidId(id.clone()))?,
            source: ArticleId::from_uuid(parse_uuid(&source)?),
            target: ArticleId::from_uuid(parse_uuid(&target)?),
            display_text,
            position: usize::try_from(position)
                .map_err(|_| StorageError::InvalidValue(format!("negative position {}", position)))?,
            created_at: parse_time(&created_at)?,
        })
    }

    fn query_links(conn: &Connection, column: &str, id: &ArticleId) -> StorageResult<Vec<LinkEdge>> {
        let sql = format!(
            "SELECT {} FROM article_links WHERE {} = ?1 ORDER BY position, id",
            LINK_COLUMNS, column
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut links = Vec::new();
        for row in rows {
            links.push(Self::row_to_link(row?)?);
        }
        Ok(links)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    // === Worlds, campaigns, arcs ===

    async fn save_world(&self, world: &World) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO worlds (id, name, slug) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, slug = excluded.slug
            "#,
            params![world.id.to_string(), world.name, world.slug],
        )?;
        Ok(())
    }

    async fn get_world(&self, id: &WorldId) -> StorageResult<Option<World>> {
        let conn = self.conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT name, slug FROM worlds WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.map(|(name, slug)| World { id: *id, name, slug }))
    }

    async fn save_campaign(&self, campaign: &Campaign) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO campaigns (id, world_id, name) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET world_id = excluded.world_id, name = excluded.name
            "#,
            params![
                campaign.id.to_string(),
                campaign.world_id.to_string(),
                campaign.name
            ],
        )?;
        Ok(())
    }

    async fn get_campaign(&self, id: &Uuid) -> StorageResult<Option<Campaign>> {
        let conn = self.conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT world_id, name FROM campaigns WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(world_id, name)| {
            Ok(Campaign {
                id: *id,
                world_id: WorldId::from_uuid(parse_uuid(&world_id)?),
                name,
            })
        })
        .transpose()
    }

    async fn save_arc(&self, arc: &StoryArc) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO arcs (id, campaign_id, name) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET campaign_id = excluded.campaign_id, name = excluded.name
            "#,
            params![arc.id.to_string(), arc.campaign_id.to_string(), arc.name],
        )?;
        Ok(())
    }

    async fn get_arc(&self, id: &Uuid) -> StorageResult<Option<StoryArc>> {
        let conn = self.conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT campaign_id, name FROM arcs WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(campaign_id, name)| {
            Ok(StoryArc {
                id: *id,
                campaign_id: parse_uuid(&campaign_id)?,
                name,
            })
        })
        .transpose()
    }

    // === Articles ===

    async fn save_article(&self, article: &Article) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = article.id.to_string();

        tx.execute(
            r#"
            INSERT INTO articles (id, world_id, parent_id, campaign_id, arc_id, title, slug, body,
                                  article_type, visibility, created_at, modified_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                world_id = excluded.world_id,
                parent_id = excluded.parent_id,
                campaign_id = excluded.campaign_id,
                arc_id = excluded.arc_id,
                title = excluded.title,
                slug = excluded.slug,
                body = excluded.body,
                article_type = excluded.article_type,
                visibility = excluded.visibility,
                modified_at = excluded.modified_at
            "#,
            params![
                id,
                article.world_id.map(|w| w.to_string()),
                article.parent_id.map(|p| p.to_string()),
                article.campaign_id.map(|c| c.to_string()),
                article.arc_id.map(|a| a.to_string()),
                article.title,
                article.slug,
                article.body,
                article.article_type.as_str(),
                article.visibility.as_str(),
                article.created_at.to_rfc3339(),
                article.modified_at.map(|m| m.to_rfc3339()),
            ],
        )?;

        tx.execute(
            "DELETE FROM article_aliases WHERE article_id = ?1",
            params![id],
        )?;
        for alias in article.aliases.iter().filter(|a| !a.trim().is_empty()) {
            tx.execute(
                "INSERT OR IGNORE INTO article_aliases (article_id, alias) VALUES (?1, ?2)",
                params![id, alias.trim()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    async fn get_article(&self, id: &ArticleId) -> StorageResult<Option<Article>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS);
        let row: Option<ArticleRow> = conn
            .query_row(&sql, params![id.to_string()], |row| {
                Ok(ArticleRow {
                    id: row.get(0)?,
                    world_id: row.get(1)?,
                    parent_id: row.get(2)?,
                    campaign_id: row.get(3)?,
                    arc_id: row.get(4)?,
                    title: row.get(5)?,
                    slug: row.get(6)?,
                    body: row.get(7)?,
                    article_type: row.get(8)?,
                    visibility: row.get(9)?,
                    created_at: row.get(10)?,
                    modified_at: row.get(11)?,
                })
            })
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut stmt =
            conn.prepare("SELECT alias FROM article_aliases WHERE article_id = ?1 ORDER BY alias")?;
        let aliases = stmt
            .query_map(params![row.id], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Self::row_to_article(row, aliases).map(Some)
    }

    async fn link_candidates(
        &self,
        world_id: &WorldId,
        exclude: &ArticleId,
    ) -> StorageResult<Vec<LinkCandidate>> {
        let conn = self.conn()?;
        let world = world_id.to_string();
        let excluded = exclude.to_string();

        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                r#"
                SELECT al.article_id, al.alias
                FROM article_aliases al
                JOIN articles a ON a.id = al.article_id
                WHERE a.world_id = ?1 AND a.id != ?2
                ORDER BY al.alias
                "#,
            )?;
            let rows = stmt.query_map(params![world, excluded], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (article_id, alias) = row?;
                aliases.entry(article_id).or_default().push(alias);
            }
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT id, title FROM articles
            WHERE world_id = ?1 AND id != ?2 AND trim(title) != ''
            ORDER BY title, id
            "#,
        )?;
        let rows = stmt.query_map(params![world, excluded], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut candidates = Vec::new();
        for row in rows {
            let (id, title) = row?;
            candidates.push(LinkCandidate {
                id: ArticleId::from_uuid(parse_uuid(&id)?),
                aliases: aliases.remove(&id).unwrap_or_default(),
                title,
            });
        }
        Ok(candidates)
    }
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn replace_links(&self, source: &ArticleId, links: &[LinkEdge]) -> StorageResult<()> {
        let mut conn = self.conn()?;
        // Dropping the transaction without commit rolls back
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM article_links WHERE source_id = ?1",
            params![source.to_string()],
        )?;
        {
            let mut insert = tx.prepare(&format!(
                "INSERT INTO article_links ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                LINK_COLUMNS
            ))?;
            for link in links {
                let position = i64::try_from(link.position).map_err(|_| {
                    StorageError::InvalidValue(format!("position {} out of range", link.position))
                })?;
                insert.execute(params![
                    link.id.to_string(),
                    source.to_string(),
                    link.target.to_string(),
                    link.display_text,
                    position,
                    link.created_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    async fn links_from(&self, source: &ArticleId) -> StorageResult<Vec<LinkEdge>> {
        let conn = self.conn()?;
        Self::query_links(&conn, "source_id", source)
    }

    async fn links_to(&self, target: &ArticleId) -> StorageResult<Vec<LinkEdge>> {
        let conn = self.conn()?;
        Self::query_links(&conn, "target_id", target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::{ArticleType, Visibility};

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn edge(source: ArticleId, target: ArticleId, position: usize) -> LinkEdge {
        LinkEdge::new(source, target, Some(format!("at {}", position)), position)
    }

    #[tokio::test]
    async fn test_save_and_load_article() {
        let store = create_test_store();
        let world = World::new("Faerun");
        store.save_world(&world).await.unwrap();

        let parent = ArticleId::new();
        let article = Article::new(world.id, "Waterdeep")
            .with_parent(parent)
            .with_type(ArticleType::WikiArticle)
            .public()
            .with_body("City of Splendors")
            .with_alias("City of Splendors")
            .with_alias("Waterdeep City");
        store.save_article(&article).await.unwrap();

        let loaded = store.get_article(&article.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Waterdeep");
        assert_eq!(loaded.slug, "waterdeep");
        assert_eq!(loaded.parent_id, Some(parent));
        assert_eq!(loaded.world_id, Some(world.id));
        assert_eq!(loaded.visibility, Visibility::Public);
        assert_eq!(loaded.body.as_deref(), Some("City of Splendors"));
        assert_eq!(loaded.aliases, vec!["City of Splendors", "Waterdeep City"]);
    }

    #[tokio::test]
    async fn test_missing_records_are_none() {
        let store = create_test_store();
        assert!(store.get_article(&ArticleId::new()).await.unwrap().is_none());
        assert!(store.get_world(&WorldId::new()).await.unwrap().is_none());
        assert!(store.get_campaign(&Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.get_arc(&Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resave_replaces_aliases() {
        let store = create_test_store();
        let mut article = Article::new(WorldId::new(), "Drizzt").with_alias("Do'Urden");
        store.save_article(&article).await.unwrap();

        article.aliases = vec!["The Drow Ranger".to_string()];
        store.save_article(&article).await.unwrap();

        let loaded = store.get_article(&article.id).await.unwrap().unwrap();
        assert_eq!(loaded.aliases, vec!["The Drow Ranger"]);
    }

    #[tokio::test]
    async fn test_campaign_and_arc_round_trip() {
        let store = create_test_store();
        let world = World::new("Eberron");
        let campaign = Campaign::new(world.id, "Last War");
        let arc = StoryArc::new(campaign.id, "Mournland");
        store.save_campaign(&campaign).await.unwrap();
        store.save_arc(&arc).await.unwrap();

        assert_eq!(store.get_campaign(&campaign.id).await.unwrap(), Some(campaign.clone()));
        assert_eq!(store.get_arc(&arc.id).await.unwrap(), Some(arc));
    }

    #[tokio::test]
    async fn test_link_candidates_exclude_self_and_other_worlds() {
        let store = create_test_store();
        let world = WorldId::new();
        let me = Article::new(world, "Me");
        let other = Article::new(world, "Neverwinter").with_alias("Jewel of the North");
        let blank = Article::new(world, "  ");
        let elsewhere = Article::new(WorldId::new(), "Sharn");
        for a in [&me, &other, &blank, &elsewhere] {
            store.save_article(a).await.unwrap();
        }

        let candidates = store.link_candidates(&world, &me.id).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, other.id);
        assert_eq!(candidates[0].aliases, vec!["Jewel of the North"]);
    }

    #[tokio::test]
    async fn test_replace_links_swaps_edge_set() {
        let store = create_test_store();
        let source = ArticleId::new();
        let (a, b, c) = (ArticleId::new(), ArticleId::new(), ArticleId::new());

        store
            .replace_links(&source, &[edge(source, a, 5), edge(source, b, 1)])
            .await
            .unwrap();
        let links = store.links_from(&source).await.unwrap();
        assert_eq!(links.iter().map(|l| l.target).collect::<Vec<_>>(), vec![b, a]);

        store.replace_links(&source, &[edge(source, c, 0)]).await.unwrap();
        let links = store.links_from(&source).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, c);
        assert_eq!(links[0].display_text.as_deref(), Some("at 0"));
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_edges() {
        let store = create_test_store();
        let source = ArticleId::new();
        let (a, b) = (ArticleId::new(), ArticleId::new());
        store.replace_links(&source, &[edge(source, a, 0)]).await.unwrap();

        // Duplicate target violates UNIQUE(source_id, target_id) mid-insert
        let result = store
            .replace_links(&source, &[edge(source, b, 0), edge(source, b, 9)])
            .await;
        assert!(matches!(result, Err(StorageError::Database(_))));

        let links = store.links_from(&source).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, a);
    }

    #[tokio::test]
    async fn test_links_to_returns_backlinks_across_sources() {
        let store = create_test_store();
        let target = ArticleId::new();
        let (s1, s2) = (ArticleId::new(), ArticleId::new());
        store.replace_links(&s1, &[edge(s1, target, 3)]).await.unwrap();
        store.replace_links(&s2, &[edge(s2, target, 7)]).await.unwrap();

        let backlinks = store.links_to(&target).await.unwrap();
        let mut sources: Vec<_> = backlinks.iter().map(|l| l.source).collect();
        sources.sort();
        let mut expected = vec![s1, s2];
        expected.sort();
        assert_eq!(sources, expected);
    }

    #[tokio::test]
    async fn test_on_disk_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("wiki.db");
        let article = Article::new(WorldId::new(), "Candlekeep");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.save_article(&article).await.unwrap();
        }

        let store = SqliteStore::open(&db_path).unwrap();
        let loaded = store.get_article(&article.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Candlekeep");
    }
}
