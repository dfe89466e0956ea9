//! Lorekeep CLI: link graph and breadcrumb tooling for a campaign wiki.
//!
//! Usage:
//!   lorekeep [--db path] [--config path] import <snapshot.json>
//!   lorekeep [--db path] <extract|sync|links|auto-link|breadcrumbs|path|display-path> ...

use clap::{Parser, Subcommand};
use lorekeep::{
    extract_links, Article, ArticleId, ArticleStore, AutoLinkMode, Campaign, OpenStore,
    SqliteStore, StoryArc, WalkOptions, WikiConfig, WikiEngine, World,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type Engine = WikiEngine<SqliteStore>;

#[derive(Parser)]
#[command(
    name = "lorekeep",
    version,
    about = "Link graph and hierarchy tooling for a campaign wiki"
)]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load worlds, campaigns, arcs and articles from a JSON snapshot
    Import {
        file: PathBuf,
    },
    /// Print the links found in a body file
    Extract {
        file: PathBuf,
    },
    /// Rebuild an article's edges from its stored body
    Sync {
        article: ArticleId,
    },
    /// List an article's outgoing links
    Links {
        article: ArticleId,
        /// List backlinks instead
        #[arg(long)]
        incoming: bool,
    },
    /// Link plain mentions of other articles in a stored body
    AutoLink {
        article: ArticleId,
        /// Report matches without changing the body
        #[arg(long)]
        detect_only: bool,
        /// Save the enriched body back to the article
        #[arg(long, conflicts_with = "detect_only")]
        write: bool,
    },
    /// Print an article's breadcrumb trail
    Breadcrumbs {
        article: ArticleId,
        #[arg(long)]
        public_only: bool,
        /// Leave out the world node
        #[arg(long)]
        no_world: bool,
        /// Leave out the article itself
        #[arg(long)]
        ancestors_only: bool,
        /// Insert campaign, arc and category nodes
        #[arg(long)]
        virtual_groups: bool,
    },
    /// Print an article's slug path
    Path {
        article: ArticleId,
    },
    /// Print an article's title path
    DisplayPath {
        article: ArticleId,
        /// Keep the root title
        #[arg(long)]
        keep_first: bool,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Snapshot {
    worlds: Vec<World>,
    campaigns: Vec<Campaign>,
    arcs: Vec<StoryArc>,
    articles: Vec<Article>,
}

/// Get the default database path (~/.local/share/lorekeep/lorekeep.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let dir = data_dir.join("lorekeep");
    std::fs::create_dir_all(&dir).ok();
    dir.join("lorekeep.db")
}

fn load_config(path: Option<&Path>) -> Result<WikiConfig, String> {
    match path {
        Some(path) => WikiConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {}", path.display(), e)),
        None => Ok(WikiConfig::default()),
    }
}

fn open_engine(db: Option<PathBuf>, config: WikiConfig) -> Result<Engine, String> {
    let db_path = db
        .or_else(|| config.database.clone())
        .unwrap_or_else(default_db_path);
    let store =
        SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    Ok(WikiEngine::with_config(Arc::new(store), config))
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_import(engine: &Engine, file: &Path) -> i32 {
    let snapshot: Snapshot = match std::fs::read_to_string(file)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot read snapshot '{}': {}", file.display(), e);
            return 1;
        }
    };

    let store = engine.store();
    for world in &snapshot.worlds {
        if let Err(e) = store.save_world(world).await {
            eprintln!("Error: {}", e);
            return 1;
        }
    }
    for campaign in &snapshot.campaigns {
        if let Err(e) = store.save_campaign(campaign).await {
            eprintln!("Error: {}", e);
            return 1;
        }
    }
    for arc in &snapshot.arcs {
        if let Err(e) = store.save_arc(arc).await {
            eprintln!("Error: {}", e);
            return 1;
        }
    }

    let mut edges = 0;
    for article in &snapshot.articles {
        match engine.save_article(article).await {
            Ok(written) => edges += written.len(),
            Err(e) => {
                eprintln!("Error: article {}: {}", article.id, e);
                return 1;
            }
        }
    }
    println!(
        "Imported {} worlds, {} campaigns, {} arcs, {} articles ({} links)",
        snapshot.worlds.len(),
        snapshot.campaigns.len(),
        snapshot.arcs.len(),
        snapshot.articles.len(),
        edges
    );
    0
}

fn cmd_extract(file: &Path) -> i32 {
    match std::fs::read_to_string(file) {
        Ok(body) => print_json(&extract_links(Some(&body))),
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file.display(), e);
            1
        }
    }
}

async fn cmd_sync(engine: &Engine, article: &ArticleId) -> i32 {
    match engine.resync_links(article).await {
        Ok(edges) => {
            println!("Synchronized {} links for {}", edges.len(), article);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_links(engine: &Engine, article: &ArticleId, incoming: bool) -> i32 {
    let result = if incoming {
        engine.backlinks(article).await
    } else {
        engine.outgoing_links(article).await
    };
    match result {
        Ok(edges) => print_json(&edges),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_auto_link(
    engine: &Engine,
    article_id: &ArticleId,
    detect_only: bool,
    write: bool,
) -> i32 {
    let mut article = match engine.store().get_article(article_id).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            eprintln!("Error: article {} not found", article_id);
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mode = if detect_only {
        AutoLinkMode::DetectOnly
    } else {
        AutoLinkMode::Insert
    };
    let body = article.body.clone().unwrap_or_default();
    let outcome = match engine.auto_link(article_id, &body, mode).await {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if write && outcome.is_modified() {
        article.body = Some(outcome.body.clone());
        article.modified_at = Some(chrono::Utc::now());
        if let Err(e) = engine.save_article(&article).await {
            eprintln!("Error: {}", e);
            return 1;
        }
        eprintln!("Saved {} new links to {}", outcome.links_found(), article_id);
    }
    print_json(&outcome)
}

async fn cmd_breadcrumbs(engine: &Engine, article: &ArticleId, options: WalkOptions) -> i32 {
    match engine.breadcrumbs(article, options).await {
        Ok(trail) => print_json(&trail),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_path(engine: &Engine, article: &ArticleId) -> i32 {
    match engine.path(article).await {
        Ok(path) => {
            println!("{}", path);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_display_path(engine: &Engine, article: &ArticleId, keep_first: bool) -> i32 {
    match engine.display_path(article, !keep_first).await {
        Ok(path) => {
            println!("{}", path);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lorekeep=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(engine: &Engine, command: Commands) -> i32 {
    match command {
        Commands::Import { file } => cmd_import(engine, &file).await,
        Commands::Extract { file } => cmd_extract(&file),
        Commands::Sync { article } => cmd_sync(engine, &article).await,
        Commands::Links { article, incoming } => cmd_links(engine, &article, incoming).await,
        Commands::AutoLink {
            article,
            detect_only,
            write,
        } => cmd_auto_link(engine, &article, detect_only, write).await,
        Commands::Breadcrumbs {
            article,
            public_only,
            no_world,
            ancestors_only,
            virtual_groups,
        } => {
            let mut options = WalkOptions::default();
            options.public_only = public_only;
            options.include_world = !no_world;
            options.include_self = !ancestors_only;
            options.include_virtual_groups = virtual_groups;
            cmd_breadcrumbs(engine, &article, options).await
        }
        Commands::Path { article } => cmd_path(engine, &article).await,
        Commands::DisplayPath {
            article,
            keep_first,
        } => cmd_display_path(engine, &article, keep_first).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let Cli {
        db,
        config,
        command,
    } = Cli::parse();

    let code = match command {
        // Pure parsing, no database needed
        Commands::Extract { file } => cmd_extract(&file),
        command => match load_config(config.as_deref()).and_then(|c| open_engine(db, c)) {
            Ok(engine) => run(&engine, command).await,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
