//! Lorekeep: the link and hierarchy core of a campaign wiki
//!
//! Articles in a world reference each other through link markup embedded in
//! their bodies and form a tree through parent references. This crate keeps
//! the derived data around those bodies honest.
//!
//! # Components
//!
//! - **Link extractor**: finds `[[uuid|text]]` and `data-target-id` links in a body
//! - **Link synchronizer**: swaps an article's persisted edge set for what its body says
//! - **Auto-linker**: turns plain mentions of other article titles into links
//! - **Hierarchy walker**: builds breadcrumbs and paths up the parent chain
//!
//! # Example
//!
//! ```
//! use lorekeep::extract_links;
//!
//! let links = extract_links(Some("See [[12345678-1234-1234-1234-123456789012|the keep]]"));
//! assert_eq!(links.len(), 1);
//! assert_eq!(links[0].display_text.as_deref(), Some("the keep"));
//! ```

pub mod cancel;
pub mod config;
pub mod hierarchy;
pub mod links;
pub mod sanitize;
pub mod storage;
pub mod wiki;

pub use cancel::CancellationToken;
pub use config::{ConfigError, HierarchyConfig, WikiConfig};
pub use hierarchy::{Breadcrumb, BreadcrumbNode, HierarchyWalker, VirtualGroup, WalkOptions};
pub use links::{
    extract_links, overlaps_protected, protected_ranges, AutoLinkConfig, AutoLinkMatch,
    AutoLinkMode, AutoLinkOutcome, AutoLinker, LinkMarkup, LinkSynchronizer, ParsedLink,
    ProtectedRange,
};
pub use storage::{
    ArticleStore, LinkCandidate, LinkStore, OpenStore, SqliteStore, StorageError, StorageResult,
};
pub use wiki::{
    Article, ArticleId, ArticleType, Campaign, LinkEdge, StoryArc, Visibility, WikiEngine,
    WikiError, WikiResult, World, WorldId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
