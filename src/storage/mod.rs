//! Storage backends for the wiki
//!
//! Articles are read through `ArticleStore` and link edges written through
//! `LinkStore`. The primary implementation is `SqliteStore`.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ArticleStore, LinkCandidate, LinkStore, OpenStore, StorageError, StorageResult};
