//! Wiki domain types and the engine that ties the components together

mod article;
mod engine;
mod link;
mod slug;
mod world;

pub use article::{Article, ArticleId, ArticleType, Visibility, UNTITLED};
pub use engine::{WikiEngine, WikiError, WikiResult};
pub use link::{LinkEdge, LinkId};
pub use slug::{is_valid_slug, slugify, FALLBACK_SLUG};
pub use world::{Campaign, StoryArc, World, WorldId};
