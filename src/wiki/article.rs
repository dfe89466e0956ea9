//! Article representation in the wiki tree

use super::slug::slugify;
use super::world::WorldId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Title shown for articles whose title is blank
pub const UNTITLED: &str = "(Untitled)";

/// Unique identifier for an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(Uuid);

impl ArticleId {
    /// Create a new random ArticleId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an ArticleId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArticleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Kind of content an article holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleType {
    #[default]
    WikiArticle,
    Character,
    CharacterNote,
    Session,
    SessionNote,
    Legacy,
    Tutorial,
}

impl ArticleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::WikiArticle => "wiki_article",
            ArticleType::Character => "character",
            ArticleType::CharacterNote => "character_note",
            ArticleType::Session => "session",
            ArticleType::SessionNote => "session_note",
            ArticleType::Legacy => "legacy",
            ArticleType::Tutorial => "tutorial",
        }
    }

    /// Session-like articles hang off a campaign rather than the wiki tree
    pub fn is_session(&self) -> bool {
        matches!(self, ArticleType::Session | ArticleType::SessionNote)
    }

    pub fn is_character(&self) -> bool {
        matches!(self, ArticleType::Character | ArticleType::CharacterNote)
    }
}

impl FromStr for ArticleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wiki_article" => Ok(ArticleType::WikiArticle),
            "character" => Ok(ArticleType::Character),
            "character_note" => Ok(ArticleType::CharacterNote),
            "session" => Ok(ArticleType::Session),
            "session_note" => Ok(ArticleType::SessionNote),
            "legacy" => Ok(ArticleType::Legacy),
            "tutorial" => Ok(ArticleType::Tutorial),
            other => Err(format!("unknown article type: {}", other)),
        }
    }
}

/// Who may read an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    MembersOnly,
    #[default]
    Private,
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::MembersOnly => "members_only",
            Visibility::Private => "private",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "members_only" => Ok(Visibility::MembersOnly),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility: {}", other)),
        }
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// A single wiki article
///
/// Articles form a forest through `parent_id`, but nothing enforces it:
/// a parent may be missing or point back down the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    /// URL-safe name, unique among siblings
    pub slug: String,
    /// Rich-text body with embedded link markup
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub parent_id: Option<ArticleId>,
    #[serde(default)]
    pub world_id: Option<WorldId>,
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
    #[serde(default)]
    pub arc_id: Option<Uuid>,
    #[serde(default)]
    pub article_type: ArticleType,
    #[serde(default)]
    pub visibility: Visibility,
    /// Alternative names the auto-linker also looks for
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Create a private wiki article in a world, slugged from its title
    pub fn new(world_id: WorldId, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: ArticleId::new(),
            slug: slugify(&title),
            title,
            body: None,
            parent_id: None,
            world_id: Some(world_id),
            campaign_id: None,
            arc_id: None,
            article_type: ArticleType::default(),
            visibility: Visibility::default(),
            aliases: Vec::new(),
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    pub fn with_id(mut self, id: ArticleId) -> Self {
        self.id = id;
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_parent(mut self, parent_id: ArticleId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_type(mut self, article_type: ArticleType) -> Self {
        self.article_type = article_type;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn public(self) -> Self {
        self.with_visibility(Visibility::Public)
    }

    /// Attach the article to a campaign and, optionally, an arc within it
    pub fn in_campaign(mut self, campaign_id: Uuid, arc_id: Option<Uuid>) -> Self {
        self.campaign_id = Some(campaign_id);
        self.arc_id = arc_id;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Title for display, falling back to a placeholder when blank
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Whether breadcrumbs should treat this article as part of a campaign
    pub fn is_session(&self) -> bool {
        self.article_type.is_session() || self.campaign_id.is_some()
    }
}
