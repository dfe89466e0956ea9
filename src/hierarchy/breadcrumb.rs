//! Breadcrumb nodes

use crate::wiki::{slugify, Article, ArticleId, ArticleType, Campaign, StoryArc, World, WorldId};
use serde::Serialize;
use uuid::Uuid;

/// A synthetic grouping node; never persisted and never a link target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "group", content = "id", rename_all = "snake_case")]
pub enum VirtualGroup {
    Campaign(Uuid),
    Arc(Uuid),
    PlayerCharacters,
    Wiki,
}

/// What a breadcrumb points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "ref", rename_all = "snake_case")]
pub enum BreadcrumbNode {
    World(WorldId),
    Article(ArticleId),
    Group(VirtualGroup),
}

/// One entry of a root-to-leaf trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub node: BreadcrumbNode,
    pub title: String,
    pub slug: String,
    /// Set for article nodes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_type: Option<ArticleType>,
}

impl Breadcrumb {
    pub fn world(world: &World) -> Self {
        Self {
            node: BreadcrumbNode::World(world.id),
            title: world.name.clone(),
            slug: world.slug.clone(),
            article_type: None,
        }
    }

    pub fn article(article: &Article) -> Self {
        Self {
            node: BreadcrumbNode::Article(article.id),
            title: article.display_title().to_string(),
            slug: article.slug.clone(),
            article_type: Some(article.article_type),
        }
    }

    pub fn campaign(campaign: &Campaign) -> Self {
        Self {
            node: BreadcrumbNode::Group(VirtualGroup::Campaign(campaign.id)),
            title: campaign.name.clone(),
            slug: slugify(&campaign.name),
            article_type: None,
        }
    }

    pub fn arc(arc: &StoryArc) -> Self {
        Self {
            node: BreadcrumbNode::Group(VirtualGroup::Arc(arc.id)),
            title: arc.name.clone(),
            slug: slugify(&arc.name),
            article_type: None,
        }
    }

    pub fn player_characters() -> Self {
        Self {
            node: BreadcrumbNode::Group(VirtualGroup::PlayerCharacters),
            title: "Player Characters".to_string(),
            slug: "characters".to_string(),
            article_type: None,
        }
    }

    pub fn wiki() -> Self {
        Self {
            node: BreadcrumbNode::Group(VirtualGroup::Wiki),
            title: "Wiki".to_string(),
            slug: "wiki".to_string(),
            article_type: None,
        }
    }

    pub fn is_world(&self) -> bool {
        matches!(self.node, BreadcrumbNode::World(_))
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.node, BreadcrumbNode::Group(_))
    }

    pub fn article_id(&self) -> Option<ArticleId> {
        match self.node {
            BreadcrumbNode::Article(id) => Some(id),
            _ => None,
        }
    }
}
