//! Worlds, campaigns and arcs: the containers articles hang off

use super::slug::slugify;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(Uuid);

impl WorldId {
    /// Create a new random WorldId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for WorldId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorldId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Minimal world identity, enough to render a breadcrumb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub id: WorldId,
    pub name: String,
    pub slug: String,
}

impl World {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: WorldId::new(),
            slug: slugify(&name),
            name,
        }
    }

    pub fn with_id(mut self, id: WorldId) -> Self {
        self.id = id;
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}

/// A campaign running inside a world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub world_id: WorldId,
    pub name: String,
}

impl Campaign {
    pub fn new(world_id: WorldId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            world_id,
            name: name.into(),
        }
    }
}

/// A story arc grouping sessions within a campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryArc {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub name: String,
}

impl StoryArc {
    pub fn new(campaign_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            name: name.into(),
        }
    }
}
