//! Options controlling a breadcrumb walk

use crate::wiki::World;

/// Hard cap on ancestor lookups for a single walk
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// What a breadcrumb walk includes
///
/// Each toggle is independent. The defaults give the full trail:
/// world, every ancestor, and the article itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Prepend a node for the owning world
    pub include_world: bool,
    /// End the trail with the queried article
    pub include_self: bool,
    /// Stop at the first private ancestor
    pub public_only: bool,
    /// Insert campaign/arc or category nodes between world and articles
    pub include_virtual_groups: bool,
    /// Pre-resolved world, used verbatim instead of a lookup
    pub world: Option<World>,
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            include_world: true,
            include_self: true,
            public_only: false,
            include_virtual_groups: false,
            world: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_world(mut self) -> Self {
        self.include_world = false;
        self
    }

    /// Leave the queried article itself out of the trail
    pub fn ancestors_only(mut self) -> Self {
        self.include_self = false;
        self
    }

    pub fn public_only(mut self) -> Self {
        self.public_only = true;
        self
    }

    pub fn with_virtual_groups(mut self) -> Self {
        self.include_virtual_groups = true;
        self
    }

    pub fn with_world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
