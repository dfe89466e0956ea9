//! Breadcrumbs and paths through the article tree

mod breadcrumb;
mod options;
mod walker;

pub use breadcrumb::{Breadcrumb, BreadcrumbNode, VirtualGroup};
pub use options::{WalkOptions, DEFAULT_MAX_DEPTH};
pub use walker::HierarchyWalker;
