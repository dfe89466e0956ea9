//! Link extraction, synchronization and auto-linking

mod autolink;
mod parser;
mod ranges;
mod sync;

pub use autolink::{
    render_link, AutoLinkConfig, AutoLinkMatch, AutoLinkMode, AutoLinkOutcome, AutoLinker,
    LinkMarkup,
};
pub use parser::{extract_links, ParsedLink};
pub use ranges::{overlaps_protected, protected_ranges, ProtectedRange};
pub use sync::LinkSynchronizer;
