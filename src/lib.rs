//! item-search: index-backed search over a content repository
//!
//! Given a text query and a scope, queries a search index, merges the
//! returned versions by item identity and language preference, drops hidden
//! items and emits a bounded list of display entries.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod display;
pub mod index;
pub mod items;
pub mod results;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Settings;
pub use display::ResultSink;
pub use results::{CandidateMatch, DisplayEntry, ResultSet};
pub use search::{ContentSearch, SearchArgs, SearchMode, SearchOutcome};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of accepted results per search
pub const DEFAULT_LIMIT: usize = 100;
