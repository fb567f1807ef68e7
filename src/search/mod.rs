//! Search orchestration module
//!
//! Gates the search on feature toggles, resolves candidates from the index
//! and reduces them into display entries.

mod executor;
mod models;
mod strategy;
mod toggles;

pub use executor::{ContentSearch, SearchError};
pub use models::*;
pub use strategy::SearchStrategy;
pub use toggles::{FeatureToggles, IndexSwitchTracker};
