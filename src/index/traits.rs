//! Index traits and types

use super::predicate::{Predicate, ScopeFilter};
use crate::items::{Item, ItemId};
use crate::results::CandidateMatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Lazy, pull-based sequence of candidates produced by an index
pub type CandidateStream<'a> = Box<dyn Iterator<Item = Result<CandidateMatch, IndexError>> + 'a>;

/// Errors raised by index providers and search contexts
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    /// No index covers the given item
    #[error("no index found for item {0}")]
    NotFound(ItemId),
    /// The query could not be evaluated
    #[error("query evaluation failed: {0}")]
    Query(String),
    /// A search context could not be opened
    #[error("failed to open search context: {0}")]
    Context(String),
}

/// Per-index settings handle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Icon used when neither the document nor the item defines one
    pub default_icon: Option<String>,
}

/// A searchable index
pub trait SearchIndex: Send + Sync {
    /// Unique index name
    fn name(&self) -> &str;

    /// Settings attached to this index
    fn settings(&self) -> IndexSettings;

    /// Open a scoped search context; it is released when dropped
    fn create_search_context(&self) -> Result<Box<dyn SearchContext + '_>, IndexError>;
}

/// An open session against an index
pub trait SearchContext {
    /// Evaluate `predicate` restricted to `scope`
    fn lookup<'a>(
        &'a self,
        predicate: &Predicate,
        scope: &ScopeFilter,
    ) -> Result<CandidateStream<'a>, IndexError>;
}

/// Locates the index responsible for a part of the content tree
pub trait IndexProvider: Send + Sync {
    fn index_for(&self, item: &Item) -> Result<Arc<dyn SearchIndex>, IndexError>;
}
