//! In-memory search index and provider

use super::predicate::{Predicate, ScopeFilter};
use super::traits::{CandidateStream, IndexError, IndexProvider, IndexSettings, SearchContext, SearchIndex};
use crate::items::{Item, ItemId, ItemRepository, DEFAULT_MAX_ANCESTOR_DEPTH};
use crate::results::CandidateMatch;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Index over a fixed set of documents, evaluated by scanning
#[derive(Debug)]
pub struct MemoryIndex {
    name: String,
    settings: IndexSettings,
    documents: Vec<CandidateMatch>,
    open_contexts: AtomicUsize,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: IndexSettings::default(),
            documents: Vec::new(),
            open_contexts: AtomicUsize::new(0),
        }
    }

    pub fn with_settings(mut self, settings: IndexSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Documents are returned in insertion order
    pub fn with_documents(mut self, documents: impl IntoIterator<Item = CandidateMatch>) -> Self {
        self.documents.extend(documents);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of search contexts currently open
    pub fn open_contexts(&self) -> usize {
        self.open_contexts.load(Ordering::SeqCst)
    }
}

impl SearchIndex for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn settings(&self) -> IndexSettings {
        self.settings.clone()
    }

    fn create_search_context(&self) -> Result<Box<dyn SearchContext + '_>, IndexError> {
        self.open_contexts.fetch_add(1, Ordering::SeqCst);
        debug!("Opened search context on index {}", self.name);
        Ok(Box::new(MemoryContext { index: self }))
    }
}

/// Search context over a [`MemoryIndex`]
struct MemoryContext<'a> {
    index: &'a MemoryIndex,
}

impl SearchContext for MemoryContext<'_> {
    fn lookup<'a>(
        &'a self,
        predicate: &Predicate,
        scope: &ScopeFilter,
    ) -> Result<CandidateStream<'a>, IndexError> {
        let predicate = predicate.clone();
        let scope = scope.clone();

        Ok(Box::new(
            self.index
                .documents
                .iter()
                .filter(move |doc| predicate.matches(doc) && scope.admits(doc))
                .cloned()
                .map(Ok::<_, IndexError>),
        ))
    }
}

impl Drop for MemoryContext<'_> {
    fn drop(&mut self) {
        self.index.open_contexts.fetch_sub(1, Ordering::SeqCst);
        debug!("Released search context on index {}", self.index.name);
    }
}

/// Chooses the index whose root is the nearest ancestor-or-self of an item
pub struct MemoryIndexProvider {
    repository: Arc<dyn ItemRepository>,
    indexes: Vec<(ItemId, Arc<dyn SearchIndex>)>,
    max_depth: usize,
}

impl MemoryIndexProvider {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self {
            repository,
            indexes: Vec::new(),
            max_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
        }
    }

    /// Bound on how many ancestors are inspected when locating an index
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Register an index covering the subtree under `root`
    pub fn register(&mut self, root: ItemId, index: Arc<dyn SearchIndex>) {
        self.indexes.push((root, index));
    }

    pub fn with_index(mut self, root: ItemId, index: Arc<dyn SearchIndex>) -> Self {
        self.register(root, index);
        self
    }

    fn covering(&self, id: &ItemId) -> Option<Arc<dyn SearchIndex>> {
        self.indexes
            .iter()
            .find(|(root, _)| root == id)
            .map(|(_, index)| index.clone())
    }
}

impl IndexProvider for MemoryIndexProvider {
    fn index_for(&self, item: &Item) -> Result<Arc<dyn SearchIndex>, IndexError> {
        let mut visited: HashSet<ItemId> = HashSet::new();
        let mut current = item.clone();

        for _ in 0..self.max_depth {
            if let Some(index) = self.covering(&current.id) {
                return Ok(index);
            }
            if !visited.insert(current.id) {
                break;
            }
            match self.repository.parent(&current) {
                Ok(Some(parent)) => current = parent,
                Ok(None) | Err(_) => break,
            }
        }

        Err(IndexError::NotFound(item.id))
    }
}
