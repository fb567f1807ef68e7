//! Hidden-item detection over the ancestor chain

use super::types::{Item, ItemId, ItemRepository};
use std::collections::HashSet;

/// Default bound on how many ancestors are inspected
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 256;

/// Decides whether items are hidden, walking up to the tree root
pub struct VisibilityCheck<'a> {
    repository: &'a dyn ItemRepository,
    max_depth: usize,
}

impl<'a> VisibilityCheck<'a> {
    pub fn new(repository: &'a dyn ItemRepository) -> Self {
        Self {
            repository,
            max_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// An item is hidden when it, or any of its ancestors, carries the hidden flag.
    ///
    /// The walk stops as "not hidden" when the chain loops back on itself, exceeds
    /// the depth bound, or a parent cannot be resolved.
    pub fn is_hidden(&self, item: &Item) -> bool {
        let mut visited: HashSet<ItemId> = HashSet::new();
        let mut current = item.clone();

        for _ in 0..self.max_depth {
            if self.repository.is_hidden_flag(&current) {
                return true;
            }
            if !visited.insert(current.id) {
                return false;
            }
            match self.repository.parent(&current) {
                Ok(Some(parent)) => current = parent,
                Ok(None) | Err(_) => return false,
            }
        }

        false
    }

    /// Visibility of the item behind a search candidate; resolution failures count as visible
    pub fn is_candidate_hidden(&self, id: &ItemId) -> bool {
        match self.repository.resolve(id) {
            Ok(Some(item)) => self.is_hidden(&item),
            Ok(None) | Err(_) => false,
        }
    }
}
