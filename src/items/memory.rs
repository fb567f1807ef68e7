//! In-memory item repository

use super::types::{Item, ItemId, ItemRepository, RepositoryError};
use std::collections::{HashMap, HashSet};

/// Item repository held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    items: HashMap<ItemId, Item>,
    root: Option<ItemId>,
    /// References that fail to resolve, e.g. items deleted after indexing
    invalid: HashSet<ItemId>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item
    pub fn insert(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    pub fn set_root(&mut self, root: ItemId) {
        self.root = Some(root);
    }

    /// Make later resolutions of `id` fail with an invalid reference error
    pub fn invalidate(&mut self, id: ItemId) {
        self.invalid.insert(id);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identities of `id` and all of its ancestors, nearest first
    pub fn lineage(&self, id: &ItemId) -> Vec<ItemId> {
        let mut lineage = Vec::new();
        let mut current = self.items.get(id);

        while let Some(item) = current {
            if lineage.contains(&item.id) {
                break;
            }
            lineage.push(item.id);
            current = item.parent_id.as_ref().and_then(|p| self.items.get(p));
        }

        lineage
    }
}

impl ItemRepository for MemoryRepository {
    fn root_item(&self) -> Result<Option<Item>, RepositoryError> {
        match self.root {
            Some(ref root) => self.resolve(root),
            None => Ok(None),
        }
    }

    fn resolve(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        if self.invalid.contains(id) {
            return Err(RepositoryError::InvalidReference(*id));
        }
        Ok(self.items.get(id).cloned())
    }
}
