//! Caching module
//!
//! Index settings are looked up once per index and shared across searches.

use crate::index::{IndexSettings, SearchIndex};
use moka::sync::Cache;
use std::sync::Arc;

/// Default number of distinct indexes whose settings are retained
pub const DEFAULT_SETTINGS_CACHE_CAPACITY: u64 = 64;

/// Get-or-compute cache of index settings, keyed by index name
#[derive(Clone)]
pub struct SettingsCache {
    cache: Cache<String, Arc<IndexSettings>>,
}

impl SettingsCache {
    /// Create a new settings cache holding at most `max_capacity` indexes
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        Self { cache }
    }

    /// Settings of `index`, read from the index only on first use.
    /// Concurrent first calls for the same index compute the value once.
    pub fn get_or_load(&self, index: &dyn SearchIndex) -> Arc<IndexSettings> {
        self.cache
            .get_with(index.name().to_string(), || Arc::new(index.settings()))
    }

    /// Cached settings, without loading
    pub fn get(&self, index_name: &str) -> Option<Arc<IndexSettings>> {
        self.cache.get(index_name)
    }

    /// Drop the cached settings of one index
    pub fn invalidate(&self, index_name: &str) {
        self.cache.invalidate(index_name);
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_CACHE_CAPACITY)
    }
}
