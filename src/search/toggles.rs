//! Feature toggles gating index-backed search

use crate::config::Settings;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Switches consulted before the index is touched
pub trait FeatureToggles: Send + Sync {
    /// Index-backed search is enabled at all; otherwise the legacy engine runs
    fn content_search_enabled(&self) -> bool;

    /// The index provider as a whole is switched on
    fn is_on(&self) -> bool;

    /// The named index is administratively enabled
    fn is_index_on(&self, index_name: &str) -> bool;
}

/// Runtime-adjustable toggles, e.g. to pause an index while it is rebuilt
#[derive(Debug)]
pub struct IndexSwitchTracker {
    content_search_enabled: AtomicBool,
    provider_on: AtomicBool,
    disabled_indexes: RwLock<HashSet<String>>,
}

impl Default for IndexSwitchTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IndexSwitchTracker {
    pub fn new(content_search_enabled: bool) -> Self {
        Self {
            content_search_enabled: AtomicBool::new(content_search_enabled),
            provider_on: AtomicBool::new(true),
            disabled_indexes: RwLock::new(HashSet::new()),
        }
    }

    /// Build from configuration: the global switch and per-index `enabled` flags
    pub fn from_settings(settings: &Settings) -> Self {
        let tracker = Self::new(settings.search.enabled);
        tracker
            .provider_on
            .store(settings.search.index_switch_on, Ordering::SeqCst);

        for index in settings.indexes.iter().filter(|i| !i.enabled) {
            tracker.turn_off_index(&index.name);
        }
        tracker
    }

    pub fn set_content_search_enabled(&self, enabled: bool) {
        self.content_search_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn turn_on(&self) {
        self.provider_on.store(true, Ordering::SeqCst);
        info!("Index provider switched on");
    }

    pub fn turn_off(&self) {
        self.provider_on.store(false, Ordering::SeqCst);
        info!("Index provider switched off");
    }

    pub fn turn_on_index(&self, index_name: &str) {
        self.disabled_indexes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(index_name);
        info!("Index {} switched on", index_name);
    }

    pub fn turn_off_index(&self, index_name: &str) {
        self.disabled_indexes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(index_name.to_string());
        info!("Index {} switched off", index_name);
    }
}

impl FeatureToggles for IndexSwitchTracker {
    fn content_search_enabled(&self) -> bool {
        self.content_search_enabled.load(Ordering::SeqCst)
    }

    fn is_on(&self) -> bool {
        self.provider_on.load(Ordering::SeqCst)
    }

    fn is_index_on(&self, index_name: &str) -> bool {
        self.is_on()
            && !self
                .disabled_indexes
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(index_name)
    }
}
