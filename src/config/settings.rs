//! Settings structures for item-search configuration

use crate::index::{IndexSettings, DEFAULT_EXACT_MATCH_LANGUAGES};
use crate::items::{ItemId, DEFAULT_MAX_ANCESTOR_DEPTH};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Icon shown for results that define none of their own
pub const DEFAULT_ICON: &str = "Applications/16x16/document.png";

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub indexes: Vec<IndexConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            search: SearchSettings::default(),
            indexes: default_indexes(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (ITEM_SEARCH_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ITEM_SEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = lookup("ITEM_SEARCH_LOG_LEVEL") {
            self.general.log_level = val;
        }
        if let Some(val) = lookup("ITEM_SEARCH_ENABLED") {
            if let Ok(enabled) = val.parse() {
                self.search.enabled = enabled;
            }
        }
        if let Some(val) = lookup("ITEM_SEARCH_DEFAULT_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.search.default_limit = limit;
            }
        }
        if let Some(val) = lookup("ITEM_SEARCH_SHOW_HIDDEN") {
            if let Ok(show) = val.parse() {
                self.search.show_hidden_items = show;
            }
        }
    }

    /// Get index configuration by name
    pub fn get_index(&self, name: &str) -> Option<&IndexConfig> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Settings handle for an index; the search-wide default icon fills gaps
    pub fn index_settings(&self, index: &IndexConfig) -> IndexSettings {
        IndexSettings {
            default_icon: index
                .default_icon
                .clone()
                .or_else(|| Some(self.search.default_icon.clone())),
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug mode
    pub debug: bool,
    /// Log filter directive used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
        }
    }
}

/// Search behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Index-backed search; when off the legacy engine handles searches
    pub enabled: bool,
    /// Global index provider switch
    pub index_switch_on: bool,
    /// Result capacity when the caller does not set one
    pub default_limit: usize,
    /// Include hidden items by default
    pub show_hidden_items: bool,
    /// Language prefixes matched exactly instead of by substring
    pub exact_match_languages: Vec<String>,
    /// Bound on the ancestor walk for hidden-item detection
    pub max_ancestor_depth: usize,
    /// Number of indexes whose settings are cached
    pub settings_cache_capacity: u64,
    /// Fallback icon for indexes that configure none
    pub default_icon: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            index_switch_on: true,
            default_limit: crate::DEFAULT_LIMIT,
            show_hidden_items: false,
            exact_match_languages: DEFAULT_EXACT_MATCH_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            settings_cache_capacity: crate::cache::DEFAULT_SETTINGS_CACHE_CAPACITY,
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

/// Individual index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Index name (unique identifier)
    pub name: String,
    /// Root of the subtree covered; the repository root when absent
    pub root: Option<ItemId>,
    /// Whether the index is switched on
    pub enabled: bool,
    /// Icon for results without one
    pub default_icon: Option<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            root: None,
            enabled: true,
            default_icon: None,
        }
    }
}

/// Default index configurations
fn default_indexes() -> Vec<IndexConfig> {
    vec![IndexConfig {
        name: "master_index".to_string(),
        ..Default::default()
    }]
}
