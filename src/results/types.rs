//! Result type definitions

use crate::items::{ItemId, ItemUri};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Built-in field holding an explicit icon for an indexed item
pub const ICON_FIELD: &str = "_icon";

/// One indexed version of an item, as returned by a search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Identity shared by every version and language of the item
    pub item_id: ItemId,
    /// Raw item name
    pub name: String,
    /// Localized display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Indexed body text
    #[serde(default)]
    pub content: String,
    /// Language of this version
    pub language: String,
    /// Version number within the language
    pub version: u32,
    /// The item itself and all of its ancestors
    #[serde(default)]
    pub paths: HashSet<ItemId>,
    /// Remaining stored fields
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
    /// Addressable locator
    #[serde(default)]
    pub uri: Option<ItemUri>,
}

impl CandidateMatch {
    /// Create a new candidate
    pub fn new(item_id: ItemId, name: impl Into<String>, language: impl Into<String>, version: u32) -> Self {
        let mut paths = HashSet::new();
        paths.insert(item_id);

        Self {
            item_id,
            name: name.into(),
            display_name: None,
            content: String::new(),
            language: language.into(),
            version,
            paths,
            fields: HashMap::new(),
            uri: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Add ancestor identities
    pub fn with_paths(mut self, paths: impl IntoIterator<Item = ItemId>) -> Self {
        self.paths.extend(paths);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_icon(self, icon: impl Into<String>) -> Self {
        self.with_field(ICON_FIELD, serde_json::Value::String(icon.into()))
    }

    pub fn with_uri(mut self, uri: ItemUri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Icon stored with the indexed document, if any
    pub fn icon(&self) -> Option<String> {
        match self.fields.get(ICON_FIELD)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Label to display: the display name, falling back to the raw name
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|label| !label.is_empty())
            .or(Some(self.name.as_str()))
            .filter(|label| !label.is_empty())
    }

    /// Whether `root` is this item or one of its ancestors
    pub fn is_within(&self, root: &ItemId) -> bool {
        self.paths.contains(root)
    }
}

/// The label/icon/address triple handed to the result sink
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub label: String,
    pub icon: String,
    pub address: String,
}

impl DisplayEntry {
    pub fn new(label: impl Into<String>, icon: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
            address: address.into(),
        }
    }
}
