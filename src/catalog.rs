//! YAML catalog of content items
//!
//! A catalog describes a content tree together with the language versions of
//! each item. It is turned into an in-memory repository and the documents of
//! in-memory indexes.

use crate::index::{IndexSettings, MemoryIndex};
use crate::items::{Appearance, Item, ItemId, ItemUri, MemoryRepository};
use crate::results::CandidateMatch;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A content tree with indexed versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Database name used in item locators
    #[serde(default = "default_database")]
    pub database: String,
    /// Root of the tree; the first parentless item when absent
    #[serde(default)]
    pub root: Option<ItemId>,
    pub items: Vec<CatalogItem>,
}

fn default_database() -> String {
    "master".to_string()
}

/// One item of the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<ItemId>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub versions: Vec<CatalogVersion>,
}

/// One language version of an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogVersion {
    pub language: String,
    #[serde(default = "first_version")]
    pub version: u32,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

fn first_version() -> u32 {
    1
}

impl Catalog {
    /// Load a catalog from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a catalog from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                bail!("duplicate item id {} in catalog", item.id);
            }
        }
        for item in &self.items {
            if let Some(parent) = item.parent {
                if !seen.contains(&parent) {
                    bail!("item {} refers to unknown parent {}", item.id, parent);
                }
            }
        }
        if let Some(root) = self.root {
            if !seen.contains(&root) {
                bail!("catalog root {} is not an item of the catalog", root);
            }
        }
        Ok(())
    }

    /// Explicit root, or the first item without a parent
    pub fn root_id(&self) -> Option<ItemId> {
        self.root
            .or_else(|| self.items.iter().find(|i| i.parent.is_none()).map(|i| i.id))
    }

    /// Build the item repository
    pub fn repository(&self) -> MemoryRepository {
        let mut repository = MemoryRepository::new();
        for entry in &self.items {
            repository.insert(Item {
                id: entry.id,
                name: entry.name.clone(),
                parent_id: entry.parent,
                appearance: Appearance {
                    hidden: entry.hidden,
                    icon: entry.icon.clone(),
                },
            });
        }
        if let Some(root) = self.root_id() {
            repository.set_root(root);
        }
        repository
    }

    /// Index documents for every version, in catalog order
    pub fn documents(&self, repository: &MemoryRepository) -> Vec<CandidateMatch> {
        self.items
            .iter()
            .flat_map(|entry| {
                let lineage = repository.lineage(&entry.id);
                entry.versions.iter().map(move |version| {
                    let mut doc = CandidateMatch::new(
                        entry.id,
                        entry.name.clone(),
                        version.language.clone(),
                        version.version,
                    )
                    .with_content(version.content.clone())
                    .with_paths(lineage.clone())
                    .with_uri(ItemUri::new(
                        self.database.clone(),
                        entry.id,
                        version.language.clone(),
                        version.version,
                    ));
                    doc.display_name = version.display_name.clone();
                    doc.fields.extend(version.fields.clone());
                    doc
                })
            })
            .collect()
    }

    /// Build an index over the subtree under `root`
    pub fn index(
        &self,
        name: &str,
        root: ItemId,
        settings: IndexSettings,
        repository: &MemoryRepository,
    ) -> MemoryIndex {
        let documents = self
            .documents(repository)
            .into_iter()
            .filter(|doc| doc.is_within(&root));

        MemoryIndex::new(name)
            .with_settings(settings)
            .with_documents(documents)
    }
}
