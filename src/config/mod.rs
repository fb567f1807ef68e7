//! Configuration module for item-search
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "ITEM_SEARCH_SETTINGS_PATH";

/// Candidate settings locations, in lookup order
pub fn settings_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from("settings.yml"));
    paths.push(PathBuf::from("config/settings.yml"));
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("item-search/settings.yml"));
    }
    paths
}

/// The explicit path, or the first existing default location
pub fn locate(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| settings_paths().into_iter().find(|p| p.exists()))
}

/// Load settings from `path`, or use defaults. Environment overrides are applied last.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.merge_env();
    Ok(settings)
}
