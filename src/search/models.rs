//! Search arguments and related data models

use crate::items::Item;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flavour of the search UI that issued the query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Historical search box; tolerates duplicate identities
    Classic,
    /// Content editor search; no primary strategy and no subtree restriction
    ContentEditor,
    #[default]
    Default,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::ContentEditor => "content-editor",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "content-editor" | "contenteditor" => Ok(Self::ContentEditor),
            "default" => Ok(Self::Default),
            other => Err(format!("unknown search mode '{}'", other)),
        }
    }
}

/// A content language, identified by name (e.g. `en`, `ja-JP`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language {
    pub name: String,
}

impl Language {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Arguments of one search invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArgs {
    /// Free text typed by the user
    pub text_query: String,
    /// Preferred content language
    pub content_language: Option<Language>,
    /// Subtree to search; the repository root when absent
    pub root: Option<Item>,
    pub mode: SearchMode,
    /// Maximum number of accepted results
    pub limit: usize,
    pub show_hidden_items: bool,
    /// Set upstream when the legacy engine already handles this search
    pub use_legacy_search_engine: bool,
}

impl SearchArgs {
    /// Create arguments for a plain text search
    pub fn new(text_query: impl Into<String>) -> Self {
        Self {
            text_query: text_query.into(),
            content_language: None,
            root: None,
            mode: SearchMode::Default,
            limit: crate::DEFAULT_LIMIT,
            show_hidden_items: false,
            use_legacy_search_engine: false,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.content_language = Some(language);
        self
    }

    pub fn with_root(mut self, root: Item) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_hidden_items(mut self, show: bool) -> Self {
        self.show_hidden_items = show;
        self
    }

    pub fn with_legacy_engine(mut self, legacy: bool) -> Self {
        self.use_legacy_search_engine = legacy;
        self
    }

    /// Language preference, active only for a non-empty language name
    pub fn preferred_language(&self) -> Option<&str> {
        self.content_language
            .as_ref()
            .map(|lang| lang.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Check if there is nothing to search for
    pub fn is_empty(&self) -> bool {
        self.text_query.is_empty()
    }
}

/// What a search invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Results were written to the sink
    Completed { emitted: usize },
    /// Handed off to the legacy search engine
    LegacyEngine,
    /// The index provider, or the selected index, is switched off
    ProviderOff,
    /// No text to search for
    EmptyQuery,
    /// No index covers the search root
    NoIndex,
    /// The search faulted; nothing was emitted
    Failed,
}

impl SearchOutcome {
    /// Number of display entries written to the sink
    pub fn emitted(&self) -> usize {
        match self {
            Self::Completed { emitted } => *emitted,
            _ => 0,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { emitted } => write!(f, "{} results", emitted),
            Self::LegacyEngine => write!(f, "handed off to the legacy search engine"),
            Self::ProviderOff => write!(f, "index provider is switched off"),
            Self::EmptyQuery => write!(f, "empty query"),
            Self::NoIndex => write!(f, "no index found"),
            Self::Failed => write!(f, "search failed"),
        }
    }
}
