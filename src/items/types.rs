//! Item type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// URI scheme used for item locators
pub const ITEM_URI_SCHEME: &str = "item";

/// Unique identity of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random identity
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hyphenated = self.0.hyphenated().to_string().to_uppercase();
        write!(f, "{{{}}}", hyphenated)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    /// Accepts both braced (`{...}`) and plain UUID forms
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('{').trim_end_matches('}');
        Uuid::parse_str(trimmed).map(Self)
    }
}

impl TryFrom<String> for ItemId {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

/// Presentation flags of an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    /// Hidden items (and everything below them) are excluded from results
    pub hidden: bool,
    /// Icon reference shown next to the item
    pub icon: Option<String>,
}

/// A content item as resolved from the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub appearance: Appearance,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            appearance: Appearance::default(),
        }
    }

    pub fn with_parent(mut self, parent: ItemId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.appearance.hidden = true;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.appearance.icon = Some(icon.into());
        self
    }
}

/// Errors raised while parsing an item locator
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    #[error("invalid item uri: {0}")]
    Malformed(String),
    #[error("unsupported scheme '{0}', expected 'item'")]
    Scheme(String),
    #[error("item uri is missing the {0}")]
    Missing(&'static str),
}

/// Addressable locator of one language version of an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemUri {
    pub database: String,
    pub item_id: ItemId,
    pub language: String,
    pub version: u32,
}

impl ItemUri {
    pub fn new(
        database: impl Into<String>,
        item_id: ItemId,
        language: impl Into<String>,
        version: u32,
    ) -> Self {
        Self {
            database: database.into(),
            item_id,
            language: language.into(),
            version,
        }
    }

    /// Render as `item://<database>/<id>?lang=<language>&ver=<version>`
    pub fn to_url(&self) -> Result<Url, UriError> {
        let base = format!(
            "{}://{}/{}",
            ITEM_URI_SCHEME,
            self.database,
            self.item_id.as_uuid().hyphenated()
        );
        let mut url = Url::parse(&base).map_err(|e| UriError::Malformed(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("lang", &self.language)
            .append_pair("ver", &self.version.to_string());
        Ok(url)
    }
}

impl fmt::Display for ItemUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_url() {
            Ok(url) => write!(f, "{}", url),
            Err(_) => write!(
                f,
                "{}://{}/{}?lang={}&ver={}",
                ITEM_URI_SCHEME,
                self.database,
                self.item_id.as_uuid().hyphenated(),
                self.language,
                self.version
            ),
        }
    }
}

impl FromStr for ItemUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| UriError::Malformed(e.to_string()))?;
        if url.scheme() != ITEM_URI_SCHEME {
            return Err(UriError::Scheme(url.scheme().to_string()));
        }

        let database = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(UriError::Missing("database"))?
            .to_string();
        let item_id = url
            .path()
            .trim_start_matches('/')
            .parse::<ItemId>()
            .map_err(|_| UriError::Missing("item id"))?;

        let mut language = None;
        let mut version = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "lang" => language = Some(value.into_owned()),
                "ver" => version = value.parse::<u32>().ok(),
                _ => {}
            }
        }

        Ok(Self {
            database,
            item_id,
            language: language.ok_or(UriError::Missing("language"))?,
            version: version.ok_or(UriError::Missing("version"))?,
        })
    }
}

/// Errors raised by an item repository
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The reference points at an item that no longer exists in a usable form
    #[error("reference to item {0} is no longer valid")]
    InvalidReference(ItemId),
    #[error("item repository unavailable: {0}")]
    Unavailable(String),
}

/// Source of truth for content items
pub trait ItemRepository: Send + Sync {
    /// The top-level item of the content tree
    fn root_item(&self) -> Result<Option<Item>, RepositoryError>;

    /// Resolve an item by identity
    fn resolve(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError>;

    /// Parent of an item, `None` at the top of the tree
    fn parent(&self, item: &Item) -> Result<Option<Item>, RepositoryError> {
        match item.parent_id {
            Some(ref parent) => self.resolve(parent),
            None => Ok(None),
        }
    }

    /// The item's own hidden flag, ignoring ancestors
    fn is_hidden_flag(&self, item: &Item) -> bool {
        item.appearance.hidden
    }
}
