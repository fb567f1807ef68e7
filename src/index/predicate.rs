//! Fallback query predicate and subtree scope filter

use super::traits::CandidateStream;
use crate::items::ItemId;
use crate::results::CandidateMatch;
use crate::search::{SearchArgs, SearchMode};
use serde::{Deserialize, Serialize};

/// Language prefixes for which substring matching is disabled
pub const DEFAULT_EXACT_MATCH_LANGUAGES: &[&str] = &["ja"];

/// Text predicate evaluated against candidate documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Name starts with the text, or content contains it
    NameOrContent { text: String },
    /// Name starts with the text, or content contains it in the given language
    NameOrContentInLanguage { text: String, language: String },
    /// Name equals the text, or content equals it in the given language
    ExactInLanguage { text: String, language: String },
}

impl Predicate {
    pub fn text(&self) -> &str {
        match self {
            Self::NameOrContent { text }
            | Self::NameOrContentInLanguage { text, .. }
            | Self::ExactInLanguage { text, .. } => text,
        }
    }

    /// Evaluate against a document. Text comparisons ignore case, language
    /// comparison is exact.
    pub fn matches(&self, candidate: &CandidateMatch) -> bool {
        let name = candidate.name.to_lowercase();
        let content = candidate.content.to_lowercase();

        match self {
            Self::NameOrContent { text } => {
                let text = text.to_lowercase();
                name.starts_with(&text) || content.contains(&text)
            }
            Self::NameOrContentInLanguage { text, language } => {
                let text = text.to_lowercase();
                name.starts_with(&text)
                    || (content.contains(&text) && candidate.language == *language)
            }
            Self::ExactInLanguage { text, language } => {
                let text = text.to_lowercase();
                name == text || (content == text && candidate.language == *language)
            }
        }
    }
}

/// Builds the fallback predicate for a search
#[derive(Debug, Clone)]
pub struct PredicateBuilder {
    exact_match_languages: Vec<String>,
}

impl Default for PredicateBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_EXACT_MATCH_LANGUAGES.iter().map(|s| s.to_string()))
    }
}

impl PredicateBuilder {
    pub fn new(exact_match_languages: impl IntoIterator<Item = String>) -> Self {
        Self {
            exact_match_languages: exact_match_languages
                .into_iter()
                .filter(|marker| !marker.is_empty())
                .collect(),
        }
    }

    /// Scripts where substring search is meaningless get exact matching only
    pub fn is_exact_match_language(&self, language: &str) -> bool {
        self.exact_match_languages
            .iter()
            .any(|marker| language.starts_with(marker.as_str()))
    }

    pub fn build(&self, args: &SearchArgs) -> Predicate {
        let text = args.text_query.clone();

        match args.preferred_language() {
            None => Predicate::NameOrContent { text },
            Some(language) if self.is_exact_match_language(language) => Predicate::ExactInLanguage {
                text,
                language: language.to_string(),
            },
            Some(language) => Predicate::NameOrContentInLanguage {
                text,
                language: language.to_string(),
            },
        }
    }
}

/// Restricts candidates to a subtree of the content tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    root: Option<ItemId>,
}

impl ScopeFilter {
    /// Unrestricted scope
    pub fn everywhere() -> Self {
        Self { root: None }
    }

    pub fn within(root: ItemId) -> Self {
        Self { root: Some(root) }
    }

    /// Subtree restriction applies only to an explicit root outside content-editor mode
    pub fn for_args(args: &SearchArgs) -> Self {
        match args.root {
            Some(ref root) if args.mode != SearchMode::ContentEditor => Self::within(root.id),
            _ => Self::everywhere(),
        }
    }

    pub fn root(&self) -> Option<&ItemId> {
        self.root.as_ref()
    }

    pub fn admits(&self, candidate: &CandidateMatch) -> bool {
        match self.root {
            Some(ref root) => candidate.is_within(root),
            None => true,
        }
    }

    /// Wrap a stream so that out-of-scope candidates are skipped lazily.
    /// Faults pass through untouched.
    pub fn apply<'a>(&self, stream: CandidateStream<'a>) -> CandidateStream<'a> {
        let Some(root) = self.root else {
            return stream;
        };

        Box::new(stream.filter(move |candidate| match candidate {
            Ok(candidate) => candidate.is_within(&root),
            Err(_) => true,
        }))
    }
}
