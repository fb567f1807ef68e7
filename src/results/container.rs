//! Result set holding accepted candidates, deduplicated by item identity

use super::types::CandidateMatch;
use crate::search::SearchMode;

/// Rules deciding which version of an item survives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    /// Active content language preference, if any
    preferred_language: Option<String>,
    mode: SearchMode,
}

/// What happened to an offered candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// First candidate seen for this identity
    Added,
    /// Displaced the previously accepted version
    Replaced,
    /// Accepted alongside an existing entry with the same identity
    Duplicated,
    /// The existing entry was kept
    Rejected,
}

impl MergePolicy {
    pub fn new(preferred_language: Option<&str>, mode: SearchMode) -> Self {
        Self {
            preferred_language: preferred_language
                .filter(|lang| !lang.is_empty())
                .map(str::to_string),
            mode,
        }
    }

    pub fn preferred_language(&self) -> Option<&str> {
        self.preferred_language.as_deref()
    }

    /// Decide the fate of `candidate` when `existing` has the same identity
    fn resolve(&self, existing: &CandidateMatch, candidate: &CandidateMatch) -> Offer {
        let newer = existing.language == candidate.language && existing.version < candidate.version;

        match self.preferred_language {
            Some(ref preferred) => {
                let gains_language =
                    existing.language != *preferred && candidate.language == *preferred;
                if gains_language || newer {
                    Offer::Replaced
                } else {
                    Offer::Rejected
                }
            }
            None if self.mode == SearchMode::Classic => Offer::Duplicated,
            None if newer => Offer::Replaced,
            None => Offer::Rejected,
        }
    }
}

/// Ordered, capacity-bounded collection of accepted candidates.
///
/// Order is acceptance order: a replacement removes the old entry and appends
/// the new one at the end.
#[derive(Debug, Clone)]
pub struct ResultSet {
    entries: Vec<CandidateMatch>,
    capacity: usize,
    policy: MergePolicy,
}

impl ResultSet {
    /// Create an empty set accepting at most `capacity` entries
    pub fn new(capacity: usize, policy: MergePolicy) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.min(64)),
            capacity,
            policy,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// No further candidates can be accepted
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Offer a candidate, merging with an already accepted version of the same item
    pub fn offer(&mut self, candidate: CandidateMatch) -> Offer {
        if self.is_full() {
            return Offer::Rejected;
        }

        let existing = self
            .entries
            .iter()
            .position(|entry| entry.item_id == candidate.item_id);

        let Some(position) = existing else {
            self.entries.push(candidate);
            return Offer::Added;
        };

        let offer = self.policy.resolve(&self.entries[position], &candidate);
        match offer {
            Offer::Replaced => {
                self.entries.remove(position);
                self.entries.push(candidate);
            }
            Offer::Duplicated => self.entries.push(candidate),
            Offer::Added | Offer::Rejected => {}
        }
        offer
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateMatch> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<CandidateMatch> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CandidateMatch;
    type IntoIter = std::slice::Iter<'a, CandidateMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
