//! Single-pass reduction of a candidate stream into a result set

use super::container::{MergePolicy, Offer, ResultSet};
use super::types::CandidateMatch;
use crate::index::IndexError;
use crate::items::VisibilityCheck;
use tracing::debug;

/// Consumes a lazy candidate stream until the result set is full
pub struct Reducer<'a> {
    capacity: usize,
    policy: MergePolicy,
    /// `None` when hidden items are shown
    visibility: Option<VisibilityCheck<'a>>,
}

impl<'a> Reducer<'a> {
    pub fn new(capacity: usize, policy: MergePolicy) -> Self {
        Self {
            capacity,
            policy,
            visibility: None,
        }
    }

    /// Skip candidates whose backing item is hidden
    pub fn with_visibility(mut self, visibility: VisibilityCheck<'a>) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Reduce `candidates` into a result set.
    ///
    /// Capacity is checked before each pull, so the stream is never advanced past
    /// the candidate that filled the set. A faulting candidate aborts the whole
    /// reduction; no partial set is returned.
    pub fn reduce<I>(&self, candidates: I) -> Result<ResultSet, IndexError>
    where
        I: IntoIterator<Item = Result<CandidateMatch, IndexError>>,
    {
        let mut results = ResultSet::new(self.capacity, self.policy.clone());
        let mut candidates = candidates.into_iter();
        let mut pulled = 0usize;
        let mut hidden = 0usize;
        let mut rejected = 0usize;

        while !results.is_full() {
            let Some(candidate) = candidates.next() else {
                break;
            };
            let candidate = candidate?;
            pulled += 1;

            if let Some(ref visibility) = self.visibility {
                if visibility.is_candidate_hidden(&candidate.item_id) {
                    hidden += 1;
                    continue;
                }
            }

            if results.offer(candidate) == Offer::Rejected {
                rejected += 1;
            }
        }

        debug!(
            "Reduced {} candidates into {} results ({} hidden, {} rejected)",
            pulled,
            results.len(),
            hidden,
            rejected
        );

        Ok(results)
    }
}
