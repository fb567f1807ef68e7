//! Primary, mode-specific search strategy

use super::models::SearchArgs;
use crate::index::{CandidateStream, IndexError, SearchContext};

/// A search strategy tried before the fallback predicate.
///
/// Returning `Ok(None)` or an empty stream hands over to the fallback predicate.
/// The subtree scope is applied by the caller.
pub trait SearchStrategy: Send + Sync {
    fn search<'a>(
        &self,
        args: &SearchArgs,
        context: &'a dyn SearchContext,
    ) -> Result<Option<CandidateStream<'a>>, IndexError>;
}
