//! Search index abstraction
//!
//! An index is located for a part of the content tree, opened as a scoped
//! search context, and queried for a lazy stream of candidate matches.

mod memory;
mod predicate;
mod traits;

pub use memory::{MemoryIndex, MemoryIndexProvider};
pub use predicate::{Predicate, PredicateBuilder, ScopeFilter, DEFAULT_EXACT_MATCH_LANGUAGES};
pub use traits::*;
