//! Content items and the repository they are resolved from
//!
//! The search step never owns items: it resolves them on demand to decide
//! visibility and to pick display icons.

mod memory;
mod types;
mod visibility;

pub use memory::MemoryRepository;
pub use types::*;
pub use visibility::{VisibilityCheck, DEFAULT_MAX_ANCESTOR_DEPTH};
