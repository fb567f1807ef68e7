//! Candidate matches, the result set they are merged into, and display entries

mod container;
mod reducer;
mod types;

pub use container::{MergePolicy, Offer, ResultSet};
pub use reducer::Reducer;
pub use types::*;
