//! Current view of one subreddit: sort engine, search engine, view state.

pub mod search;
pub mod sort;
pub mod state;

#[cfg(test)]
mod test_properties;

pub use search::{PrefixMatcher, SearchOutcome, search};
pub use sort::{SortColumn, SortDirection, SortState};
pub use state::{SearchState, ViewId, ViewState, ViewToken};
