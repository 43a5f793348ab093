//! Data sources: providers, the session cache, the fetch pool, sample data.

pub mod cache;
pub mod fetcher;
pub mod provider;
pub mod sample;

pub use cache::SessionCache;
pub use fetcher::{FetchCompletion, FetchPool};
pub use provider::{DataProvider, DirectoryProvider, MemoryProvider, SubredditList, SubredditPayload};
