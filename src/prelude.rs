//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use subreddit_stats::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, StatsError};

// Logging
pub use crate::logger::diagnostics::{DiagnosticEvent, Diagnostics};

// Statistics
pub use crate::stats::aggregate::{Aggregation, Dataset, UserSummary, aggregate};
pub use crate::stats::leaderboard::{HelpfulUser, top_helpful};

// Views
pub use crate::view::search::search;
pub use crate::view::sort::{SortColumn, SortState};
pub use crate::view::state::{ViewId, ViewState, ViewToken};

// Rendering
pub use crate::render::buffer::TableBuffer;
pub use crate::render::format::{DisplayRow, RowFormatter, Viewport};
pub use crate::render::incremental::{GrowOutcome, IncrementalRenderer, PAGE_SIZE, RenderSink};

// Data sources
pub use crate::source::cache::SessionCache;
pub use crate::source::fetcher::{FetchCompletion, FetchPool};
pub use crate::source::provider::{
    DataProvider, DirectoryProvider, MemoryProvider, SubredditList, SubredditPayload,
};

// Dashboard
pub use crate::tui::{DashboardCmd, DashboardDriver, DashboardModel, DashboardMsg, update};
