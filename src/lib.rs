#![forbid(unsafe_code)]

//! Subreddit comment statistics.
//!
//! Raw per-subreddit payloads (`{"users": {<name>: {"commentScore": [...]}}}`)
//! are aggregated into one summary row per user, arranged by a three-state
//! column sort and a username prefix search, and materialized page by page
//! into a render sink. The same pipeline backs the `substats` CLI and the
//! interactive terminal dashboard.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use subreddit_stats::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use subreddit_stats::stats::aggregate::aggregate;
//! use subreddit_stats::view::state::{ViewId, ViewState};
//! ```

pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod logger;
pub mod render;
pub mod source;
pub mod stats;
pub mod tui;
pub mod view;
