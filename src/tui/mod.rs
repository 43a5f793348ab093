//! Interactive subreddit dashboard.
//!
//! `model`, `update`, `input` and `driver` are backend-neutral and always
//! compiled; terminal drawing and the crossterm event loop sit behind the
//! `tui` feature.

#![allow(missing_docs)]

pub mod driver;
pub mod input;
pub mod model;
pub mod update;

#[cfg(feature = "tui")]
pub mod render;
#[cfg(feature = "tui")]
pub mod runtime;
#[cfg(feature = "tui")]
pub mod terminal_guard;

#[cfg(test)]
mod test_properties;

pub use driver::DashboardDriver;
pub use model::{DashboardCmd, DashboardModel, DashboardMsg, DashboardSettings, Selection};
#[cfg(feature = "tui")]
pub use runtime::{DashboardRuntimeConfig, run_dashboard};
pub use update::update;
