//! Statistics: per-user aggregation and the helpful-users leaderboard.

pub mod aggregate;
pub mod leaderboard;

pub use aggregate::{AggregateWarning, Aggregation, Dataset, UserSummary, aggregate};
