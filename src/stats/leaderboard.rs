//! "Most helpful users" leaderboard: the top 1% of commenters by volume who
//! never had a negatively scored comment, ranked by average score.

#![allow(clippy::cast_precision_loss)]

use std::cmp::Reverse;
use std::fmt::Write as _;

use serde::Serialize;

use crate::stats::aggregate::UserSummary;

/// One leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelpfulUser {
    /// Full username.
    pub username: String,
    /// Mean score per comment, rounded to two decimals.
    pub average_score: f64,
}

/// Number of users in the top slice: `ceil(len * 1%)`, so at least one when
/// the dataset is non-empty.
#[must_use]
pub fn top_slice_len(len: usize) -> usize {
    len.div_ceil(100)
}

/// Rank the most helpful users of a dataset.
///
/// Users are ordered by comment count (descending, stable), the top slice is
/// kept, users with any negative comment or no comments are dropped, and the
/// rest are sorted by average score descending (stable).
pub fn top_helpful(dataset: &[UserSummary]) -> Vec<HelpfulUser> {
    let mut by_volume: Vec<&UserSummary> = dataset.iter().collect();
    by_volume.sort_by_key(|user| Reverse(user.comment_count));

    let mut ranked: Vec<HelpfulUser> = by_volume
        .into_iter()
        .take(top_slice_len(dataset.len()))
        .filter(|user| user.negative_comment_count == 0 && user.comment_count > 0)
        .map(|user| HelpfulUser {
            username: user.username.clone(),
            average_score: round2(user.total_score as f64 / user.comment_count as f64),
        })
        .collect();

    ranked.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    ranked
}

/// Render a wiki-style numbered list under `title`.
pub fn render_markdown(title: &str, users: &[HelpfulUser]) -> String {
    let mut out = String::from(title);
    for (i, user) in users.iter().enumerate() {
        let _ = write!(
            out,
            "\n\n{}. {} [ average score: {} ]",
            i + 1,
            user.username,
            user.average_score
        );
    }
    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
