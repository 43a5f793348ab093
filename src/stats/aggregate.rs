//! Aggregator: reduce raw per-user comment scores into one summary per user.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::provider::SubredditPayload;

/// Key holding the per-user score array in the raw payload.
const SCORES_KEY: &str = "commentScore";

/// Per-user statistics. Immutable once produced by [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Key of the user in the raw payload.
    pub username: String,
    /// Length of the user's score array.
    pub comment_count: u64,
    /// Saturating sum of every score.
    pub total_score: i64,
    /// Scores strictly below zero.
    pub negative_comment_count: u64,
}

/// Ordered summaries, one per distinct username, in raw key order.
pub type Dataset = Vec<UserSummary>;

/// Soft failures encountered while aggregating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateWarning {
    /// The users payload was not a JSON object.
    NotAMapping {
        /// JSON kind that was found instead, e.g. "an array".
        found: &'static str,
    },
    /// A user entry had no `commentScore` array; kept with zero comments.
    MissingScores {
        /// User whose entry lacked scores.
        username: String,
    },
    /// A score element was not a signed 64-bit integer. It still counts as a
    /// comment, with its value truncated or saturated (0 for non-numbers).
    NonIntegerScore {
        /// User owning the score array.
        username: String,
        /// Position of the offending element.
        index: usize,
    },
}

impl std::fmt::Display for AggregateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAMapping { found } => write!(f, "users payload is {found}, not an object"),
            Self::MissingScores { username } => {
                write!(f, "user {username} has no {SCORES_KEY} array")
            }
            Self::NonIntegerScore { username, index } => {
                write!(f, "user {username}: {SCORES_KEY}[{index}] is not an integer")
            }
        }
    }
}

/// Aggregation output: the dataset plus any soft failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// One summary per user, in payload order.
    pub dataset: Dataset,
    /// Soft failures, in the order they were met.
    pub warnings: Vec<AggregateWarning>,
}

/// Reduce a raw users mapping (`{name: {commentScore: [..]}}`) into a dataset.
///
/// Never fails: a non-object input yields an empty dataset and a
/// [`AggregateWarning::NotAMapping`].
pub fn aggregate(raw_users: &Value) -> Aggregation {
    let Some(users) = raw_users.as_object() else {
        return Aggregation {
            dataset: Vec::new(),
            warnings: vec![AggregateWarning::NotAMapping {
                found: json_kind(raw_users),
            }],
        };
    };

    let mut out = Aggregation {
        dataset: Vec::with_capacity(users.len()),
        warnings: Vec::new(),
    };

    for (username, record) in users {
        let mut summary = UserSummary {
            username: username.clone(),
            comment_count: 0,
            total_score: 0,
            negative_comment_count: 0,
        };

        match record.get(SCORES_KEY).and_then(Value::as_array) {
            Some(scores) => {
                for (index, score) in scores.iter().enumerate() {
                    let score = score.as_i64().unwrap_or_else(|| {
                        out.warnings.push(AggregateWarning::NonIntegerScore {
                            username: username.clone(),
                            index,
                        });
                        lenient_score(score)
                    });
                    summary.comment_count += 1;
                    summary.total_score = summary.total_score.saturating_add(score);
                    if score < 0 {
                        summary.negative_comment_count += 1;
                    }
                }
            }
            None => out.warnings.push(AggregateWarning::MissingScores {
                username: username.clone(),
            }),
        }

        out.dataset.push(summary);
    }

    out
}

/// Aggregate the `users` field of a fetched payload.
pub fn aggregate_payload(payload: &SubredditPayload) -> Aggregation {
    aggregate(&payload.users)
}

/// Best-effort value for a score that is not an exact `i64`: integers past
/// `i64::MAX` saturate, fractions truncate toward zero, non-numbers count as 0.
#[allow(clippy::cast_possible_truncation)]
fn lenient_score(score: &Value) -> i64 {
    if score.as_u64().is_some() {
        return i64::MAX;
    }
    score.as_f64().map_or(0, |f| f.trunc() as i64)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
