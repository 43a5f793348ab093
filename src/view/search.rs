//! Search engine: case-insensitive username prefix match that also accepts
//! names with a single leading `-` or `_` before the prefix.

use regex::{Regex, RegexBuilder};

use crate::stats::aggregate::UserSummary;

/// Compiled-size cap for the search pattern; larger queries use the literal matcher.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Result of applying a query to a base dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchOutcome {
    /// False for an empty query.
    pub active: bool,
    /// The trimmed query.
    pub query: String,
    /// Matching rows in base order; the whole base when inactive.
    pub result: Vec<UserSummary>,
}

/// Username predicate for one query.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    pattern: Option<Regex>,
    literal: String,
}

impl PrefixMatcher {
    /// Build a matcher. User text is escaped before it reaches the pattern.
    pub fn new(query: &str) -> Self {
        let pattern = RegexBuilder::new(&format!("^[-_]?{}", regex::escape(query)))
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .ok();
        Self {
            pattern,
            literal: query.to_lowercase(),
        }
    }

    /// Whether the compiled pattern is in use (false means literal fallback).
    pub const fn uses_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// Whether `username` starts with the query, ignoring case and at most
    /// one leading `-` or `_`.
    pub fn is_match(&self, username: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.is_match(username),
            None => literal_prefix_match(&self.literal, username),
        }
    }
}

fn literal_prefix_match(lowered_query: &str, username: &str) -> bool {
    let lowered = username.to_lowercase();
    if lowered.starts_with(lowered_query) {
        return true;
    }
    lowered
        .strip_prefix(['-', '_'])
        .is_some_and(|rest| rest.starts_with(lowered_query))
}

/// Filter `base` by `query`. An empty (or all-whitespace) query is inactive
/// and returns `base` unchanged.
pub fn search(query: &str, base: &[UserSummary]) -> SearchOutcome {
    let query = query.trim();
    if query.is_empty() {
        return SearchOutcome {
            active: false,
            query: String::new(),
            result: base.to_vec(),
        };
    }
    let matcher = PrefixMatcher::new(query);
    SearchOutcome {
        active: true,
        query: query.to_string(),
        result: base
            .iter()
            .filter(|row| matcher.is_match(&row.username))
            .cloned()
            .collect(),
    }
}
