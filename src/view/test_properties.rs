//! Property-based tests for aggregation, sorting and searching.
//!
//! Arbitrary raw payloads are aggregated into datasets, then driven through
//! random sequences of sort activations and searches while checking that row
//! multisets, toggle cycles and stable ordering hold.

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use super::search::search;
use super::sort::{self, SortColumn, SortState};
use super::state::{ViewId, ViewState};
use crate::stats::aggregate::{UserSummary, aggregate};

// ──────────────────── strategies ────────────────────

fn arb_username() -> impl Strategy<Value = String> {
    "[-_]?[a-zA-Z][a-zA-Z0-9_]{0,8}"
}

fn arb_raw_users() -> impl Strategy<Value = (Value, Vec<(String, Vec<i64>)>)> {
    prop::collection::vec(
        (arb_username(), prop::collection::vec(-50i64..50, 0..12)),
        0..40,
    )
    .prop_map(|entries| {
        let mut map = Map::new();
        let mut kept = Vec::new();
        for (name, scores) in entries {
            if map.contains_key(&name) {
                continue;
            }
            map.insert(name.clone(), json!({ "commentScore": scores.clone() }));
            kept.push((name, scores));
        }
        (Value::Object(map), kept)
    })
}

fn arb_dataset() -> impl Strategy<Value = Vec<UserSummary>> {
    arb_raw_users().prop_map(|(raw, _)| aggregate(&raw).dataset)
}

fn arb_column() -> impl Strategy<Value = SortColumn> {
    (0usize..4).prop_map(|i| SortColumn::from_index(i).unwrap())
}

#[derive(Debug, Clone)]
enum Action {
    Sort(SortColumn),
    Search(String),
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => arb_column().prop_map(Action::Sort),
        1 => "[-_a-c]{0,2}".prop_map(Action::Search),
    ]
}

fn sorted_names(rows: &[UserSummary]) -> Vec<String> {
    let mut names: Vec<String> = rows.iter().map(|r| r.username.clone()).collect();
    names.sort();
    names
}

// ──────────────────── properties ────────────────────

proptest! {
    #[test]
    fn aggregate_yields_one_row_per_distinct_user((raw, kept) in arb_raw_users()) {
        let agg = aggregate(&raw);
        prop_assert!(agg.warnings.is_empty());
        prop_assert_eq!(agg.dataset.len(), kept.len());
        for (summary, (name, scores)) in agg.dataset.iter().zip(&kept) {
            prop_assert_eq!(&summary.username, name);
            prop_assert_eq!(summary.comment_count, scores.len() as u64);
            prop_assert!(summary.negative_comment_count <= summary.comment_count);
            prop_assert_eq!(summary.total_score, scores.iter().sum::<i64>());
        }
    }

    #[test]
    fn three_activations_restore_prior_order(
        base in arb_dataset(),
        column in arb_column(),
        prefix in prop::collection::vec(arb_action(), 0..6),
    ) {
        let mut state = ViewState::new(ViewId::new(1), base);
        for action in prefix {
            match action {
                Action::Sort(c) => { state.activate_sort(c); }
                Action::Search(q) => state.apply_search(&q),
            }
        }
        // Bring the column to NONE first so the cycle starts from the unsorted view.
        while state.sort() != SortState::None {
            state.activate_sort(column);
        }
        let before = state.rows().to_vec();
        state.activate_sort(column);
        state.activate_sort(column);
        state.activate_sort(column);
        prop_assert_eq!(state.sort(), SortState::None);
        prop_assert_eq!(state.rows(), before.as_slice());
    }

    #[test]
    fn sorts_are_stable(base in arb_dataset(), column in arb_column(), descending in any::<bool>()) {
        let state = if descending { SortState::Desc(column) } else { SortState::Asc(column) };
        let sorted = sort::apply(state, &base);
        let position = |name: &str| base.iter().position(|r| r.username == name).unwrap();
        for pair in sorted.windows(2) {
            let equal = match column {
                SortColumn::Username => pair[0].username.to_lowercase() == pair[1].username.to_lowercase(),
                SortColumn::CommentCount => pair[0].comment_count == pair[1].comment_count,
                SortColumn::TotalScore => pair[0].total_score == pair[1].total_score,
                SortColumn::NegativeCommentCount => {
                    pair[0].negative_comment_count == pair[1].negative_comment_count
                }
            };
            if equal {
                prop_assert!(position(&pair[0].username) < position(&pair[1].username));
            }
        }
    }

    #[test]
    fn sorting_preserves_rows(base in arb_dataset(), column in arb_column(), descending in any::<bool>()) {
        let state = if descending { SortState::Desc(column) } else { SortState::Asc(column) };
        let sorted = sort::apply(state, &base);
        prop_assert_eq!(sorted_names(&sorted), sorted_names(&base));
    }

    #[test]
    fn search_then_clear_restores_base(base in arb_dataset(), query in "[-_a-zA-Z.*(]{0,4}") {
        let mut state = ViewState::new(ViewId::new(7), base.clone());
        state.activate_sort(SortColumn::TotalScore);
        state.apply_search(&query);
        state.clear_search();
        prop_assert_eq!(state.rows(), base.as_slice());
    }

    #[test]
    fn search_result_is_an_ordered_subsequence(base in arb_dataset(), query in "[-_a-z]{1,3}") {
        let outcome = search(&query, &base);
        let mut cursor = base.iter();
        for hit in &outcome.result {
            prop_assert!(cursor.any(|row| row == hit));
            let lowered = hit.username.to_lowercase();
            let stripped = lowered.strip_prefix(['-', '_']).unwrap_or(&lowered);
            let q = query.to_lowercase();
            prop_assert!(lowered.starts_with(&q) || stripped.starts_with(&q));
        }
    }

    #[test]
    fn every_view_change_yields_a_new_token(
        base in arb_dataset(),
        actions in prop::collection::vec(arb_action(), 1..10),
    ) {
        let mut state = ViewState::new(ViewId::new(3), base);
        let mut seen = std::collections::HashSet::new();
        seen.insert(state.token());
        for action in actions {
            match action {
                Action::Sort(c) => { state.activate_sort(c); }
                Action::Search(q) => state.apply_search(&q),
            }
            prop_assert!(seen.insert(state.token()));
        }
    }
}
