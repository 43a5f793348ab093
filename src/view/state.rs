//! View state for one subreddit selection: the immutable base dataset, the
//! current mutable view, and the sort and search state that produced it.
//!
//! The mutable view is only ever replaced wholesale. Every replacement bumps
//! the revision, so a [`ViewToken`] names exactly one view and a continuation
//! holding an old token can be recognized as stale.

use std::fmt;

use crate::stats::aggregate::{Dataset, UserSummary};
use crate::view::search::{self, SearchOutcome};
use crate::view::sort::{self, SortColumn, SortState};

/// Identity of one `ViewState` instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    /// Wrap a caller-chosen identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identifies one exact mutable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewToken {
    /// View state the token belongs to.
    pub id: ViewId,
    /// Replacement count of that state's mutable view.
    pub revision: u64,
}

impl fmt::Display for ViewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.revision)
    }
}

/// Search state. `result` is kept so that a sort reset can restore the
/// searched-but-unsorted rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Whether a non-empty query is applied.
    pub active: bool,
    /// Trimmed query text.
    pub query: String,
    /// Rows matching `query`, unsorted; empty when inactive.
    pub result: Vec<UserSummary>,
}

impl From<SearchOutcome> for SearchState {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            active: outcome.active,
            query: outcome.query,
            result: if outcome.active {
                outcome.result
            } else {
                Vec::new()
            },
        }
    }
}

/// The dataset of one subreddit selection and the view derived from it.
#[derive(Debug, Clone)]
pub struct ViewState {
    id: ViewId,
    base: Dataset,
    view: Vec<UserSummary>,
    sort: SortState,
    search: SearchState,
    revision: u64,
}

impl ViewState {
    /// Fresh state: view = base, unsorted, no search.
    pub fn new(id: ViewId, base: Dataset) -> Self {
        Self {
            id,
            view: base.clone(),
            base,
            sort: SortState::None,
            search: SearchState::default(),
            revision: 0,
        }
    }

    /// Identity fixed at construction.
    pub const fn id(&self) -> ViewId {
        self.id
    }

    /// Token of the current mutable view; changes on every replacement.
    pub const fn token(&self) -> ViewToken {
        ViewToken {
            id: self.id,
            revision: self.revision,
        }
    }

    /// Rows of the current mutable view.
    pub fn rows(&self) -> &[UserSummary] {
        &self.view
    }

    /// Rows in the current view.
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Whether the current view has no rows.
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// The aggregated dataset, never reordered.
    pub fn base(&self) -> &[UserSummary] {
        &self.base
    }

    /// Active sort.
    pub const fn sort(&self) -> SortState {
        self.sort
    }

    /// Active search.
    pub const fn search(&self) -> &SearchState {
        &self.search
    }

    /// Rows the sort engine works from: the search result when a search is
    /// active, else the base dataset.
    pub fn current_base(&self) -> &[UserSummary] {
        if self.search.active {
            &self.search.result
        } else {
            &self.base
        }
    }

    /// Toggle sorting on `column` and replace the view. Returns the new sort state.
    pub fn activate_sort(&mut self, column: SortColumn) -> SortState {
        self.sort = self.sort.toggle(column);
        let rows = sort::apply(self.sort, self.current_base());
        self.replace_view(rows);
        self.sort
    }

    /// Recompute the search from the base dataset, reset sorting, and replace
    /// the view. An empty query clears the search.
    pub fn apply_search(&mut self, query: &str) {
        self.search = SearchState::from(search::search(query, &self.base));
        self.sort = SortState::None;
        let rows = self.current_base().to_vec();
        self.replace_view(rows);
    }

    /// Equivalent to applying an empty query.
    pub fn clear_search(&mut self) {
        self.apply_search("");
    }

    fn replace_view(&mut self, rows: Vec<UserSummary>) {
        self.view = rows;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, count: u64, total: i64, negatives: u64) -> UserSummary {
        UserSummary {
            username: name.to_string(),
            comment_count: count,
            total_score: total,
            negative_comment_count: negatives,
        }
    }

    fn sample() -> ViewState {
        ViewState::new(
            ViewId::new(1),
            vec![
                row("john", 5, 10, 0),
                row("bob", 9, -4, 3),
                row("_joan", 2, 7, 0),
                row("alice", 5, 3, 1),
            ],
        )
    }

    fn names(state: &ViewState) -> Vec<&str> {
        state.rows().iter().map(|r| r.username.as_str()).collect()
    }

    #[test]
    fn starts_as_base_unsorted() {
        let state = sample();
        assert_eq!(state.rows(), state.base());
        assert_eq!(state.sort(), SortState::None);
        assert!(!state.search().active);
        assert_eq!(state.token().revision, 0);
    }

    #[test]
    fn full_toggle_cycle_restores_base_order() {
        let mut state = sample();
        let before = names(&state).join(",");
        state.activate_sort(SortColumn::CommentCount);
        assert_eq!(names(&state), vec!["_joan", "john", "alice", "bob"]);
        state.activate_sort(SortColumn::CommentCount);
        assert_eq!(names(&state), vec!["bob", "john", "alice", "_joan"]);
        assert_eq!(state.activate_sort(SortColumn::CommentCount), SortState::None);
        assert_eq!(names(&state).join(","), before);
    }

    #[test]
    fn every_replacement_bumps_revision() {
        let mut state = sample();
        let t0 = state.token();
        state.activate_sort(SortColumn::Username);
        let t1 = state.token();
        state.apply_search("jo");
        let t2 = state.token();
        assert_ne!(t0, t1);
        assert_ne!(t1, t2);
        assert_eq!(t2.id, t0.id);
        assert_eq!(t2.revision, 2);
    }

    #[test]
    fn sort_operates_on_search_result() {
        let mut state = sample();
        state.apply_search("jo");
        assert_eq!(names(&state), vec!["john", "_joan"]);
        state.activate_sort(SortColumn::TotalScore);
        assert_eq!(names(&state), vec!["_joan", "john"]);
        state.activate_sort(SortColumn::TotalScore);
        state.activate_sort(SortColumn::TotalScore);
        assert_eq!(state.sort(), SortState::None);
        assert_eq!(names(&state), vec!["john", "_joan"]);
    }

    #[test]
    fn search_resets_sort_and_recomputes_from_base() {
        let mut state = sample();
        state.activate_sort(SortColumn::Username);
        state.apply_search("a");
        assert_eq!(state.sort(), SortState::None);
        assert_eq!(names(&state), vec!["alice"]);
        state.apply_search("b");
        assert_eq!(names(&state), vec!["bob"]);
    }

    #[test]
    fn clearing_search_returns_full_base() {
        let mut state = sample();
        state.apply_search("jo");
        state.clear_search();
        assert!(!state.search().active);
        assert!(state.search().result.is_empty());
        assert_eq!(state.rows(), state.base());
    }

    #[test]
    fn search_with_no_hits_yields_empty_view() {
        let mut state = sample();
        state.apply_search("zzz");
        assert!(state.search().active);
        assert!(state.is_empty());
    }

    #[test]
    fn token_display_is_compact() {
        let state = sample();
        assert_eq!(state.token().to_string(), "v1.0");
    }
}
