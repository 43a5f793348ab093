//! Sort engine: per-column three-way toggle and stable sorts.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use crate::stats::aggregate::UserSummary;

/// Table columns, in fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    /// Compared case-insensitively.
    Username,
    /// Number of comments.
    CommentCount,
    /// Sum of comment scores.
    TotalScore,
    /// Number of negatively scored comments.
    NegativeCommentCount,
}

impl SortColumn {
    /// Every column, in display order.
    pub const ALL: [Self; 4] = [
        Self::Username,
        Self::CommentCount,
        Self::TotalScore,
        Self::NegativeCommentCount,
    ];

    /// Column for a zero-based header index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Username),
            1 => Some(Self::CommentCount),
            2 => Some(Self::TotalScore),
            3 => Some(Self::NegativeCommentCount),
            _ => None,
        }
    }

    /// Zero-based header index; inverse of [`Self::from_index`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Username => 0,
            Self::CommentCount => 1,
            Self::TotalScore => 2,
            Self::NegativeCommentCount => 3,
        }
    }

    /// Machine name, as accepted on the command line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::CommentCount => "comments",
            Self::TotalScore => "score",
            Self::NegativeCommentCount => "negative",
        }
    }

    /// Header text.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::CommentCount => "Comments",
            Self::TotalScore => "Total score",
            Self::NegativeCommentCount => "Negative",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "username" | "user" | "name" => Ok(Self::Username),
            "comments" | "comment_count" | "count" => Ok(Self::CommentCount),
            "score" | "total_score" | "total" => Ok(Self::TotalScore),
            "negative" | "negative_comment_count" | "neg" => Ok(Self::NegativeCommentCount),
            other => Err(format!(
                "unknown column {other:?} (expected username, comments, score, negative)"
            )),
        }
    }
}

/// Direction of an active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Which column, if any, the view is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortState {
    /// Rows in search-result (or base) order.
    #[default]
    None,
    /// Ascending by the column.
    Asc(SortColumn),
    /// Descending by the column.
    Desc(SortColumn),
}

impl SortState {
    /// Next state after activating `column`: NONE → ASC → DESC → NONE on the
    /// same column, ASC on a different one.
    #[must_use]
    pub fn toggle(self, column: SortColumn) -> Self {
        match self {
            Self::Asc(current) if current == column => Self::Desc(column),
            Self::Desc(current) if current == column => Self::None,
            Self::None | Self::Asc(_) | Self::Desc(_) => Self::Asc(column),
        }
    }

    /// Sorted column, if any.
    #[must_use]
    pub const fn column(self) -> Option<SortColumn> {
        match self {
            Self::None => None,
            Self::Asc(column) | Self::Desc(column) => Some(column),
        }
    }

    /// Sort direction, if any.
    #[must_use]
    pub const fn direction(self) -> Option<SortDirection> {
        match self {
            Self::None => None,
            Self::Asc(_) => Some(SortDirection::Ascending),
            Self::Desc(_) => Some(SortDirection::Descending),
        }
    }

    /// Header arrow for `column` under this state.
    #[must_use]
    pub fn arrow_for(self, column: SortColumn) -> Option<&'static str> {
        match self {
            Self::Asc(current) if current == column => Some("▲"),
            Self::Desc(current) if current == column => Some("▼"),
            _ => None,
        }
    }

    /// Short description such as `"score desc"` or `"unsorted"`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::None => "unsorted".to_string(),
            Self::Asc(column) => format!("{column} asc"),
            Self::Desc(column) => format!("{column} desc"),
        }
    }
}

/// Rows of `current_base` arranged for `state`. `SortState::None` yields
/// `current_base` in its own order.
pub fn apply(state: SortState, current_base: &[UserSummary]) -> Vec<UserSummary> {
    let mut rows = current_base.to_vec();
    match state {
        SortState::None => {}
        SortState::Asc(column) => sort_rows(&mut rows, column, SortDirection::Ascending),
        SortState::Desc(column) => sort_rows(&mut rows, column, SortDirection::Descending),
    }
    rows
}

/// Stable in-place sort. Usernames compare by their Unicode lowercase form,
/// numeric columns as signed integers. Equal keys keep their relative order in
/// both directions.
pub fn sort_rows(rows: &mut [UserSummary], column: SortColumn, direction: SortDirection) {
    match (column, direction) {
        (SortColumn::Username, SortDirection::Ascending) => {
            rows.sort_by_cached_key(|row| row.username.to_lowercase());
        }
        (SortColumn::Username, SortDirection::Descending) => {
            rows.sort_by_cached_key(|row| Reverse(row.username.to_lowercase()));
        }
        (_, SortDirection::Ascending) => rows.sort_by_key(|row| numeric_key(row, column)),
        (_, SortDirection::Descending) => {
            rows.sort_by_key(|row| Reverse(numeric_key(row, column)));
        }
    }
}

fn numeric_key(row: &UserSummary, column: SortColumn) -> i128 {
    match column {
        SortColumn::Username => 0,
        SortColumn::CommentCount => i128::from(row.comment_count),
        SortColumn::TotalScore => i128::from(row.total_score),
        SortColumn::NegativeCommentCount => i128::from(row.negative_comment_count),
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

    fn names(rows: &[UserSummary]) -> Vec<&str> {
        rows.iter().map(|r| r.username.as_str()).collect()
    }

    #[test]
    fn toggle_cycles_three_ways_on_one_column() {
        let c = SortColumn::TotalScore;
        let s1 = SortState::None.toggle(c);
        assert_eq!(s1, SortState::Asc(c));
        let s2 = s1.toggle(c);
        assert_eq!(s2, SortState::Desc(c));
        assert_eq!(s2.toggle(c), SortState::None);
    }

    #[test]
    fn switching_column_starts_ascending() {
        let from_desc = SortState::Desc(SortColumn::Username).toggle(SortColumn::CommentCount);
        assert_eq!(from_desc, SortState::Asc(SortColumn::CommentCount));
        let from_asc = SortState::Asc(SortColumn::Username).toggle(SortColumn::TotalScore);
        assert_eq!(from_asc, SortState::Asc(SortColumn::TotalScore));
    }

    #[test]
    fn column_index_round_trips() {
        for column in SortColumn::ALL {
            assert_eq!(SortColumn::from_index(column.index()), Some(column));
        }
        assert_eq!(SortColumn::from_index(4), None);
    }

    #[test]
    fn parses_column_names() {
        assert_eq!("Score".parse::<SortColumn>(), Ok(SortColumn::TotalScore));
        assert_eq!("neg".parse::<SortColumn>(), Ok(SortColumn::NegativeCommentCount));
        assert!("karma".parse::<SortColumn>().is_err());
    }

    #[test]
    fn username_sort_ignores_case() {
        let rows = vec![row("bob", 1, 0, 0), row("Alice", 1, 0, 0), row("carol", 1, 0, 0)];
        let sorted = apply(SortState::Asc(SortColumn::Username), &rows);
        assert_eq!(names(&sorted), vec!["Alice", "bob", "carol"]);
        let sorted = apply(SortState::Desc(SortColumn::Username), &rows);
        assert_eq!(names(&sorted), vec!["carol", "bob", "Alice"]);
    }

    #[test]
    fn numeric_sort_handles_negative_scores() {
        let rows = vec![row("a", 1, 5, 0), row("b", 1, -3, 1), row("c", 1, 0, 0)];
        let sorted = apply(SortState::Asc(SortColumn::TotalScore), &rows);
        assert_eq!(names(&sorted), vec!["b", "c", "a"]);
    }

    #[test]
    fn descending_sort_is_stable_for_ties() {
        let rows = vec![
            row("first", 2, 0, 0),
            row("big", 9, 0, 0),
            row("second", 2, 0, 0),
            row("third", 2, 0, 0),
        ];
        let sorted = apply(SortState::Desc(SortColumn::CommentCount), &rows);
        assert_eq!(names(&sorted), vec!["big", "first", "second", "third"]);
    }

    #[test]
    fn none_keeps_input_order() {
        let rows = vec![row("z", 1, 0, 0), row("a", 2, 0, 0)];
        assert_eq!(apply(SortState::None, &rows), rows);
    }

    #[test]
    fn arrows_mark_only_the_active_column() {
        let state = SortState::Desc(SortColumn::CommentCount);
        assert_eq!(state.arrow_for(SortColumn::CommentCount), Some("▼"));
        assert_eq!(state.arrow_for(SortColumn::Username), None);
        assert_eq!(SortState::None.arrow_for(SortColumn::Username), None);
    }
}
