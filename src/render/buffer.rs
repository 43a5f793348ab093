//! In-memory render sink backing the dashboard table.

use crate::render::format::DisplayRow;
use crate::render::incremental::RenderSink;

/// Rows are staged until `commit`, then become visible as one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBuffer {
    rows: Vec<DisplayRow>,
    staged: Vec<DisplayRow>,
    commits: usize,
}

impl TableBuffer {
    /// Committed rows.
    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    /// Committed row count.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row is committed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of commits since creation.
    pub const fn commits(&self) -> usize {
        self.commits
    }

    /// Rows appended but not yet committed.
    pub fn staged(&self) -> usize {
        self.staged.len()
    }
}

impl RenderSink for TableBuffer {
    fn clear(&mut self) {
        self.rows.clear();
        self.staged.clear();
    }

    fn append_row(&mut self, row: DisplayRow) {
        self.staged.push(row);
    }

    fn commit(&mut self) {
        self.rows.append(&mut self.staged);
        self.commits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> DisplayRow {
        DisplayRow {
            username: name.to_string(),
            comment_count: 1,
            total_score: 2,
            negative_comment_count: 0,
        }
    }

    #[test]
    fn rows_are_hidden_until_commit() {
        let mut buffer = TableBuffer::default();
        buffer.append_row(row("a"));
        buffer.append_row(row("b"));
        assert!(buffer.is_empty());
        assert_eq!(buffer.staged(), 2);
        buffer.commit();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.staged(), 0);
        assert_eq!(buffer.commits(), 1);
    }

    #[test]
    fn clear_drops_committed_and_staged_rows() {
        let mut buffer = TableBuffer::default();
        buffer.append_row(row("a"));
        buffer.commit();
        buffer.append_row(row("b"));
        buffer.clear();
        buffer.commit();
        assert!(buffer.is_empty());
    }
}
