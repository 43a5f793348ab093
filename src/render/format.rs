//! Display rows and the presentation-only username truncation rule.

#![allow(clippy::cast_precision_loss)]

use serde::Serialize;

use crate::core::config::DisplayConfig;
use crate::stats::aggregate::UserSummary;

/// One rendered table row, fields in fixed column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    /// Possibly truncated for display.
    pub username: String,
    /// Copied from the summary.
    pub comment_count: u64,
    /// Copied from the summary.
    pub total_score: i64,
    /// Copied from the summary.
    pub negative_comment_count: u64,
}

/// Viewport size in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in cells.
    pub cols: u16,
    /// Height in cells.
    pub rows: u16,
}

impl Viewport {
    /// Viewport of `cols` x `rows` cells.
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Physical width/height ratio given the width/height of one cell.
    pub fn aspect_ratio(self, cell_aspect: f64) -> f64 {
        if self.rows == 0 {
            return f64::INFINITY;
        }
        f64::from(self.cols) * cell_aspect / f64::from(self.rows)
    }
}

/// Formats summaries into display rows for a given viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFormatter {
    narrow_aspect_ratio: f64,
    narrow_username_chars: usize,
    wide_username_chars: usize,
    ellipsis: String,
    cell_aspect: f64,
}

impl Default for RowFormatter {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

impl RowFormatter {
    /// Formatter using the `[display]` truncation settings.
    pub fn from_config(cfg: &DisplayConfig) -> Self {
        Self {
            narrow_aspect_ratio: cfg.narrow_aspect_ratio,
            narrow_username_chars: cfg.narrow_username_chars,
            wide_username_chars: cfg.wide_username_chars,
            ellipsis: cfg.ellipsis.clone(),
            cell_aspect: cfg.cell_aspect,
        }
    }

    /// Username character budget: narrow on portrait-ish viewports.
    pub fn username_limit(&self, viewport: Viewport) -> usize {
        if viewport.aspect_ratio(self.cell_aspect) < self.narrow_aspect_ratio {
            self.narrow_username_chars
        } else {
            self.wide_username_chars
        }
    }

    /// Longest rendered username for `limit`, ellipsis included.
    pub fn username_width(&self, limit: usize) -> usize {
        limit + self.ellipsis.chars().count()
    }

    /// First `limit` characters plus the ellipsis, or the name unchanged when it fits.
    pub fn truncate(&self, username: &str, limit: usize) -> String {
        match username.char_indices().nth(limit) {
            Some((cut, _)) => format!("{}{}", &username[..cut], self.ellipsis),
            None => username.to_string(),
        }
    }

    /// Display row for `summary` with the username cut to `limit` characters.
    pub fn format(&self, summary: &UserSummary, limit: usize) -> DisplayRow {
        DisplayRow {
            username: self.truncate(&summary.username, limit),
            comment_count: summary.comment_count,
            total_score: summary.total_score,
            negative_comment_count: summary.negative_comment_count,
        }
    }
}
