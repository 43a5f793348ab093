//! Incremental renderer: materializes the current view into a sink one page
//! at a time, and refuses continuations aimed at a view that has since been
//! replaced.

use crate::render::format::{DisplayRow, RowFormatter, Viewport};
use crate::view::state::{ViewState, ViewToken};

/// Default number of rows materialized per page.
pub const PAGE_SIZE: usize = 50;

/// Receiver of materialized rows.
///
/// Rows appended between two `commit` calls form one batch and should become
/// visible together.
pub trait RenderSink {
    /// Drop every materialized row.
    fn clear(&mut self);
    /// Stage one row at the end of the table.
    fn append_row(&mut self, row: DisplayRow);
    /// Publish the rows appended since the last commit.
    fn commit(&mut self) {}
}

/// Result of a grow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowOutcome {
    /// The request was for a view that is no longer current; nothing appended.
    Stale,
    /// Every row of the view is already materialized.
    Exhausted,
    /// Rows were appended.
    Appended {
        /// Rows added by this call.
        rows: usize,
        /// Whether the view is now fully materialized.
        exhausted: bool,
    },
}

/// Page-at-a-time materializer bound to one view token.
#[derive(Debug, Clone)]
pub struct IncrementalRenderer {
    page_size: usize,
    cursor: usize,
    bound: Option<ViewToken>,
    formatter: RowFormatter,
    username_limit: usize,
}

impl IncrementalRenderer {
    /// Unbound renderer; `page_size` is clamped to at least one row.
    pub fn new(page_size: usize, formatter: RowFormatter, viewport: Viewport) -> Self {
        let username_limit = formatter.username_limit(viewport);
        Self {
            page_size: page_size.max(1),
            cursor: 0,
            bound: None,
            formatter,
            username_limit,
        }
    }

    /// Number of rows of the bound view already materialized.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rows materialized per grow.
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Token of the view last reset onto, if any.
    pub const fn bound_token(&self) -> Option<ViewToken> {
        self.bound
    }

    /// Username character budget for the current viewport.
    pub const fn username_limit(&self) -> usize {
        self.username_limit
    }

    /// Formatter applied to each row.
    pub const fn formatter(&self) -> &RowFormatter {
        &self.formatter
    }

    /// Whether every row of `view` is materialized.
    pub fn is_exhausted(&self, view: &ViewState) -> bool {
        self.bound == Some(view.token()) && self.cursor >= view.len()
    }

    /// Clear the sink and materialize the first page of `view`.
    pub fn reset(&mut self, view: &ViewState, sink: &mut dyn RenderSink) -> usize {
        sink.clear();
        self.cursor = 0;
        self.bound = Some(view.token());
        let appended = self.materialize(view, sink);
        sink.commit();
        appended
    }

    /// Materialize the next page if `token` still names the current view.
    pub fn grow(
        &mut self,
        token: ViewToken,
        view: &ViewState,
        sink: &mut dyn RenderSink,
    ) -> GrowOutcome {
        if token != view.token() || self.bound != Some(token) {
            return GrowOutcome::Stale;
        }
        if self.cursor >= view.len() {
            return GrowOutcome::Exhausted;
        }
        let rows = self.materialize(view, sink);
        sink.commit();
        GrowOutcome::Appended {
            rows,
            exhausted: self.cursor >= view.len(),
        }
    }

    /// Apply a new viewport. Returns whether the username budget changed.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        let limit = self.formatter.username_limit(viewport);
        let changed = limit != self.username_limit;
        self.username_limit = limit;
        changed
    }

    /// Re-materialize the already-rendered prefix with current formatting.
    /// The cursor is unchanged. A renderer bound to another view resets instead.
    pub fn refresh(&mut self, view: &ViewState, sink: &mut dyn RenderSink) {
        if self.bound != Some(view.token()) {
            self.reset(view, sink);
            return;
        }
        sink.clear();
        let limit = self.username_limit;
        for summary in view.rows().iter().take(self.cursor) {
            sink.append_row(self.formatter.format(summary, limit));
        }
        sink.commit();
    }

    /// Forget the bound view (no subreddit shown).
    pub fn detach(&mut self, sink: &mut dyn RenderSink) {
        sink.clear();
        sink.commit();
        self.cursor = 0;
        self.bound = None;
    }

    fn materialize(&mut self, view: &ViewState, sink: &mut dyn RenderSink) -> usize {
        let end = (self.cursor + self.page_size).min(view.len());
        let limit = self.username_limit;
        for summary in &view.rows()[self.cursor..end] {
            sink.append_row(self.formatter.format(summary, limit));
        }
        let appended = end - self.cursor;
        self.cursor = end;
        appended
    }
}
