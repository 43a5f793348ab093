//! Plain-terminal table printer used by `substats table`.
//!
//! [`StreamingTable`] is a [`RenderSink`]: rows staged by the incremental
//! renderer are written to the underlying writer on each commit, so a table
//! streams page by page.

#![allow(missing_docs)]

use std::io::{self, Write};

use colored::Colorize;

use crate::render::format::DisplayRow;
use crate::render::incremental::RenderSink;
use crate::view::sort::{SortColumn, SortState};

const NUMBER_WIDTH: usize = 12;

pub struct StreamingTable<W: Write> {
    out: W,
    username_width: usize,
    sort: SortState,
    staged: Vec<DisplayRow>,
    header_written: bool,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write> StreamingTable<W> {
    pub fn new(out: W, username_width: usize, sort: SortState) -> Self {
        Self {
            out,
            username_width: username_width.max(SortColumn::Username.header().len() + 2),
            sort,
            staged: Vec::new(),
            header_written: false,
            written: 0,
            error: None,
        }
    }

    /// Rows written so far.
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Flush and report the first write error, if any.
    pub fn finish(mut self) -> io::Result<(usize, W)> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok((self.written, self.out))
    }

    fn header(&self) -> String {
        let title = |column: SortColumn| {
            self.sort.arrow_for(column).map_or_else(
                || column.header().to_string(),
                |arrow| format!("{} {arrow}", column.header()),
            )
        };
        let width = self.username_width;
        format!(
            "{:<width$} {:>NUMBER_WIDTH$} {:>NUMBER_WIDTH$} {:>NUMBER_WIDTH$}",
            title(SortColumn::Username),
            title(SortColumn::CommentCount),
            title(SortColumn::TotalScore),
            title(SortColumn::NegativeCommentCount),
        )
    }

    fn write_batch(&mut self) -> io::Result<()> {
        if !self.header_written {
            let header = self.header();
            writeln!(self.out, "{}", header.bold())?;
            self.header_written = true;
        }
        let width = self.username_width;
        for row in self.staged.drain(..) {
            let score = format!("{:>NUMBER_WIDTH$}", row.total_score);
            let score = if row.total_score < 0 {
                score.red().to_string()
            } else {
                score
            };
            writeln!(
                self.out,
                "{:<width$} {:>NUMBER_WIDTH$} {score} {:>NUMBER_WIDTH$}",
                row.username, row.comment_count, row.negative_comment_count,
            )?;
            self.written += 1;
        }
        Ok(())
    }
}

impl<W: Write> RenderSink for StreamingTable<W> {
    fn clear(&mut self) {
        self.staged.clear();
    }

    fn append_row(&mut self, row: DisplayRow) {
        self.staged.push(row);
    }

    fn commit(&mut self) {
        if self.error.is_some() {
            self.staged.clear();
            return;
        }
        if let Err(err) = self.write_batch() {
            self.error = Some(err);
        }
    }
}
