//! Frame rendering for the dashboard.
//!
//! [`build_frame`] turns the model into styled lines without touching the
//! terminal; [`draw_frame`] paints those lines with crossterm.

#![allow(missing_docs)]

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use super::input::{InputMode, key_hints};
use super::model::{DashboardModel, ListStatus, NotificationLevel, Selection};
use crate::render::format::DisplayRow;
use crate::view::sort::{SortColumn, SortState};

const NUMBER_WIDTH: usize = 12;

/// Visual role of a frame line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Normal,
    Dim,
    Header,
    Info,
    Warning,
    Error,
}

impl LineStyle {
    const fn color(self) -> Color {
        match self {
            Self::Title => Color::Cyan,
            Self::Normal | Self::Header => Color::White,
            Self::Dim => Color::DarkGrey,
            Self::Info => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }

    const fn bold(self) -> bool {
        matches!(self, Self::Title | Self::Header)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
    pub text: String,
    pub style: LineStyle,
}

impl FrameLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

// ──────────────────── frame layout ────────────────────

/// Lay out one full frame: tabs, status, search, headers, body, footer and
/// notification line. Always returns exactly `rows` lines (at least one).
pub fn build_frame(model: &DashboardModel) -> Vec<FrameLine> {
    let (cols, rows) = model.terminal_size;
    let width = usize::from(cols);
    let mut lines = Vec::with_capacity(usize::from(rows));

    lines.push(FrameLine::new(tab_line(model), LineStyle::Title));
    lines.push(status_line(model));
    lines.push(search_line(model));

    let username_width = username_column_width(model);
    lines.push(FrameLine::new(header_line(model, username_width), LineStyle::Header));

    let body_rows = model.body_rows();
    let visible = model.table.rows().iter().skip(model.scroll).take(body_rows);
    let mut drawn = 0;
    for row in visible {
        lines.push(FrameLine::new(
            table_line(row, username_width),
            LineStyle::Normal,
        ));
        drawn += 1;
    }
    if drawn == 0 && let Some(loaded) = model.loaded() {
        let text = if loaded.view.search().active {
            "  no users match the search"
        } else {
            "  no users in this subreddit"
        };
        lines.push(FrameLine::new(text, LineStyle::Dim));
        drawn += 1;
    }
    for _ in drawn..body_rows {
        lines.push(FrameLine::new("", LineStyle::Normal));
    }

    lines.push(FrameLine::new(footer_line(model), LineStyle::Dim));
    lines.push(notification_line(model));

    let target = usize::from(rows).max(1);
    lines.truncate(target);
    for line in &mut lines {
        clip(&mut line.text, width);
    }
    lines
}

fn tab_line(model: &DashboardModel) -> String {
    let mut text = String::from(" substats ");
    if model.subs.is_empty() {
        text.push_str(" (no subreddits)");
        return text;
    }
    let selected = model.selection.index();
    for (i, name) in model.subs.iter().enumerate() {
        let key = if i < 9 {
            format!("{}", i + 1)
        } else {
            "·".to_string()
        };
        if selected == Some(i) {
            text.push_str(&format!(" [{key} r/{name}]"));
        } else {
            text.push_str(&format!("  {key} r/{name} "));
        }
    }
    text
}

fn status_line(model: &DashboardModel) -> FrameLine {
    if let ListStatus::Failed(message) = &model.list_status {
        return FrameLine::new(format!(" list unavailable: {message}"), LineStyle::Error);
    }
    match &model.selection {
        Selection::NoSubredditSelected if model.list_status == ListStatus::Loading => {
            FrameLine::new(" loading subreddit list...", LineStyle::Dim)
        }
        Selection::NoSubredditSelected => FrameLine::new(
            " select a subreddit with ←/→ or 1-9",
            LineStyle::Dim,
        ),
        Selection::Loading { name, .. } => {
            FrameLine::new(format!(" r/{name}: loading..."), LineStyle::Dim)
        }
        Selection::Loaded(loaded) => {
            let updated = loaded.updated.as_deref().unwrap_or("unknown");
            FrameLine::new(
                format!(
                    " r/{}  {} users  updated {updated}  sort: {}",
                    loaded.name,
                    loaded.view.base().len(),
                    loaded.view.sort().label(),
                ),
                LineStyle::Normal,
            )
        }
    }
}

fn search_line(model: &DashboardModel) -> FrameLine {
    match model.input_mode {
        InputMode::Search => FrameLine::new(
            format!(" search: {}_", model.search_input),
            LineStyle::Warning,
        ),
        InputMode::Normal if model.search_input.is_empty() => {
            FrameLine::new(" / to search usernames", LineStyle::Dim)
        }
        InputMode::Normal => FrameLine::new(
            format!(" search: {}  (Esc clears)", model.search_input),
            LineStyle::Normal,
        ),
    }
}

fn username_column_width(model: &DashboardModel) -> usize {
    let limit = model.renderer.username_limit();
    model
        .renderer
        .formatter()
        .username_width(limit)
        .max(SortColumn::Username.header().len() + 2)
}

fn header_line(model: &DashboardModel, username_width: usize) -> String {
    let sort = model.loaded().map_or(SortState::None, |l| l.view.sort());
    let title = |column: SortColumn| {
        sort.arrow_for(column).map_or_else(
            || column.header().to_string(),
            |arrow| format!("{} {arrow}", column.header()),
        )
    };
    format!(
        " {:<username_width$} {:>NUMBER_WIDTH$} {:>NUMBER_WIDTH$} {:>NUMBER_WIDTH$}",
        title(SortColumn::Username),
        title(SortColumn::CommentCount),
        title(SortColumn::TotalScore),
        title(SortColumn::NegativeCommentCount),
    )
}

fn table_line(row: &DisplayRow, username_width: usize) -> String {
    format!(
        " {:<username_width$} {:>NUMBER_WIDTH$} {:>NUMBER_WIDTH$} {:>NUMBER_WIDTH$}",
        row.username, row.comment_count, row.total_score, row.negative_comment_count,
    )
}

fn footer_line(model: &DashboardModel) -> String {
    let hints = key_hints(model.input_mode);
    let Some(loaded) = model.loaded() else {
        return format!(" {hints}");
    };
    let total = loaded.view.len();
    let shown = model.table.len();
    let more = if shown < total { " (scroll for more)" } else { "" };
    format!(" {shown}/{total} rows{more}  │ {hints}")
}

fn notification_line(model: &DashboardModel) -> FrameLine {
    model.notifications.last().map_or_else(
        || FrameLine::new("", LineStyle::Normal),
        |n| {
            let style = match n.level {
                NotificationLevel::Info => LineStyle::Info,
                NotificationLevel::Warning => LineStyle::Warning,
                NotificationLevel::Error => LineStyle::Error,
            };
            FrameLine::new(format!(" {}", n.message), style)
        },
    )
}

fn clip(text: &mut String, width: usize) {
    if let Some((cut, _)) = text.char_indices().nth(width) {
        text.truncate(cut);
    }
}

// ──────────────────── terminal output ────────────────────

/// Paint a frame built by [`build_frame`].
pub fn draw_frame(stdout: &mut impl Write, model: &DashboardModel) -> io::Result<()> {
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in (0u16..).zip(build_frame(model)) {
        queue!(stdout, MoveTo(0, row), SetForegroundColor(line.style.color()))?;
        if line.style.bold() {
            queue!(stdout, SetAttribute(Attribute::Bold))?;
        }
        write!(stdout, "{}", line.text)?;
        queue!(stdout, SetAttribute(Attribute::Reset))?;
    }
    stdout.flush()
}
