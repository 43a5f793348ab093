//! Elm-style state model for the subreddit dashboard.
//!
//! All display state lives in [`DashboardModel`]. Input and data events arrive
//! as [`DashboardMsg`] values; side-effects are represented as [`DashboardCmd`]
//! values returned to the runtime. No I/O happens here.
//!
//! Selection moves through three states: nothing selected, loading (data for
//! the chosen subreddit is being fetched), and loaded (a [`ViewState`] exists
//! and is rendered into the table buffer).

#![allow(missing_docs)]

use std::time::Duration;

use crate::core::config::Config;
use crate::core::errors::{Result, StatsError};
use crate::logger::diagnostics::DiagnosticEvent;
use crate::render::buffer::TableBuffer;
use crate::render::format::{RowFormatter, Viewport};
use crate::render::incremental::{GrowOutcome, IncrementalRenderer};
use crate::source::cache::SessionCache;
use crate::source::fetcher::FetchCompletion;
use crate::source::provider::{SubredditList, SubredditPayload};
use crate::stats::aggregate::{AggregateWarning, aggregate_payload};
use crate::tui::input::{InputMode, KeyInput};
use crate::view::sort::SortColumn;
use crate::view::state::{ViewId, ViewState, ViewToken};

/// Rows used by everything except the table body: tab line, status line,
/// search line, column headers, footer, notification line.
pub const CHROME_ROWS: u16 = 6;

/// Maximum notifications kept on screen.
const MAX_NOTIFICATIONS: usize = 3;

// ──────────────────── selection ────────────────────

/// A subreddit whose data is on screen.
#[derive(Debug, Clone)]
pub struct LoadedView {
    pub index: usize,
    pub name: String,
    /// Freshness label from the payload timestamp.
    pub updated: Option<String>,
    pub view: ViewState,
}

#[derive(Debug, Clone, Default)]
pub enum Selection {
    #[default]
    NoSubredditSelected,
    /// Data for `name` has been requested and has not arrived yet.
    Loading { index: usize, name: String },
    Loaded(LoadedView),
}

impl Selection {
    /// Index of the selected subreddit, loading or loaded.
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::NoSubredditSelected => None,
            Self::Loading { index, .. } => Some(*index),
            Self::Loaded(loaded) => Some(loaded.index),
        }
    }

    pub const fn loaded(&self) -> Option<&LoadedView> {
        match self {
            Self::Loaded(loaded) => Some(loaded),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoSubredditSelected => "idle",
            Self::Loading { .. } => "loading",
            Self::Loaded(_) => "loaded",
        }
    }
}

/// Progress of the subreddit list fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListStatus {
    #[default]
    Loading,
    Loaded,
    Failed(String),
}

// ──────────────────── notifications ────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    /// How long a notification of this level stays visible.
    pub const fn lifetime(self) -> Duration {
        match self {
            Self::Info => Duration::from_secs(4),
            Self::Warning => Duration::from_secs(6),
            Self::Error => Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

// ──────────────────── messages ────────────────────

/// Events delivered to [`crate::tui::update::update`].
#[derive(Debug)]
pub enum DashboardMsg {
    /// Periodic timer tick.
    Tick,
    Key(KeyInput),
    Resize { cols: u16, rows: u16 },
    ListLoaded(Result<SubredditList>),
    SubredditLoaded {
        name: String,
        result: Result<SubredditPayload>,
    },
    SelectSubreddit(usize),
    SortColumnClicked(usize),
    SearchInputChanged(String),
    /// The visible window reached the end of the materialized rows of the
    /// view named by the token.
    ScrollNearEnd(ViewToken),
    /// Reload the subreddit list.
    Refresh,
    NotificationExpired(u64),
    Quit,
}

impl From<FetchCompletion> for DashboardMsg {
    fn from(done: FetchCompletion) -> Self {
        match done {
            FetchCompletion::List(result) => Self::ListLoaded(result),
            FetchCompletion::Subreddit { name, result, .. } => {
                Self::SubredditLoaded { name, result }
            }
        }
    }
}

// ──────────────────── commands ────────────────────

/// Side-effects for the runtime to execute.
#[derive(Debug)]
pub enum DashboardCmd {
    None,
    FetchList,
    FetchSubreddit { name: String },
    /// Feed `ScrollNearEnd(token)` back on the next loop iteration.
    RequestGrow(ViewToken),
    ScheduleTick(Duration),
    ScheduleNotificationExpiry { id: u64, after: Duration },
    Log(DiagnosticEvent),
    Quit,
    Batch(Vec<Self>),
}

impl DashboardCmd {
    /// Combine commands, dropping `None`s.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|cmd| !matches!(cmd, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Flatten into a list of leaf commands.
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}

// ──────────────────── settings ────────────────────

/// Knobs the model needs from the configuration.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub page_size: usize,
    pub grow_threshold_rows: usize,
    pub formatter: RowFormatter,
    pub quota_bytes: usize,
    pub prefetch_all: bool,
    pub tick: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DashboardSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            page_size: cfg.render.page_size,
            grow_threshold_rows: cfg.render.grow_threshold_rows,
            formatter: RowFormatter::from_config(&cfg.display),
            quota_bytes: cfg.cache.quota_bytes,
            prefetch_all: cfg.cache.prefetch_all,
            tick: Duration::from_millis(cfg.dashboard.tick_ms),
        }
    }
}

// ──────────────────── model ────────────────────

#[derive(Debug)]
pub struct DashboardModel {
    pub subs: Vec<String>,
    pub list_status: ListStatus,
    pub selection: Selection,
    pub cache: SessionCache,
    pub renderer: IncrementalRenderer,
    /// Materialized rows of the loaded view.
    pub table: TableBuffer,
    /// Text of the search field.
    pub search_input: String,
    pub input_mode: InputMode,
    /// Index of the first visible table row.
    pub scroll: usize,
    pub terminal_size: (u16, u16),
    pub grow_threshold_rows: usize,
    pub prefetch_all: bool,
    pub tick: u64,
    pub refresh: Duration,
    pub quit: bool,
    /// Active notifications, oldest first.
    pub notifications: Vec<Notification>,
    pub next_notification_id: u64,
    /// Grow requests rejected because their view was superseded.
    pub stale_grows: u64,
    next_view_id: u64,
}

impl DashboardModel {
    pub fn new(settings: DashboardSettings, terminal_size: (u16, u16)) -> Self {
        let viewport = Viewport::new(terminal_size.0, terminal_size.1);
        Self {
            subs: Vec::new(),
            list_status: ListStatus::Loading,
            selection: Selection::NoSubredditSelected,
            cache: SessionCache::new(settings.quota_bytes),
            renderer: IncrementalRenderer::new(
                settings.page_size.max(1),
                settings.formatter,
                viewport,
            ),
            table: TableBuffer::default(),
            search_input: String::new(),
            input_mode: InputMode::Normal,
            scroll: 0,
            terminal_size,
            grow_threshold_rows: settings.grow_threshold_rows,
            prefetch_all: settings.prefetch_all,
            tick: 0,
            refresh: settings.tick,
            quit: false,
            notifications: Vec::new(),
            next_notification_id: 0,
            stale_grows: 0,
            next_view_id: 1,
        }
    }

    /// Model with default settings and an 80x24 terminal.
    pub fn with_defaults() -> Self {
        Self::new(DashboardSettings::default(), (80, 24))
    }

    /// Commands to run once at startup.
    pub fn init(&self) -> DashboardCmd {
        DashboardCmd::batch(vec![
            DashboardCmd::FetchList,
            DashboardCmd::ScheduleTick(self.refresh),
        ])
    }

    pub fn loaded(&self) -> Option<&LoadedView> {
        self.selection.loaded()
    }

    /// Number of table rows visible at once.
    pub fn body_rows(&self) -> usize {
        usize::from(self.terminal_size.1.saturating_sub(CHROME_ROWS).max(1))
    }

    pub fn push_notification(&mut self, level: NotificationLevel, message: String) -> u64 {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification { id, level, message });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
        id
    }

    fn notify(&mut self, level: NotificationLevel, message: String) -> DashboardCmd {
        let id = self.push_notification(level, message);
        DashboardCmd::ScheduleNotificationExpiry {
            id,
            after: level.lifetime(),
        }
    }

    // ── list ──

    /// The subreddit list arrived (or failed).
    pub fn on_list_loaded(&mut self, result: Result<SubredditList>) -> DashboardCmd {
        let list = match result {
            Ok(list) => list,
            Err(err) => {
                self.list_status = ListStatus::Failed(err.to_string());
                return self.notify(
                    NotificationLevel::Error,
                    format!("could not load subreddit list: {err} (press r to retry)"),
                );
            }
        };

        self.subs = list.subs;
        self.list_status = ListStatus::Loaded;

        // A reload may have moved or removed the selected subreddit.
        let still_listed = match &self.selection {
            Selection::NoSubredditSelected => true,
            Selection::Loading { index, name } => self.subs.get(*index) == Some(name),
            Selection::Loaded(loaded) => self.subs.get(loaded.index) == Some(&loaded.name),
        };
        if !still_listed {
            self.selection = Selection::NoSubredditSelected;
            self.renderer.detach(&mut self.table);
            self.scroll = 0;
        }

        let mut cmds = vec![self.notify(
            NotificationLevel::Info,
            format!("{} subreddits available", self.subs.len()),
        )];
        if self.prefetch_all {
            cmds.extend(
                self.subs
                    .iter()
                    .filter(|name| !self.cache.contains(name))
                    .map(|name| DashboardCmd::FetchSubreddit { name: name.clone() }),
            );
        }
        DashboardCmd::batch(cmds)
    }

    pub fn on_refresh(&mut self) -> DashboardCmd {
        self.list_status = ListStatus::Loading;
        DashboardCmd::FetchList
    }

    // ── selection ──

    /// Select the subreddit at `index` (zero-based).
    pub fn on_subreddit_selected(&mut self, index: usize) -> DashboardCmd {
        let Some(name) = self.subs.get(index).cloned() else {
            return self.notify(
                NotificationLevel::Warning,
                format!("no subreddit #{}", index + 1),
            );
        };

        if let Some(payload) = self.cache.get(&name).cloned() {
            return self.load_view(index, name, &payload);
        }

        self.selection = Selection::Loading {
            index,
            name: name.clone(),
        };
        self.renderer.detach(&mut self.table);
        self.scroll = 0;
        DashboardCmd::FetchSubreddit { name }
    }

    /// Step through the list, wrapping at both ends.
    pub fn select_relative(&mut self, forward: bool) -> DashboardCmd {
        let len = self.subs.len();
        if len == 0 {
            return DashboardCmd::None;
        }
        let next = match (self.selection.index(), forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.on_subreddit_selected(next)
    }

    /// Data for one subreddit arrived (or failed).
    pub fn on_subreddit_data(
        &mut self,
        name: &str,
        result: Result<SubredditPayload>,
    ) -> DashboardCmd {
        let loading_index = match &self.selection {
            Selection::Loading { index, name: pending } if pending == name => Some(*index),
            _ => None,
        };

        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                if loading_index.is_none() {
                    return DashboardCmd::None;
                }
                self.selection = Selection::NoSubredditSelected;
                return self.notify(
                    NotificationLevel::Error,
                    format!("could not load r/{name}: {err}"),
                );
            }
        };

        let mut cmds = Vec::new();
        if let Err(err) = self.cache.store(name, payload.clone()) {
            cmds.push(DashboardCmd::Log(DiagnosticEvent::cache_write_dropped(
                name, &err,
            )));
            if matches!(err, StatsError::CacheQuotaExceeded { .. }) {
                cmds.push(self.notify(
                    NotificationLevel::Warning,
                    format!("session cache full, r/{name} will be fetched again next time"),
                ));
            }
        }
        if let Some(index) = loading_index {
            cmds.push(self.load_view(index, name.to_string(), &payload));
        }
        DashboardCmd::batch(cmds)
    }

    fn load_view(&mut self, index: usize, name: String, payload: &SubredditPayload) -> DashboardCmd {
        let aggregation = aggregate_payload(payload);
        let mut cmds = Vec::new();
        if !aggregation.warnings.is_empty() {
            let details = summarize_warnings(&aggregation.warnings);
            cmds.push(DashboardCmd::Log(DiagnosticEvent::MalformedPayload {
                name: name.clone(),
                details: details.clone(),
            }));
            cmds.push(self.notify(
                NotificationLevel::Warning,
                format!("r/{name}: {details}"),
            ));
        }

        let id = ViewId::new(self.next_view_id);
        self.next_view_id += 1;
        let view = ViewState::new(id, aggregation.dataset);
        cmds.push(DashboardCmd::Log(DiagnosticEvent::ViewLoaded {
            name: name.clone(),
            rows: view.len(),
        }));

        self.search_input.clear();
        self.input_mode = InputMode::Normal;
        self.selection = Selection::Loaded(LoadedView {
            index,
            name,
            updated: payload.timestamp_label(),
            view,
        });
        cmds.push(self.reset_table());
        DashboardCmd::batch(cmds)
    }

    // ── view transformations ──

    /// Toggle sorting on the column at `column_index`.
    pub fn on_sort_column_clicked(&mut self, column_index: usize) -> DashboardCmd {
        let Some(column) = SortColumn::from_index(column_index) else {
            return DashboardCmd::None;
        };
        let Selection::Loaded(loaded) = &mut self.selection else {
            return DashboardCmd::None;
        };
        loaded.view.activate_sort(column);
        self.reset_table()
    }

    /// Replace the search text and re-filter the loaded view.
    pub fn on_search_input_changed(&mut self, query: &str) -> DashboardCmd {
        self.search_input = query.to_string();
        let Selection::Loaded(loaded) = &mut self.selection else {
            return DashboardCmd::None;
        };
        loaded.view.apply_search(query);
        self.reset_table()
    }

    /// Materialize the next page if `token` still names the loaded view.
    pub fn on_scroll_near_end(&mut self, token: ViewToken) -> DashboardCmd {
        let outcome = match &self.selection {
            Selection::Loaded(loaded) => self.renderer.grow(token, &loaded.view, &mut self.table),
            _ => GrowOutcome::Stale,
        };
        match outcome {
            GrowOutcome::Stale => {
                self.stale_grows += 1;
                let current = self
                    .loaded()
                    .map_or_else(|| "none".to_string(), |l| l.view.token().to_string());
                DashboardCmd::Log(DiagnosticEvent::StaleGrowDropped {
                    details: format!("token {token} superseded by {current}"),
                })
            }
            GrowOutcome::Exhausted => DashboardCmd::None,
            GrowOutcome::Appended { .. } => self.grow_if_near_end(),
        }
    }

    fn reset_table(&mut self) -> DashboardCmd {
        self.scroll = 0;
        if let Selection::Loaded(loaded) = &self.selection {
            self.renderer.reset(&loaded.view, &mut self.table);
        }
        self.grow_if_near_end()
    }

    // ── scrolling ──

    pub fn max_scroll(&self) -> usize {
        self.table.len().saturating_sub(self.body_rows())
    }

    pub fn scroll_by(&mut self, delta: i64) -> DashboardCmd {
        let magnitude = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        self.scroll = if delta < 0 {
            self.scroll.saturating_sub(magnitude)
        } else {
            self.scroll.saturating_add(magnitude).min(self.max_scroll())
        };
        self.grow_if_near_end()
    }

    pub fn scroll_pages(&mut self, pages: i32) -> DashboardCmd {
        let page = i64::try_from(self.body_rows().saturating_sub(1).max(1)).unwrap_or(1);
        self.scroll_by(page * i64::from(pages))
    }

    pub fn scroll_to_top(&mut self) -> DashboardCmd {
        self.scroll = 0;
        DashboardCmd::None
    }

    pub fn scroll_to_bottom(&mut self) -> DashboardCmd {
        self.scroll = self.max_scroll();
        self.grow_if_near_end()
    }

    /// Request a grow when the bottom of the visible window is within the
    /// threshold of the materialized extent and rows remain.
    pub fn grow_if_near_end(&self) -> DashboardCmd {
        let Some(loaded) = self.loaded() else {
            return DashboardCmd::None;
        };
        let materialized = self.table.len();
        if self.renderer.is_exhausted(&loaded.view) || materialized >= loaded.view.len() {
            return DashboardCmd::None;
        }
        let visible_end = self.scroll + self.body_rows();
        if visible_end + self.grow_threshold_rows >= materialized {
            DashboardCmd::RequestGrow(loaded.view.token())
        } else {
            DashboardCmd::None
        }
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16) -> DashboardCmd {
        self.terminal_size = (cols, rows);
        let changed = self.renderer.set_viewport(Viewport::new(cols, rows));
        if changed && let Selection::Loaded(loaded) = &self.selection {
            self.renderer.refresh(&loaded.view, &mut self.table);
        }
        self.scroll = self.scroll.min(self.max_scroll());
        self.grow_if_near_end()
    }

    /// Page size in effect for this model.
    pub const fn page_size(&self) -> usize {
        self.renderer.page_size()
    }
}

impl Default for DashboardModel {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn summarize_warnings(warnings: &[AggregateWarning]) -> String {
    match warnings {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(users: usize) -> SubredditPayload {
        let mut map = serde_json::Map::new();
        for i in 0..users {
            map.insert(
                format!("user{i:03}"),
                json!({"commentScore": [i64::try_from(i).unwrap(), -1]}),
            );
        }
        SubredditPayload {
            users: serde_json::Value::Object(map),
            timestamp: Some("2024-05-01T00:00:00Z".to_string()),
        }
    }

    fn model_with_list(names: &[&str]) -> DashboardModel {
        let mut model = DashboardModel::new(
            DashboardSettings {
                prefetch_all: false,
                ..DashboardSettings::default()
            },
            (120, 30),
        );
        model.on_list_loaded(Ok(SubredditList {
            subs: names.iter().map(|s| (*s).to_string()).collect(),
        }));
        model
    }

    fn leaves(cmd: DashboardCmd) -> Vec<DashboardCmd> {
        cmd.flatten()
    }

    #[test]
    fn starts_with_nothing_selected() {
        let model = DashboardModel::with_defaults();
        assert!(matches!(model.selection, Selection::NoSubredditSelected));
        assert_eq!(model.list_status, ListStatus::Loading);
        let cmds = leaves(model.init());
        assert!(matches!(cmds[0], DashboardCmd::FetchList));
    }

    #[test]
    fn cache_miss_enters_loading_and_requests_fetch() {
        let mut model = model_with_list(&["rust", "cooking"]);
        let cmd = model.on_subreddit_selected(1);
        assert!(matches!(cmd, DashboardCmd::FetchSubreddit { ref name } if name == "cooking"));
        assert!(matches!(
            model.selection,
            Selection::Loading { index: 1, ref name } if name == "cooking"
        ));
    }

    #[test]
    fn arrival_of_pending_data_loads_view() {
        let mut model = model_with_list(&["rust"]);
        model.on_subreddit_selected(0);
        model.on_subreddit_data("rust", Ok(payload(120)));
        let loaded = model.loaded().expect("loaded");
        assert_eq!(loaded.view.len(), 120);
        assert_eq!(loaded.updated.as_deref(), Some("2024-05-01 00:00 UTC"));
        assert_eq!(model.table.len(), 50);
        assert!(model.cache.contains("rust"));
    }

    #[test]
    fn cache_hit_loads_immediately_with_fresh_view_id() {
        let mut model = model_with_list(&["rust"]);
        model.on_subreddit_data("rust", Ok(payload(3)));
        assert!(matches!(model.selection, Selection::NoSubredditSelected));

        model.on_subreddit_selected(0);
        let first = model.loaded().expect("loaded").view.id();
        model.on_subreddit_selected(0);
        let second = model.loaded().expect("loaded").view.id();
        assert_ne!(first, second);
    }

    #[test]
    fn out_of_range_selection_only_warns() {
        let mut model = model_with_list(&["rust"]);
        let cmd = model.on_subreddit_selected(5);
        assert!(matches!(cmd, DashboardCmd::ScheduleNotificationExpiry { .. }));
        assert!(matches!(model.selection, Selection::NoSubredditSelected));
        assert_eq!(
            model.notifications.last().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn data_for_other_subreddit_only_fills_cache() {
        let mut model = model_with_list(&["rust", "cooking"]);
        model.on_subreddit_selected(0);
        model.on_subreddit_data("cooking", Ok(payload(2)));
        assert!(matches!(model.selection, Selection::Loading { index: 0, .. }));
        assert!(model.cache.contains("cooking"));
    }

    #[test]
    fn fetch_failure_returns_to_idle_and_allows_retry() {
        let mut model = model_with_list(&["rust"]);
        model.on_subreddit_selected(0);
        model.on_subreddit_data(
            "rust",
            Err(StatsError::Fetch {
                name: "rust".to_string(),
                details: "boom".to_string(),
            }),
        );
        assert!(matches!(model.selection, Selection::NoSubredditSelected));
        assert!(!model.cache.contains("rust"));
        assert!(matches!(
            model.on_subreddit_selected(0),
            DashboardCmd::FetchSubreddit { .. }
        ));
    }

    #[test]
    fn quota_exceeded_still_shows_view() {
        let mut model = DashboardModel::new(
            DashboardSettings {
                quota_bytes: 16,
                prefetch_all: false,
                ..DashboardSettings::default()
            },
            (120, 30),
        );
        model.on_list_loaded(Ok(SubredditList {
            subs: vec!["rust".to_string()],
        }));
        model.on_subreddit_selected(0);
        let cmds = leaves(model.on_subreddit_data("rust", Ok(payload(10))));
        assert!(cmds.iter().any(|c| matches!(
            c,
            DashboardCmd::Log(DiagnosticEvent::CacheWriteDropped { .. })
        )));
        assert_eq!(model.loaded().expect("loaded").view.len(), 10);
        assert!(!model.cache.contains("rust"));
    }

    #[test]
    fn malformed_payload_loads_empty_view_with_warning() {
        let mut model = model_with_list(&["rust"]);
        model.on_subreddit_selected(0);
        let cmds = leaves(model.on_subreddit_data(
            "rust",
            Ok(SubredditPayload {
                users: json!([1, 2, 3]),
                timestamp: None,
            }),
        ));
        assert!(cmds.iter().any(|c| matches!(
            c,
            DashboardCmd::Log(DiagnosticEvent::MalformedPayload { .. })
        )));
        assert!(model.loaded().expect("loaded").view.is_empty());
        assert!(model.table.is_empty());
    }

    #[test]
    fn sort_and_search_reset_the_table() {
        let mut model = model_with_list(&["rust"]);
        model.on_subreddit_selected(0);
        model.on_subreddit_data("rust", Ok(payload(120)));
        model.scroll_by(5);

        model.on_sort_column_clicked(2);
        assert_eq!(model.scroll, 0);
        assert_eq!(model.table.rows()[0].username, "user000");
        model.on_sort_column_clicked(2);
        assert_eq!(model.table.rows()[0].username, "user119");

        model.on_search_input_changed("user11");
        assert_eq!(model.table.len(), 10);
        assert_eq!(model.search_input, "user11");
    }

    #[test]
    fn near_end_scroll_requests_grow_with_current_token() {
        let mut model = model_with_list(&["rust"]);
        model.on_subreddit_selected(0);
        model.on_subreddit_data("rust", Ok(payload(120)));
        let token = model.loaded().expect("loaded").view.token();

        let cmd = model.scroll_to_bottom();
        assert!(matches!(cmd, DashboardCmd::RequestGrow(t) if t == token));
        model.on_scroll_near_end(token);
        assert_eq!(model.table.len(), 100);
    }

    #[test]
    fn stale_grow_after_switching_subreddit_appends_nothing() {
        let mut model = model_with_list(&["rust", "cooking"]);
        model.on_subreddit_data("rust", Ok(payload(120)));
        model.on_subreddit_data("cooking", Ok(payload(120)));
        model.on_subreddit_selected(0);
        let DashboardCmd::RequestGrow(pending) = model.scroll_to_bottom() else {
            panic!("expected a grow request");
        };

        model.on_subreddit_selected(1);
        assert_eq!(model.table.len(), 50);
        let cmd = model.on_scroll_near_end(pending);
        assert!(matches!(
            cmd,
            DashboardCmd::Log(DiagnosticEvent::StaleGrowDropped { .. })
        ));
        assert_eq!(model.table.len(), 50);
        assert_eq!(model.stale_grows, 1);
    }

    #[test]
    fn relative_selection_wraps() {
        let mut model = model_with_list(&["a", "b", "c"]);
        model.select_relative(false);
        assert_eq!(model.selection.index(), Some(2));
        model.select_relative(true);
        assert_eq!(model.selection.index(), Some(0));
    }

    #[test]
    fn prefetch_requests_every_uncached_subreddit() {
        let mut model = DashboardModel::with_defaults();
        let cmds = leaves(model.on_list_loaded(Ok(SubredditList {
            subs: vec!["a".to_string(), "b".to_string()],
        })));
        let fetches: Vec<&str> = cmds
            .iter()
            .filter_map(|c| match c {
                DashboardCmd::FetchSubreddit { name } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fetches, vec!["a", "b"]);
    }

    #[test]
    fn list_failure_is_reported() {
        let mut model = DashboardModel::with_defaults();
        model.on_list_loaded(Err(StatsError::io(
            "/data/subreddits.json",
            std::io::Error::other("gone"),
        )));
        assert!(matches!(model.list_status, ListStatus::Failed(_)));
        assert_eq!(
            model.notifications.last().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[test]
    fn notifications_are_bounded() {
        let mut model = DashboardModel::with_defaults();
        for i in 0..10 {
            model.push_notification(NotificationLevel::Info, format!("n{i}"));
        }
        assert_eq!(model.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(model.notifications[0].message, "n7");
    }

    #[test]
    fn batch_drops_none_and_unwraps_singletons() {
        assert!(matches!(
            DashboardCmd::batch(vec![DashboardCmd::None]),
            DashboardCmd::None
        ));
        assert!(matches!(
            DashboardCmd::batch(vec![DashboardCmd::None, DashboardCmd::Quit]),
            DashboardCmd::Quit
        ));
    }
}
