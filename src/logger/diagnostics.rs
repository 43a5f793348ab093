//! Shared diagnostics handle: typed events fanned out to the JSONL file and a
//! small in-memory ring the dashboard reads for its notification line.
//!
//! The handle is cheap to clone and safe to use from fetch workers and the
//! runtime thread at the same time.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::config::LogConfig;
use crate::core::errors::StatsError;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Number of recent entries retained in memory.
const RECENT_CAPACITY: usize = 64;

/// Events emitted by the data pipeline and dashboard.
#[derive(Debug, Clone)]
pub enum DiagnosticEvent {
    SubredditListLoaded {
        count: usize,
    },
    SubredditFetched {
        name: String,
        users: usize,
        duration_ms: u64,
    },
    FetchFailed {
        name: String,
        code: &'static str,
        message: String,
    },
    MalformedPayload {
        name: String,
        details: String,
    },
    CacheWriteDropped {
        name: String,
        code: &'static str,
        message: String,
    },
    ViewLoaded {
        name: String,
        rows: usize,
    },
    StaleGrowDropped {
        details: String,
    },
    DashboardStart {
        config_hash: String,
    },
    DashboardStop {
        reason: String,
    },
}

impl DiagnosticEvent {
    /// Build a `FetchFailed` event from the underlying error.
    pub fn fetch_failed(name: impl Into<String>, err: &StatsError) -> Self {
        Self::FetchFailed {
            name: name.into(),
            code: err.code(),
            message: err.to_string(),
        }
    }

    /// Build a `CacheWriteDropped` event from the underlying error.
    pub fn cache_write_dropped(name: impl Into<String>, err: &StatsError) -> Self {
        Self::CacheWriteDropped {
            name: name.into(),
            code: err.code(),
            message: err.to_string(),
        }
    }

    fn into_entry(self) -> LogEntry {
        match self {
            Self::SubredditListLoaded { count } => {
                LogEntry::new(EventType::SubredditListLoaded, Severity::Info).with_rows(count)
            }
            Self::SubredditFetched {
                name,
                users,
                duration_ms,
            } => LogEntry::new(EventType::SubredditFetched, Severity::Info)
                .with_subreddit(name)
                .with_rows(users)
                .with_duration_ms(duration_ms),
            Self::FetchFailed {
                name,
                code,
                message,
            } => {
                let mut entry =
                    LogEntry::new(EventType::FetchFailed, Severity::Error).with_subreddit(name);
                entry.error_code = Some(code.to_string());
                entry.error_message = Some(message);
                entry
            }
            Self::MalformedPayload { name, details } => {
                LogEntry::new(EventType::MalformedPayload, Severity::Warning)
                    .with_subreddit(name)
                    .with_details(details)
            }
            Self::CacheWriteDropped {
                name,
                code,
                message,
            } => {
                let mut entry = LogEntry::new(EventType::CacheWriteDropped, Severity::Warning)
                    .with_subreddit(name);
                entry.error_code = Some(code.to_string());
                entry.error_message = Some(message);
                entry
            }
            Self::ViewLoaded { name, rows } => LogEntry::new(EventType::ViewLoaded, Severity::Info)
                .with_subreddit(name)
                .with_rows(rows),
            Self::StaleGrowDropped { details } => {
                LogEntry::new(EventType::StaleGrowDropped, Severity::Info).with_details(details)
            }
            Self::DashboardStart { config_hash } => {
                LogEntry::new(EventType::DashboardStart, Severity::Info)
                    .with_details(format!("config_hash={config_hash}"))
            }
            Self::DashboardStop { reason } => {
                LogEntry::new(EventType::DashboardStop, Severity::Info).with_details(reason)
            }
        }
    }
}

struct Inner {
    writer: Option<JsonlWriter>,
    recent: VecDeque<LogEntry>,
}

/// Thread-safe, cheaply-cloneable diagnostics handle.
#[derive(Clone)]
pub struct Diagnostics {
    inner: Arc<Mutex<Inner>>,
}

impl Diagnostics {
    /// Handle that writes to the configured JSONL file, or only to memory when
    /// logging is disabled.
    pub fn from_config(cfg: &LogConfig) -> Self {
        let writer = cfg
            .enabled
            .then(|| JsonlWriter::open(JsonlConfig::from(cfg)));
        Self::with_writer(writer)
    }

    /// Handle that only keeps the in-memory ring.
    pub fn in_memory() -> Self {
        Self::with_writer(None)
    }

    fn with_writer(writer: Option<JsonlWriter>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                writer,
                recent: VecDeque::with_capacity(RECENT_CAPACITY),
            })),
        }
    }

    /// Record an event. Never fails.
    pub fn emit(&self, event: DiagnosticEvent) {
        let entry = event.into_entry();
        let mut inner = self.inner.lock();
        if let Some(writer) = inner.writer.as_mut() {
            writer.write_entry(&entry);
        }
        if inner.recent.len() == RECENT_CAPACITY {
            inner.recent.pop_front();
        }
        inner.recent.push_back(entry);
    }

    /// Snapshot of the most recent entries, oldest first.
    pub fn recent(&self) -> Vec<LogEntry> {
        self.inner.lock().recent.iter().cloned().collect()
    }

    /// Number of retained entries with the given event type.
    pub fn count(&self, event: EventType) -> usize {
        self.inner
            .lock()
            .recent
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }

    pub fn flush(&self) {
        if let Some(writer) = self.inner.lock().writer.as_mut() {
            writer.flush();
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Diagnostics")
            .field("writer", &inner.writer.as_ref().map(JsonlWriter::state))
            .field("recent", &inner.recent.len())
            .finish()
    }
}
