//! Data provider: the subreddit list and per-subreddit statistics payloads.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::errors::{Result, StatsError};

/// `subreddits.json`: `{"subs": [..]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubredditList {
    #[serde(default)]
    pub subs: Vec<String>,
}

/// `<name>.json`: `{"users": {..}, "timestamp": ".."}`.
///
/// `users` is kept as raw JSON; the aggregator decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubredditPayload {
    #[serde(default)]
    pub users: Value,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp: Option<String>,
}

impl SubredditPayload {
    /// Parse the timestamp as RFC 3339 or as epoch seconds.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        let secs = raw
            .parse::<i64>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().map(|f| f.trunc() as i64))?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// Human-readable freshness label; the raw text when it cannot be parsed.
    pub fn timestamp_label(&self) -> Option<String> {
        match self.updated_at() {
            Some(at) => Some(at.format("%Y-%m-%d %H:%M UTC").to_string()),
            None => self.timestamp.clone(),
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Source of subreddit data. Implementations must be shareable with fetch workers.
pub trait DataProvider: Send + Sync {
    fn fetch_subreddit_list(&self) -> Result<SubredditList>;
    fn fetch_subreddit_data(&self, name: &str) -> Result<SubredditPayload>;
}

/// Reject names that are empty or could escape the data directory.
pub fn validate_subreddit_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "empty name"
    } else if name.contains('/') || name.contains('\\') {
        "contains a path separator"
    } else if name.contains("..") {
        "contains '..'"
    } else if name.contains('\0') {
        "contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(StatsError::InvalidSubreddit {
        name: name.to_string(),
        reason,
    })
}

/// Serves `<root>/<list_file>` and `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
    list_file: String,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>, list_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            list_file: list_file.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the payload file for `name`, after validation.
    pub fn payload_path(&self, name: &str) -> Result<PathBuf> {
        validate_subreddit_name(name)?;
        Ok(self.root.join(format!("{name}.json")))
    }

    fn read(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| StatsError::io(path, source))
    }
}

impl DataProvider for DirectoryProvider {
    fn fetch_subreddit_list(&self) -> Result<SubredditList> {
        let path = self.root.join(&self.list_file);
        let raw = Self::read(&path)?;
        serde_json::from_str(&raw).map_err(|e| StatsError::MalformedPayload {
            context: "subreddit list",
            details: format!("{}: {e}", path.display()),
        })
    }

    fn fetch_subreddit_data(&self, name: &str) -> Result<SubredditPayload> {
        let path = self.payload_path(name)?;
        let raw = Self::read(&path)?;
        let malformed = |e: serde_json::Error| StatsError::MalformedPayload {
            context: "subreddit payload",
            details: format!("{}: {e}", path.display()),
        };
        let value: Value = serde_json::from_str(&raw).map_err(malformed)?;
        if !value.is_object() {
            // Valid JSON of the wrong shape: hand it to the aggregator, which
            // reports it as a warning and yields no rows.
            return Ok(SubredditPayload {
                users: value,
                timestamp: None,
            });
        }
        serde_json::from_value(value).map_err(malformed)
    }
}

/// In-memory provider with failure injection, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    list: SubredditList,
    payloads: HashMap<String, SubredditPayload>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryProvider {
    pub fn new(payloads: Vec<(String, SubredditPayload)>) -> Self {
        let subs = payloads.iter().map(|(name, _)| name.clone()).collect();
        Self {
            list: SubredditList { subs },
            payloads: payloads.into_iter().collect(),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make every fetch of `name` fail until [`Self::heal`] is called.
    pub fn fail(&self, name: &str) {
        self.failing.lock().insert(name.to_string());
    }

    pub fn heal(&self, name: &str) {
        self.failing.lock().remove(name);
    }
}

impl DataProvider for MemoryProvider {
    fn fetch_subreddit_list(&self) -> Result<SubredditList> {
        Ok(self.list.clone())
    }

    fn fetch_subreddit_data(&self, name: &str) -> Result<SubredditPayload> {
        if self.failing.lock().contains(name) {
            return Err(StatsError::Fetch {
                name: name.to_string(),
                details: "injected failure".to_string(),
            });
        }
        self.payloads
            .get(name)
            .cloned()
            .ok_or_else(|| StatsError::Fetch {
                name: name.to_string(),
                details: "no such subreddit".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn directory_provider_reads_list_and_payload() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "subreddits.json", r#"{"subs":["rust","cooking"]}"#);
        write(
            dir.path(),
            "rust.json",
            r#"{"users":{"ann":{"commentScore":[1,2]}},"timestamp":"2024-03-01T12:00:00Z"}"#,
        );
        let provider = DirectoryProvider::new(dir.path(), "subreddits.json");

        let list = provider.fetch_subreddit_list().unwrap();
        assert_eq!(list.subs, vec!["rust", "cooking"]);

        let payload = provider.fetch_subreddit_data("rust").unwrap();
        assert_eq!(payload.users["ann"]["commentScore"], json!([1, 2]));
        assert_eq!(
            payload.timestamp_label().as_deref(),
            Some("2024-03-01 12:00 UTC")
        );
    }

    #[test]
    fn missing_payload_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirectoryProvider::new(dir.path(), "subreddits.json");
        let err = provider.fetch_subreddit_data("nowhere").unwrap_err();
        assert_eq!(err.code(), "SST-3001");
        assert!(err.is_retryable());
    }

    #[test]
    fn malformed_payload_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", "{not json");
        let provider = DirectoryProvider::new(dir.path(), "subreddits.json");
        let err = provider.fetch_subreddit_data("bad").unwrap_err();
        assert_eq!(err.code(), "SST-2002");
    }

    #[test]
    fn non_object_payload_loads_as_unusable_users() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "list.json", "[]");
        write(dir.path(), "word.json", r#""x""#);
        let provider = DirectoryProvider::new(dir.path(), "subreddits.json");

        let payload = provider.fetch_subreddit_data("list").unwrap();
        assert_eq!(payload.users, json!([]));
        assert!(payload.timestamp.is_none());

        let payload = provider.fetch_subreddit_data("word").unwrap();
        let agg = crate::stats::aggregate::aggregate_payload(&payload);
        assert!(agg.dataset.is_empty());
        assert!(matches!(
            agg.warnings.as_slice(),
            [crate::stats::aggregate::AggregateWarning::NotAMapping { .. }]
        ));
    }

    #[test]
    fn traversal_names_are_rejected() {
        for name in ["", "  ", "../etc/passwd", "a/b", "a\\b", ".."] {
            let err = validate_subreddit_name(name).unwrap_err();
            assert!(
                matches!(err, StatsError::InvalidSubreddit { .. }),
                "{name:?} should be rejected"
            );
        }
        assert!(validate_subreddit_name("AskHistorians").is_ok());
        assert!(validate_subreddit_name("a.b").is_ok());
    }

    #[test]
    fn epoch_timestamps_parse() {
        let payload: SubredditPayload =
            serde_json::from_str(r#"{"users":{},"timestamp":1700000000}"#).unwrap();
        assert_eq!(payload.timestamp.as_deref(), Some("1700000000"));
        assert_eq!(
            payload.updated_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn unparseable_timestamp_is_kept_raw() {
        let payload = SubredditPayload {
            users: json!({}),
            timestamp: Some("last tuesday".to_string()),
        };
        assert!(payload.updated_at().is_none());
        assert_eq!(payload.timestamp_label().as_deref(), Some("last tuesday"));
    }

    #[test]
    fn payload_without_users_defaults_to_null() {
        let payload: SubredditPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.users.is_null());
        assert!(payload.timestamp.is_none());
    }

    #[test]
    fn memory_provider_injects_failures() {
        let provider = MemoryProvider::new(vec![(
            "rust".to_string(),
            SubredditPayload {
                users: json!({}),
                timestamp: None,
            },
        )]);
        assert_eq!(provider.fetch_subreddit_list().unwrap().subs, vec!["rust"]);
        provider.fail("rust");
        assert_eq!(
            provider.fetch_subreddit_data("rust").unwrap_err().code(),
            "SST-2003"
        );
        provider.heal("rust");
        assert!(provider.fetch_subreddit_data("rust").is_ok());
    }
}
