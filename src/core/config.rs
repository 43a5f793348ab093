//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, StatsError};

/// Full configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub render: RenderConfig,
    pub display: DisplayConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub log: LogConfig,
    pub dashboard: DashboardConfig,
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// Where subreddit statistics files live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `subreddits.json` and one `<name>.json` per subreddit.
    pub dir: PathBuf,
    /// File name of the subreddit list inside `dir`.
    pub list_file: String,
}

/// Incremental rendering knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Rows materialized per page.
    pub page_size: usize,
    /// Grow when the visible window is this many rows from the materialized end.
    pub grow_threshold_rows: usize,
}

/// Presentation heuristics for the username column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Viewports with width/height below this ratio are "narrow".
    pub narrow_aspect_ratio: f64,
    pub narrow_username_chars: usize,
    pub wide_username_chars: usize,
    pub ellipsis: String,
    /// Width/height of one terminal cell, used to turn cols/rows into an aspect ratio.
    pub cell_aspect: f64,
}

/// Session cache budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub quota_bytes: usize,
    /// Fetch every subreddit as soon as the list arrives.
    pub prefetch_all: bool,
}

/// Fetch worker pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchConfig {
    pub workers: usize,
}

/// JSONL diagnostics log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub jsonl_path: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Interactive dashboard loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub tick_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("json"),
            list_file: "subreddits.json".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            grow_threshold_rows: 10,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            narrow_aspect_ratio: 0.70,
            narrow_username_chars: 11,
            wide_username_chars: 25,
            ellipsis: "...".to_string(),
            cell_aspect: 0.5,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quota_bytes: 5 * 1024 * 1024,
            prefetch_all: true,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_path: data_home().join("diagnostics.jsonl"),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[SST-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_home() -> PathBuf {
    home_dir().join(".local").join("share").join("substats")
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        home_dir().join(".config").join("substats").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| StatsError::Io {
                path: path_buf.clone(),
                source,
            })?;
            toml::from_str::<Self>(&raw)?
        } else if is_explicit_path {
            return Err(StatsError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Absolute path of the subreddit list file.
    #[must_use]
    pub fn list_path(&self) -> PathBuf {
        self.data.dir.join(&self.data.list_file)
    }

    /// Deterministic hash of the effective config for diagnostics.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SUBSTATS_DATA_DIR") {
            self.data.dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("SUBSTATS_DATA_LIST_FILE") {
            self.data.list_file = raw;
        }

        if let Some(raw) = lookup("SUBSTATS_RENDER_PAGE_SIZE") {
            self.render.page_size = parse_env("SUBSTATS_RENDER_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("SUBSTATS_RENDER_GROW_THRESHOLD_ROWS") {
            self.render.grow_threshold_rows =
                parse_env("SUBSTATS_RENDER_GROW_THRESHOLD_ROWS", &raw)?;
        }

        if let Some(raw) = lookup("SUBSTATS_DISPLAY_NARROW_ASPECT_RATIO") {
            self.display.narrow_aspect_ratio =
                parse_env("SUBSTATS_DISPLAY_NARROW_ASPECT_RATIO", &raw)?;
        }
        if let Some(raw) = lookup("SUBSTATS_DISPLAY_NARROW_USERNAME_CHARS") {
            self.display.narrow_username_chars =
                parse_env("SUBSTATS_DISPLAY_NARROW_USERNAME_CHARS", &raw)?;
        }
        if let Some(raw) = lookup("SUBSTATS_DISPLAY_WIDE_USERNAME_CHARS") {
            self.display.wide_username_chars =
                parse_env("SUBSTATS_DISPLAY_WIDE_USERNAME_CHARS", &raw)?;
        }

        if let Some(raw) = lookup("SUBSTATS_CACHE_QUOTA_BYTES") {
            self.cache.quota_bytes = parse_env("SUBSTATS_CACHE_QUOTA_BYTES", &raw)?;
        }
        if let Some(raw) = lookup("SUBSTATS_CACHE_PREFETCH_ALL") {
            self.cache.prefetch_all = parse_env("SUBSTATS_CACHE_PREFETCH_ALL", &raw)?;
        }

        if let Some(raw) = lookup("SUBSTATS_FETCH_WORKERS") {
            self.fetch.workers = parse_env("SUBSTATS_FETCH_WORKERS", &raw)?;
        }

        if let Some(raw) = lookup("SUBSTATS_LOG_ENABLED") {
            self.log.enabled = parse_env("SUBSTATS_LOG_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("SUBSTATS_LOG_JSONL_PATH") {
            self.log.jsonl_path = PathBuf::from(raw);
        }

        if let Some(raw) = lookup("SUBSTATS_DASHBOARD_TICK_MS") {
            self.dashboard.tick_ms = parse_env("SUBSTATS_DASHBOARD_TICK_MS", &raw)?;
        }

        Ok(())
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        if self.data.list_file.trim().is_empty() {
            return Err(StatsError::InvalidConfig {
                details: "data.list_file must not be empty".to_string(),
            });
        }

        if self.render.page_size == 0 {
            return Err(StatsError::InvalidConfig {
                details: "render.page_size must be >= 1".to_string(),
            });
        }

        let display = &self.display;
        if display.narrow_username_chars == 0 || display.wide_username_chars == 0 {
            return Err(StatsError::InvalidConfig {
                details: "display username widths must be >= 1".to_string(),
            });
        }
        if display.narrow_username_chars >= display.wide_username_chars {
            return Err(StatsError::InvalidConfig {
                details: format!(
                    "display.narrow_username_chars ({}) must be < display.wide_username_chars ({})",
                    display.narrow_username_chars, display.wide_username_chars
                ),
            });
        }
        if !(display.narrow_aspect_ratio > 0.0 && display.narrow_aspect_ratio <= 10.0) {
            return Err(StatsError::InvalidConfig {
                details: format!(
                    "display.narrow_aspect_ratio must be in (0, 10], got {}",
                    display.narrow_aspect_ratio
                ),
            });
        }
        if !(display.cell_aspect > 0.0 && display.cell_aspect <= 4.0) {
            return Err(StatsError::InvalidConfig {
                details: format!(
                    "display.cell_aspect must be in (0, 4], got {}",
                    display.cell_aspect
                ),
            });
        }

        if self.cache.quota_bytes == 0 {
            return Err(StatsError::InvalidConfig {
                details: "cache.quota_bytes must be > 0".to_string(),
            });
        }

        if !(1..=64).contains(&self.fetch.workers) {
            return Err(StatsError::InvalidConfig {
                details: format!("fetch.workers must be in [1, 64], got {}", self.fetch.workers),
            });
        }

        if self.dashboard.tick_ms < 10 {
            return Err(StatsError::InvalidConfig {
                details: format!(
                    "dashboard.tick_ms must be >= 10, got {}",
                    self.dashboard.tick_ms
                ),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| StatsError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
