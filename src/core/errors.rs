//! SST-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Top-level error type for the subreddit statistics crate.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("[SST-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SST-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SST-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SST-2001] invalid subreddit name {name:?}: {reason}")]
    InvalidSubreddit { name: String, reason: &'static str },

    #[error("[SST-2002] malformed payload in {context}: {details}")]
    MalformedPayload {
        context: &'static str,
        details: String,
    },

    #[error("[SST-2003] fetch failed for {name}: {details}")]
    Fetch { name: String, details: String },

    #[error("[SST-2004] cache quota exceeded for {key}: need {needed} bytes, {available} of {quota} available")]
    CacheQuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
        quota: usize,
    },

    #[error("[SST-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[SST-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SST-3002] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SST-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl StatsError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SST-1001",
            Self::MissingConfig { .. } => "SST-1002",
            Self::ConfigParse { .. } => "SST-1003",
            Self::InvalidSubreddit { .. } => "SST-2001",
            Self::MalformedPayload { .. } => "SST-2002",
            Self::Fetch { .. } => "SST-2003",
            Self::CacheQuotaExceeded { .. } => "SST-2004",
            Self::Serialization { .. } => "SST-2101",
            Self::Io { .. } => "SST-3001",
            Self::ChannelClosed { .. } => "SST-3002",
            Self::Runtime { .. } => "SST-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Fetch { .. } | Self::ChannelClosed { .. } | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for StatsError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
