//! Synthetic data directories in the provider layout, for demos and tests.
//!
//! Generation is deterministic for a given seed.

#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};

use crate::core::errors::{Result, StatsError};
use crate::source::provider::{SubredditList, SubredditPayload};

const SUB_NAMES: &[&str] = &[
    "AskHistorians",
    "cooking",
    "rust",
    "gardening",
    "photography",
    "woodworking",
    "astronomy",
    "boardgames",
    "chess",
    "linux",
    "bicycling",
    "homebrewing",
];

const NAME_PARTS: &[&str] = &[
    "john", "jane", "bob", "alice", "quiet", "river", "pixel", "maple", "ember", "nova", "otter",
    "cobalt", "tiny", "grumpy", "lucky", "salty", "night", "owl", "fox", "wren",
];

/// Shape of a generated data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSpec {
    pub subs: usize,
    pub users: usize,
    pub max_comments: usize,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            subs: 4,
            users: 240,
            max_comments: 40,
            seed: 7,
        }
    }
}

/// A generated subreddit list plus one payload per subreddit.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub list: SubredditList,
    pub payloads: Vec<(String, SubredditPayload)>,
}

/// Generate a data set. Usernames occasionally carry a `-` or `_` prefix.
pub fn generate(spec: SampleSpec) -> SampleData {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let base_ts = 1_700_000_000 + rng.random_range(0..10_000_000_i64);

    let mut payloads = Vec::with_capacity(spec.subs);
    for index in 0..spec.subs {
        let name = sub_name(index);
        let mut users = Map::new();
        while users.len() < spec.users {
            let username = username(&mut rng);
            if users.contains_key(&username) {
                continue;
            }
            users.insert(username, user_record(&mut rng, spec.max_comments));
        }
        let timestamp = Utc
            .timestamp_opt(base_ts + i64::try_from(index).unwrap_or(0) * 3_600, 0)
            .single()
            .map(|at| at.to_rfc3339());
        payloads.push((
            name,
            SubredditPayload {
                users: Value::Object(users),
                timestamp,
            },
        ));
    }

    SampleData {
        list: SubredditList {
            subs: payloads.iter().map(|(name, _)| name.clone()).collect(),
        },
        payloads,
    }
}

/// Write `data` as `<dir>/<list_file>` plus `<dir>/<name>.json` files.
pub fn write_directory(dir: &Path, list_file: &str, data: &SampleData) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| StatsError::io(dir, source))?;
    write_json(&dir.join(list_file), &data.list)?;
    for (name, payload) in &data.payloads {
        write_json(&dir.join(format!("{name}.json")), payload)?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).map_err(|source| StatsError::io(path, source))
}

fn sub_name(index: usize) -> String {
    let base = SUB_NAMES[index % SUB_NAMES.len()];
    match index / SUB_NAMES.len() {
        0 => base.to_string(),
        round => format!("{base}{}", round + 1),
    }
}

fn username(rng: &mut StdRng) -> String {
    let first = NAME_PARTS[rng.random_range(0..NAME_PARTS.len())];
    let second = NAME_PARTS[rng.random_range(0..NAME_PARTS.len())];
    let suffix: u16 = rng.random_range(0..1000);
    let prefix = match rng.random_range(0..10) {
        0 => "_",
        1 => "-",
        _ => "",
    };
    if rng.random_bool(0.5) {
        format!("{prefix}{first}_{second}{suffix}")
    } else {
        let mut capitalized = first.to_string();
        if let Some(head) = capitalized.get_mut(0..1) {
            head.make_ascii_uppercase();
        }
        format!("{prefix}{capitalized}{second}{suffix}")
    }
}

fn user_record(rng: &mut StdRng, max_comments: usize) -> Value {
    let count = rng.random_range(1..=max_comments.max(1));
    let generous = rng.random_bool(0.7);
    let scores: Vec<i64> = (0..count)
        .map(|_| {
            if generous {
                rng.random_range(0..60)
            } else {
                rng.random_range(-15..30)
            }
        })
        .collect();
    let ids: Vec<String> = (0..count)
        .map(|_| format!("{:x}", rng.random_range(0x10_0000_u32..0xff_ffff)))
        .collect();
    json!({"commentScore": scores, "commentId": ids})
}
