//! Session cache: one slot per subreddit, bounded by a byte quota.
//!
//! Entry size is the key length plus the serialized JSON length of the
//! payload. A write that would exceed the quota is rejected and leaves any
//! previous entry for that key in place.

#![allow(missing_docs)]

use std::collections::HashMap;

use crate::core::errors::{Result, StatsError};
use crate::source::provider::SubredditPayload;

#[derive(Debug, Clone)]
struct Slot {
    payload: SubredditPayload,
    bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SessionCache {
    quota_bytes: usize,
    used_bytes: usize,
    slots: HashMap<String, Slot>,
}

impl SessionCache {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            quota_bytes,
            used_bytes: 0,
            slots: HashMap::new(),
        }
    }

    /// Store `payload` under `name`, replacing any previous entry.
    pub fn store(&mut self, name: &str, payload: SubredditPayload) -> Result<()> {
        let bytes = name.len() + serde_json::to_string(&payload)?.len();
        let replaced = self.slots.get(name).map_or(0, |slot| slot.bytes);
        let available = self.quota_bytes - (self.used_bytes - replaced);
        if bytes > available {
            return Err(StatsError::CacheQuotaExceeded {
                key: name.to_string(),
                needed: bytes,
                available,
                quota: self.quota_bytes,
            });
        }
        self.used_bytes = self.used_bytes - replaced + bytes;
        self.slots.insert(name.to_string(), Slot { payload, bytes });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SubredditPayload> {
        self.slots.get(name).map(|slot| &slot.payload)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<SubredditPayload> {
        let slot = self.slots.remove(name)?;
        self.used_bytes -= slot.bytes;
        Some(slot.payload)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.used_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }
}
