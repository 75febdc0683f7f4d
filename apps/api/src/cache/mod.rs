//! Response cache: time-bounded storage for upstream payloads.
//!
//! `AppState` never sees a concrete cache: the Steam client holds an
//! `Arc<dyn ResponseCache>`, picked at startup (Redis when `REDIS_URL` is set,
//! in-memory otherwise). Cache failures are never fatal; a broken cache reads
//! as a miss.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::clock::Clock;

pub mod redis_cache;

pub use redis_cache::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
}

const DEFAULT_MAX_ENTRIES: usize = 1_000;

struct Entry {
    value: Value,
    expires_at_millis: i64,
}

/// Process-local cache with per-entry expiry.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(clock, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(clock: Arc<dyn Clock>, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            max_entries: max_entries.max(1),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned map only ever holds fully written entries.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now_millis();
        let mut entries = self.lock();
        let fresh = entries.get(key).map(|e| e.expires_at_millis > now)?;
        if fresh {
            entries.get(key).map(|e| e.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let now = self.clock.now_millis();
        let mut entries = self.lock();

        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            entries.retain(|_, e| e.expires_at_millis > now);
            if entries.len() >= self.max_entries {
                let soonest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at_millis)
                    .map(|(k, _)| k.clone());
                if let Some(evict) = soonest {
                    warn!("Response cache full, evicting {evict}");
                    entries.remove(&evict);
                }
            }
        }

        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at_millis: now.saturating_add(ttl_millis),
            },
        );
    }
}
