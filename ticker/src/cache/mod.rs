//! Shared key-value store holding the execution window state
//!
//! The executor only ever touches three keys (see `constants::keys`), but
//! the store itself is a plain string cache with optional per-entry TTLs.
//! Values are kept as strings; the normalization helpers below tolerate the
//! boolean and numeric forms older tooling may have written.

pub mod sqlite;

pub use sqlite::SqliteCache;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value; with a TTL the entry expires on its own
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Normalize a stored flag; tolerates "true", "1" and nonzero numerics
pub fn parse_flag(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(raw) => {
            let raw = raw.trim();
            raw.eq_ignore_ascii_case("true")
                || raw.parse::<f64>().map(|n| n != 0.0).unwrap_or(false)
        }
    }
}

/// Normalize a stored epoch-millis timestamp; 0 when absent or unreadable
pub fn parse_timestamp(value: Option<&str>) -> i64 {
    match value {
        None => 0,
        Some(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>()
                .unwrap_or_else(|_| raw.parse::<f64>().map(|n| n as i64).unwrap_or(0))
        }
    }
}

struct CachedValue {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory cache for single-process runs and tests
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CachedValue>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        let expired = entries
            .get(key)
            .map(|entry| entry.expires_at.map(|at| at <= Instant::now()).unwrap_or(false))
            .unwrap_or(false);
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.entries.write().await.insert(
            key.to_string(),
            CachedValue {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
