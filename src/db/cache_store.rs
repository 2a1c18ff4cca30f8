use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;

const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Shared key/value store with per-entry TTL.
///
/// Writes are independent idempotent sets; there is no locking across
/// concurrent computations of the same key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn set(&self, key: &str, value: &Value, ttl_seconds: u64) -> Result<(), CacheError>;
}

#[derive(Clone)]
struct CacheEntry {
    value: Value,
    ttl: Duration,
}

/// Each entry lives for the TTL it was last written with.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process store, used when no Redis is configured and in tests.
/// Bounded by entry count; expired entries are evicted in the background.
pub struct MemoryCacheStore {
    entries: Cache<String, CacheEntry>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryTtl)
            .build();
        Self { entries }
    }

    /// Live entries after pending evictions have run.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.entries.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &Value, ttl_seconds: u64) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value: value.clone(),
            ttl: Duration::from_secs(ttl_seconds),
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }
}
