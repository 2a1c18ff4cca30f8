use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;

use super::cache_store::{CacheError, CacheStore};

/// Cache store backed by a shared Redis instance.
///
/// Values are kept as JSON strings and expire through `SET ... EX`.
#[derive(Clone)]
pub struct RedisCacheStore {
    manager: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        log::info!("Connecting to Redis cache");

        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Backend(format!("Invalid REDIS_URL: {}", e)))?;
        let mut manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to connect to Redis: {}", e)))?;

        // Fail early instead of on the first request.
        redis::cmd("PING")
            .query_async::<_, String>(&mut manager)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis ping failed: {}", e)))?;

        log::info!("Redis cache connected");
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl_seconds: u64) -> Result<(), CacheError> {
        let raw =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let mut conn = self.manager.clone();
        // Redis rejects EX 0.
        conn.set_ex::<_, _, ()>(key, raw, ttl_seconds.max(1))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
