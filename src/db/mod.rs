pub mod cache_store;
pub mod redis_store;

pub use cache_store::{CacheError, CacheStore, MemoryCacheStore};
pub use redis_store::RedisCacheStore;
