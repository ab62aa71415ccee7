//! Key-value caching of fetched astronomy data.

pub mod key;
pub mod memory;
pub mod redis_store;

pub use key::{build_cache_key, CACHE_NAMESPACE};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::config::{CacheBackend, Config};
use crate::error::AstroError;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Key-value storage with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AstroError>;

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), AstroError>;

    /// Removes every entry whose key starts with `prefix`, returning how many went.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, AstroError>;
}

/// Reads and decodes a JSON entry. An undecodable entry counts as a miss.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &str,
) -> Result<Option<T>, AstroError> {
    match store.get(key).await? {
        Some(value_str) => match serde_json::from_str::<T>(&value_str) {
            Ok(value) => {
                debug!("Cache HIT for key: {}", key);
                Ok(Some(value))
            }
            Err(e) => {
                warn!("Failed to deserialize cached JSON for key {}: {}", key, e);
                Ok(None)
            }
        },
        None => {
            debug!("Cache MISS for key: {}", key);
            Ok(None)
        }
    }
}

pub async fn set_json<T: Serialize>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl_secs: u64,
) -> Result<(), AstroError> {
    let value_str = serde_json::to_string(value)
        .map_err(|e| AstroError::CacheError(format!("failed to serialize entry {}: {}", key, e)))?;
    store.set(key, &value_str, ttl_secs).await
}

/// Opens the store selected by `ASTRO_CACHE_BACKEND`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn CacheStore>, AstroError> {
    match config.cache_backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        CacheBackend::Redis => Ok(Arc::new(RedisStore::connect(&config.redis_url).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_round_trip_and_corrupt_entry() {
        let store = MemoryStore::new();
        set_json(&store, "astro_almanac_x", &vec![1u32, 2, 3], 60).await.unwrap();
        let back: Option<Vec<u32>> = get_json(&store, "astro_almanac_x").await.unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));

        store.set("astro_almanac_bad", "{oops", 60).await.unwrap();
        let bad: Option<Vec<u32>> = get_json(&store, "astro_almanac_bad").await.unwrap();
        assert_eq!(bad, None);
    }

    #[tokio::test]
    async fn test_unserializable_value_is_cache_error() {
        let store = MemoryStore::new();
        let mut value = std::collections::HashMap::new();
        value.insert((1u8, 2u8), "tuple keys are not JSON object keys");

        let err = set_json(&store, "astro_almanac_tuple", &value, 60).await.unwrap_err();
        assert!(matches!(err, AstroError::CacheError(_)));
        assert!(store.is_empty());
    }
}
