//! Redis-backed cache store, shared between processes.

use super::CacheStore;
use crate::error::AstroError;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::fmt;

/// Uses a `ConnectionManager` for automatic reconnection.
#[derive(Clone)]
pub struct RedisStore {
    conn_manager: ConnectionManager,
    redis_url: String, // Store for debug purposes
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("redis_url", &self.redis_url)
            .field("conn_manager", &"<ConnectionManager instance>")
            .finish()
    }
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AstroError> {
        info!("Initializing Redis connection manager for URL: {}", redis_url);
        let client = redis::Client::open(redis_url)?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis ConnectionManager: {}", e);
            AstroError::CacheError(format!("Failed to create Redis ConnectionManager: {}", e))
        })?;
        info!("Redis ConnectionManager initialized successfully.");
        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
        })
    }
}

/// Escapes glob metacharacters so a key prefix matches literally in SCAN.
fn scan_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AstroError> {
        debug!("Attempting to GET cache for key: {}", key);
        let mut conn = self.conn_manager.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("Redis GET error for key {}: {}", key, e);
                Err(AstroError::CacheError(format!("Redis GET error for key {}: {}", key, e)))
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), AstroError> {
        let mut conn = self.conn_manager.clone();
        match conn.set_ex::<_, _, ()>(key, value, ttl_secs).await {
            Ok(_) => {
                debug!("Cache SETEX success for key: {} with TTL: {}s", key, ttl_secs);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to SETEX key '{}' in Redis: {}", key, e);
                Err(e.into())
            }
        }
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, AstroError> {
        let pattern = scan_pattern(prefix);
        let mut conn = self.conn_manager.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter: redis::AsyncIter<String> = conn.scan_match(&pattern).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }
        if keys.is_empty() {
            debug!("No Redis keys matched {}", pattern);
            return Ok(0);
        }
        let mut conn = self.conn_manager.clone();
        let removed: usize = conn.del(&keys).await.map_err(|e| {
            error!("Redis DEL error for pattern {}: {}", pattern, e);
            AstroError::CacheError(format!("Redis DEL error: {}", e))
        })?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_pattern_escapes_glob_characters() {
        assert_eq!(scan_pattern("astro_almanac_"), "astro_almanac_*");
        assert_eq!(scan_pattern("a*b?[c]"), "a\\*b\\?\\[c\\]*");
    }
}
