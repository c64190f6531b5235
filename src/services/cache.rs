use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// In-memory response cache
///
/// Holds serialized provider results for a short TTL so repeated lookups for
/// the same area don't hit both providers again.
#[derive(Clone)]
pub struct CacheManager {
    cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache, ttl_secs }
    }

    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.cache.get(key).await {
            Some(bytes) => {
                tracing::trace!("Cache hit: {}", key);
                Ok(serde_json::from_slice(&bytes)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::CacheMiss(key.to_string()))
            }
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.cache.insert(key.to_string(), bytes).await;

        tracing::trace!("Cache set: {} (ttl {}s)", key, self.ttl_secs);
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Coordinates are rounded to 4 decimals (about 11 m)
    pub fn nearby(lat: f64, lng: f64, radius_m: u32) -> String {
        format!("nearby:{:.4}:{:.4}:{}", lat, lng, radius_m)
    }

    pub fn search(query: &str, lat: Option<f64>, lng: Option<f64>) -> String {
        match (lat, lng) {
            (Some(lat), Some(lng)) => format!("search:{}:{:.4}:{:.4}", query.to_lowercase(), lat, lng),
            _ => format!("search:{}", query.to_lowercase()),
        }
    }
}
