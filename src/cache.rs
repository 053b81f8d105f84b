//! In-memory response caching with moka.
//!
//! Entries are keyed by the full request URI (path and query string) and
//! store the serialized JSON body. Unlike a single cache-wide TTL, every
//! entry carries the TTL of the route that produced it.
//!
//! Only successful responses are cached. Errors, including not-found, always
//! go back to the database.

use std::future::Future;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ApiError;

/// Cached response body with metadata.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub json: String,
    pub cached_at: chrono::DateTime<chrono::Utc>,
    pub ttl: Duration,
}

struct RouteTtl;

impl Expiry<String, CachedEntry> for RouteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub type ResponseCache = Cache<String, CachedEntry>;

pub fn new_cache(capacity: u64) -> ResponseCache {
    Cache::builder()
        .max_capacity(capacity)
        .expire_after(RouteTtl)
        .build()
}

/// Return the cached value for `key`, or run `compute` and cache its result
/// for `ttl`. With no cache, `compute` always runs.
pub async fn get_or_compute<T, F, Fut>(
    cache: Option<&ResponseCache>,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let Some(cache) = cache else {
        return compute().await;
    };

    if let Some(entry) = cache.get(key).await {
        match serde_json::from_str(&entry.json) {
            Ok(value) => {
                tracing::debug!(key = %key, cached_at = %entry.cached_at, "cache hit");
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(key = %key, err = ?e, "failed to deserialize cached entry");
            }
        }
    }

    tracing::debug!(key = %key, "cache miss, computing");
    let value = compute().await?;

    match serde_json::to_string(&value) {
        Ok(json) => {
            let entry = CachedEntry {
                json,
                cached_at: chrono::Utc::now(),
                ttl,
            };
            cache.insert(key.to_string(), entry).await;
        }
        Err(e) => {
            tracing::warn!(key = %key, err = ?e, "failed to serialize for cache");
        }
    }

    Ok(value)
}

/// Per-route TTLs.
pub mod ttl {
    use std::time::Duration;

    pub const LIST: Duration = Duration::from_secs(3600);
    pub const RANDOM: Duration = Duration::from_secs(10);
    pub const SEARCH: Duration = Duration::from_secs(600);
    pub const LENGTH: Duration = Duration::from_secs(600);
    pub const CATEGORY: Duration = Duration::from_secs(900);
    pub const STATS: Duration = Duration::from_secs(300);
    pub const BY_ID: Duration = Duration::from_secs(3600);
}
