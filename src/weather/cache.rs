use moka::future::Cache;
use serde_json::Value;
use std::sync::Arc;

/// How long a fetched payload is served without asking upstream again.
pub const WEATHER_TTL_MS: i64 = 120_000;

#[derive(Clone, Debug)]
pub struct WeatherCacheEntry {
    pub fetched_at_ms: i64,
    pub payload: Arc<Value>,
}

/// Per-city weather payloads, keyed by the normalized city name.
///
/// Entries are replaced on refresh and never evicted; moka only provides
/// the concurrent map here; freshness is judged against `fetched_at_ms`.
pub struct WeatherCache {
    entries: Cache<String, WeatherCacheEntry>,
    ttl_ms: i64,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::with_ttl(WEATHER_TTL_MS)
    }

    pub fn with_ttl(ttl_ms: i64) -> Self {
        Self {
            entries: Cache::builder().build(),
            ttl_ms,
        }
    }

    /// Returns the cached payload if it is younger than the TTL at `now_ms`.
    pub async fn fresh(&self, key: &str, now_ms: i64) -> Option<Arc<Value>> {
        let entry = self.entries.get(key).await?;
        if now_ms - entry.fetched_at_ms < self.ttl_ms {
            Some(entry.payload)
        } else {
            None
        }
    }

    pub async fn store(&self, key: String, fetched_at_ms: i64, payload: Arc<Value>) {
        self.entries
            .insert(
                key,
                WeatherCacheEntry {
                    fetched_at_ms,
                    payload,
                },
            )
            .await;
    }

    #[cfg(test)]
    pub async fn entry(&self, key: &str) -> Option<WeatherCacheEntry> {
        self.entries.get(key).await
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key for a (already trimmed) city name.
pub fn city_key(city: &str) -> String {
    city.to_lowercase()
}
