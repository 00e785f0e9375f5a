pub mod cache;
pub mod weatherapi;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::ProxyError;
use cache::{city_key, WeatherCache};

pub const DEFAULT_CITY: &str = "Campinas";

/// Anything that can produce the current-conditions payload for a city.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str) -> Result<Value, ProxyError>;
}

#[derive(Debug, Clone)]
pub struct WeatherLookup {
    pub payload: Arc<Value>,
    pub cache_hit: bool,
}

pub struct WeatherService {
    cache: WeatherCache,
    source: Arc<dyn WeatherSource>,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    pub fn new(cache: WeatherCache, source: Arc<dyn WeatherSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            source,
            clock,
        }
    }

    /// Serves the city's weather from cache while fresh, otherwise fetches
    /// once from upstream and replaces the cached entry.
    ///
    /// There is no in-flight deduplication: two concurrent misses for the
    /// same city both go upstream and the last one to finish wins.
    pub async fn current(&self, city: &str) -> Result<WeatherLookup, ProxyError> {
        let key = city_key(city);
        let now = self.clock.now_ms();

        if let Some(payload) = self.cache.fresh(&key, now).await {
            tracing::debug!(city = %key, "weather cache hit");
            return Ok(WeatherLookup {
                payload,
                cache_hit: true,
            });
        }

        tracing::info!(city = %city, "fetching current weather from upstream");
        let payload = Arc::new(self.source.current(city).await?);
        self.cache.store(key, now, payload.clone()).await;

        Ok(WeatherLookup {
            payload,
            cache_hit: false,
        })
    }

    #[cfg(test)]
    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }
}

/// Picks the city from the `q`/`Q` query values: the first non-empty one,
/// else the default, trimmed afterwards.
pub fn resolve_city(q: Option<&str>, q_upper: Option<&str>) -> String {
    q.filter(|v| !v.is_empty())
        .or(q_upper.filter(|v| !v.is_empty()))
        .unwrap_or(DEFAULT_CITY)
        .trim()
        .to_string()
}
