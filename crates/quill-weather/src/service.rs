//! Read path for `GET /api/weather`.

use quill_core::WeatherConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheLookup, SnapshotStore};
use crate::provider::WeatherProvider;
use crate::types::{WeatherError, WeatherReply, WeatherSnapshot, WeatherSource};

/// Cache key for the current-conditions snapshot.
pub const CACHE_KEY: &str = "weather_perth_current";

/// Default freshness window for fetched snapshots.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Serves current weather from cache, the provider, or stale cache, in that order.
pub struct WeatherService {
    provider: WeatherProvider,
    cache: Arc<dyn SnapshotStore>,
    api_key: Option<String>,
    location: String,
    ttl: Duration,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("location", &self.location)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    pub fn new(
        provider: WeatherProvider,
        cache: Arc<dyn SnapshotStore>,
        api_key: Option<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            cache,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            location: location.into(),
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn from_config(
        config: &WeatherConfig,
        cache: Arc<dyn SnapshotStore>,
    ) -> Result<Self, WeatherError> {
        let provider = WeatherProvider::from_config(config)?;
        Ok(Self::new(
            provider,
            cache,
            config.api_key().map(str::to_string),
            config.location.clone(),
        )
        .with_ttl(Duration::from_secs(u64::from(config.cache_ttl_minutes) * 60)))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn cache(&self) -> &Arc<dyn SnapshotStore> {
        &self.cache
    }

    /// Resolve the current weather for a request.
    ///
    /// 1. Fresh cache entry: served as `cache`, no outbound call.
    /// 2. Otherwise fetch; on success the cache is overwritten and the result
    ///    served as `api`.
    /// 3. On failure, the entry read in step 1 (now expired) is served as
    ///    `cache_fallback` if there was one, else the reply is `Unavailable`.
    pub async fn current(&self) -> WeatherReply {
        let previous = match self.cache.lookup(CACHE_KEY) {
            CacheLookup::Fresh(snapshot) => {
                tracing::debug!("Serving weather from cache");
                return WeatherReply::served(WeatherSource::Cache, snapshot);
            }
            CacheLookup::Stale(entry) => Some(entry.value),
            CacheLookup::Miss => None,
        };

        match self.fetch_and_store().await {
            Ok(snapshot) => WeatherReply::served(WeatherSource::Api, snapshot),
            Err(e) => match previous {
                Some(snapshot) => {
                    tracing::warn!("Weather fetch failed, serving stale cache: {}", e);
                    WeatherReply::served(WeatherSource::CacheFallback, snapshot)
                }
                None => {
                    tracing::error!("Weather fetch failed with no cached data: {}", e);
                    WeatherReply::unavailable(&e)
                }
            },
        }
    }

    /// Fetch from the provider without touching the cache.
    pub async fn fetch(&self) -> Result<WeatherSnapshot, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        self.provider.fetch_current(api_key, &self.location).await
    }

    /// Fetch from the provider and overwrite the cache on success.
    ///
    /// The cache is not touched when the key is missing or the fetch fails.
    pub async fn fetch_and_store(&self) -> Result<WeatherSnapshot, WeatherError> {
        let snapshot = self.fetch().await?;
        self.cache.put(CACHE_KEY, snapshot.clone(), self.ttl);

        Ok(snapshot)
    }
}
