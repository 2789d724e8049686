//! Background refresh of the cached weather snapshot.
//!
//! `RefreshTask` holds no timer; the server's scheduler calls `run_once` on
//! an interval and tests call it directly.

use std::sync::Arc;

use crate::service::WeatherService;
use crate::types::WeatherSnapshot;

/// What a single refresh run did. Only ever logged by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated(WeatherSnapshot),
    SkippedNoApiKey,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RefreshTask {
    service: Arc<WeatherService>,
}

impl RefreshTask {
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    /// Fetch once and repopulate the cache.
    ///
    /// Never returns an error: failures are logged and the existing cache
    /// entry is left as it was.
    pub async fn run_once(&self) -> RefreshOutcome {
        tracing::info!("Starting weather data update for {}", self.service.location());

        if !self.service.has_api_key() {
            tracing::error!("Weather API key not configured, skipping update");
            return RefreshOutcome::SkippedNoApiKey;
        }

        match self.service.fetch_and_store().await {
            Ok(snapshot) => {
                tracing::info!(
                    "Weather data updated: {}",
                    snapshot.summary_or(self.service.location())
                );
                RefreshOutcome::Updated(snapshot)
            }
            Err(e) => {
                tracing::error!("Failed to update weather data: {}", e);
                RefreshOutcome::Failed(e.to_string())
            }
        }
    }
}
