//! WeatherAPI.com current-conditions client.

use quill_core::{ReqwestErrorExt, WeatherConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::types::{WeatherError, WeatherSnapshot};

const CURRENT_PATH: &str = "/v1/current.json";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current conditions for `location`.
    ///
    /// One request, no retries. Any non-2xx status becomes `WeatherError::Api`
    /// carrying the response body; transport failures and timeouts become
    /// `WeatherError::Network`.
    #[instrument(skip(self, api_key), level = "debug")]
    pub async fn fetch_current(
        &self,
        api_key: &str,
        location: &str,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}{}", self.base_url, CURRENT_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key), ("q", location), ("aqi", "no")])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Weather API returned an error status");
            return Err(WeatherError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let payload: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(WeatherSnapshot::new(payload))
    }
}
