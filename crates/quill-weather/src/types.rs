use quill_core::NetworkError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message returned to clients when no weather data can be served.
pub const UNAVAILABLE_MESSAGE: &str = "Failed to retrieve weather";

/// A single weather payload as returned by the provider.
///
/// The payload is kept verbatim; accessors only peek at a few fields for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherSnapshot(Value);

impl WeatherSnapshot {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    /// `current.temp_c`, if present and numeric
    pub fn temperature_c(&self) -> Option<f64> {
        self.0.pointer("/current/temp_c").and_then(Value::as_f64)
    }

    /// `current.condition.text`
    pub fn condition_text(&self) -> Option<&str> {
        self.0
            .pointer("/current/condition/text")
            .and_then(Value::as_str)
    }

    /// `location.name`
    pub fn location_name(&self) -> Option<&str> {
        self.0.pointer("/location/name").and_then(Value::as_str)
    }

    /// One-line description for logs, e.g. `Perth: 22.5°C, Sunny`.
    pub fn summary(&self) -> String {
        self.summary_or("N/A")
    }

    /// Like [`summary`](Self::summary), naming `location` when the payload has
    /// no `location.name`.
    pub fn summary_or(&self, location: &str) -> String {
        let temp = self
            .temperature_c()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "{}: {}°C, {}",
            self.location_name().unwrap_or(location),
            temp,
            self.condition_text().unwrap_or("N/A")
        )
    }
}

/// Where a served snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    /// Fresh cache hit
    Cache,
    /// Fetched from the provider during this request
    Api,
    /// Provider failed; an expired cache entry was served instead
    CacheFallback,
}

/// Body of a `GET /api/weather` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherReply {
    Served {
        source: WeatherSource,
        data: WeatherSnapshot,
    },
    Unavailable {
        message: String,
        error: String,
    },
}

impl WeatherReply {
    pub fn served(source: WeatherSource, data: WeatherSnapshot) -> Self {
        Self::Served { source, data }
    }

    pub fn unavailable(error: &WeatherError) -> Self {
        Self::Unavailable {
            message: UNAVAILABLE_MESSAGE.to_string(),
            error: error.to_string(),
        }
    }

    pub fn source(&self) -> Option<WeatherSource> {
        match self {
            Self::Served { source, .. } => Some(*source),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            Self::Served { data, .. } => Some(data),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key not configured.")]
    MissingApiKey,
    #[error("External API failed: {body}")]
    Api { status: u16, body: String },
    #[error("{0}")]
    Network(#[from] NetworkError),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "Weather service is not configured.",
            Self::Api { status, .. } if *status == 401 || *status == 403 => {
                "Weather API key was rejected."
            }
            Self::Api { .. } => "Weather service error. Please try again.",
            Self::Network(e) => e.user_message(),
            Self::Parse(_) => "Weather service returned unreadable data.",
        }
    }

    /// True for failures caused by local configuration rather than the provider.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn perth() -> WeatherSnapshot {
        WeatherSnapshot::new(json!({
            "location": { "name": "Perth" },
            "current": { "temp_c": 22.5, "condition": { "text": "Sunny" } }
        }))
    }

    #[test]
    fn test_snapshot_field_extraction() {
        let snapshot = perth();
        assert_eq!(snapshot.temperature_c(), Some(22.5));
        assert_eq!(snapshot.condition_text(), Some("Sunny"));
        assert_eq!(snapshot.location_name(), Some("Perth"));
    }

    #[test]
    fn test_summary() {
        assert_eq!(perth().summary(), "Perth: 22.5°C, Sunny");
    }

    #[test]
    fn test_summary_with_missing_fields() {
        let snapshot = WeatherSnapshot::new(json!({ "current": {} }));
        assert_eq!(snapshot.summary(), "N/A: N/A°C, N/A");
    }

    #[test]
    fn test_summary_falls_back_to_configured_location() {
        let snapshot = WeatherSnapshot::new(json!({
            "current": { "temp_c": 22.5, "condition": { "text": "Sunny" } }
        }));
        assert_eq!(
            snapshot.summary_or("Perth,Australia"),
            "Perth,Australia: 22.5°C, Sunny"
        );
        assert_eq!(perth().summary_or("Perth,Australia"), "Perth: 22.5°C, Sunny");
    }

    #[test]
    fn test_snapshot_serializes_verbatim() {
        let payload = json!({ "current": { "temp_c": 22.5, "condition": { "text": "Sunny" } } });
        let snapshot = WeatherSnapshot::new(payload.clone());
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), payload);
    }

    #[test]
    fn test_source_names() {
        assert_eq!(serde_json::to_value(WeatherSource::Cache).unwrap(), json!("cache"));
        assert_eq!(serde_json::to_value(WeatherSource::Api).unwrap(), json!("api"));
        assert_eq!(
            serde_json::to_value(WeatherSource::CacheFallback).unwrap(),
            json!("cache_fallback")
        );
    }

    #[test]
    fn test_served_reply_shape() {
        let reply = WeatherReply::served(WeatherSource::Api, perth());
        let body = serde_json::to_value(&reply).unwrap();
        assert_eq!(body["source"], "api");
        assert_eq!(body["data"]["current"]["temp_c"], 22.5);
        assert_eq!(reply.source(), Some(WeatherSource::Api));
    }

    #[test]
    fn test_unavailable_reply_shape() {
        let reply = WeatherReply::unavailable(&WeatherError::MissingApiKey);
        let body = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            body,
            json!({
                "message": "Failed to retrieve weather",
                "error": "Weather API key not configured."
            })
        );
        assert!(reply.source().is_none());
        assert!(reply.snapshot().is_none());
    }

    #[test]
    fn test_api_error_carries_body() {
        let err = WeatherError::Api {
            status: 500,
            body: "upstream exploded".into(),
        };
        assert_eq!(err.to_string(), "External API failed: upstream exploded");
        assert!(!err.is_configuration());
        assert!(WeatherError::MissingApiKey.is_configuration());
    }

    #[test]
    fn test_rejected_key_message() {
        let err = WeatherError::Api {
            status: 401,
            body: "{}".into(),
        };
        assert_eq!(err.user_message(), "Weather API key was rejected.");
    }
}
