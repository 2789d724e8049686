//! HTTP server and background jobs for Quill.

pub mod routes;
pub mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use quill_core::{AppError, Config};
use quill_weather::{RefreshTask, SnapshotStore, WeatherCache, WeatherService};
use tokio_util::sync::CancellationToken;

pub use scheduler::{run_isolated, spawn_refresh_loop};

/// Build the weather service with a fresh in-memory cache.
pub fn build_weather_service(config: &Config) -> Result<Arc<WeatherService>, AppError> {
    let cache: Arc<dyn SnapshotStore> = Arc::new(WeatherCache::new());
    let service = WeatherService::from_config(&config.weather, cache)
        .map_err(|e| AppError::Server(format!("Failed to build weather client: {}", e)))?;
    Ok(Arc::new(service))
}

/// Serve the API until `shutdown` is cancelled.
///
/// The weather refresh job shares the same cache as the request handlers and
/// stops on the same token.
pub async fn serve(config: &Config, shutdown: CancellationToken) -> Result<(), AppError> {
    let addr = config.server.socket_addr()?;
    let weather = build_weather_service(config)?;

    if !weather.has_api_key() {
        tracing::warn!("Weather API key not configured; /api/weather will rely on cached data");
    }

    let refresh = if config.weather.refresh_minutes > 0 {
        let period = Duration::from_secs(u64::from(config.weather.refresh_minutes) * 60);
        Some(spawn_refresh_loop(
            RefreshTask::new(weather.clone()),
            period,
            shutdown.clone(),
        ))
    } else {
        tracing::info!("Weather refresh job disabled");
        None
    };

    let signal = {
        let shutdown = shutdown.clone();
        async move { shutdown.cancelled().await }
    };
    let (bound, server) = warp::serve(routes::api(weather))
        .try_bind_with_graceful_shutdown(addr, signal)
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Quill API listening on http://{}", bound);
    server.await;

    // The server only returns once `shutdown` has fired, so the loop is already stopping
    if let Some(handle) = refresh {
        if let Err(e) = handle.await {
            tracing::error!("Weather refresh scheduler ended abnormally: {}", e);
        }
    }

    tracing::info!("Quill API stopped");
    Ok(())
}
