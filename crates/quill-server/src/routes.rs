//! HTTP routes.

use std::convert::Infallible;
use std::sync::Arc;

use quill_weather::{WeatherReply, WeatherService};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// All API routes, with JSON error bodies for unmatched requests.
pub fn api(
    weather: Arc<WeatherService>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    current_weather(weather)
        .with(warp::trace::request())
        .recover(handle_rejection)
}

/// `GET /api/weather`
pub fn current_weather(
    weather: Arc<WeatherService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "weather")
        .and(warp::get())
        .and(with_weather(weather))
        .and_then(get_current_weather)
}

fn with_weather(
    weather: Arc<WeatherService>,
) -> impl Filter<Extract = (Arc<WeatherService>,), Error = Infallible> + Clone {
    warp::any().map(move || weather.clone())
}

async fn get_current_weather(weather: Arc<WeatherService>) -> Result<impl Reply, Infallible> {
    let reply = weather.current().await;
    let status = match reply {
        WeatherReply::Served { .. } => StatusCode::OK,
        WeatherReply::Unavailable { .. } => StatusCode::BAD_GATEWAY,
    };
    Ok(warp::reply::with_status(warp::reply::json(&reply), status))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
    };

    let body = serde_json::json!({ "message": message });
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_weather::{
        ManualClock, SnapshotStore, WeatherCache, WeatherProvider, WeatherSnapshot, CACHE_KEY,
        DEFAULT_CACHE_TTL,
    };
    use std::time::Duration;

    fn offline_service(api_key: Option<&str>) -> (Arc<WeatherService>, Arc<WeatherCache>) {
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(WeatherCache::with_clock(clock));
        // Port 9 is never served; any outbound call fails fast
        let provider = WeatherProvider::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let service = WeatherService::new(
            provider,
            cache.clone(),
            api_key.map(str::to_string),
            "Perth,Australia",
        );
        (Arc::new(service), cache)
    }

    #[tokio::test]
    async fn test_cached_weather_is_200() {
        let (service, cache) = offline_service(Some("test-key"));
        let payload = serde_json::json!({"current": {"temp_c": 22.5}});
        cache.put(CACHE_KEY, WeatherSnapshot::new(payload.clone()), DEFAULT_CACHE_TTL);

        let res = warp::test::request()
            .method("GET")
            .path("/api/weather")
            .reply(&api(service))
            .await;

        assert_eq!(res.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, serde_json::json!({"source": "cache", "data": payload}));
    }

    #[tokio::test]
    async fn test_unavailable_weather_is_502() {
        let (service, _) = offline_service(None);

        let res = warp::test::request()
            .path("/api/weather")
            .reply(&api(service))
            .await;

        assert_eq!(res.status(), 502);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["message"], "Failed to retrieve weather");
        assert_eq!(body["error"], "Weather API key not configured.");
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let (service, _) = offline_service(None);

        let res = warp::test::request()
            .path("/api/nope")
            .reply(&api(service))
            .await;

        assert_eq!(res.status(), 404);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["message"], "Not Found");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let (service, _) = offline_service(None);

        let res = warp::test::request()
            .method("POST")
            .path("/api/weather")
            .reply(&api(service))
            .await;

        assert_eq!(res.status(), 405);
    }
}
