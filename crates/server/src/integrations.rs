//! Weather and news proxies
//!
//! Thin pass-throughs to OpenWeatherMap and NewsAPI so API keys stay on the
//! server. Upstream JSON is returned unchanged.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::metrics::{record_error, record_request};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// `GET /api/weather?lat&lon`: 5-day forecast in metric units
pub async fn weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    record_request("weather");
    let integrations = &state.config.integrations;

    let api_key = integrations.weather_api_key.as_deref().ok_or_else(|| {
        ApiError::service_unavailable("not_configured", "Weather API key not configured")
    })?;

    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(ApiError::bad_request("Latitude and longitude are required")),
    };

    let url = format!(
        "{}/forecast",
        integrations.weather_endpoint.trim_end_matches('/')
    );
    let lat = lat.to_string();
    let lon = lon.to_string();
    let params = [
        ("lat", lat.as_str()),
        ("lon", lon.as_str()),
        ("appid", api_key),
        ("units", "metric"),
    ];

    fetch_json(&state.http, &url, &params, "weather", "Failed to fetch weather data")
        .await
        .map(Json)
}

/// `GET /api/news`: latest articles on agricultural schemes
pub async fn news(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    record_request("news");
    let integrations = &state.config.integrations;

    let api_key = integrations.news_api_key.as_deref().ok_or_else(|| {
        ApiError::service_unavailable("not_configured", "Agri News API key not configured")
    })?;

    let url = format!(
        "{}/everything",
        integrations.news_endpoint.trim_end_matches('/')
    );
    let page_size = integrations.news_page_size.to_string();
    let params = [
        ("q", integrations.news_query.as_str()),
        ("language", "en"),
        ("sortBy", "publishedAt"),
        ("pageSize", page_size.as_str()),
        ("apiKey", api_key),
    ];

    fetch_json(&state.http, &url, &params, "news", "Failed to fetch news")
        .await
        .map(Json)
}

/// GET `url` and decode the JSON body
///
/// Any failure becomes a 502 carrying `failure_message`; the logged error has
/// its URL stripped, since the query string carries the API key.
async fn fetch_json(
    client: &reqwest::Client,
    url: &str,
    params: &[(&str, &str)],
    upstream: &'static str,
    failure_message: &'static str,
) -> Result<serde_json::Value, ApiError> {
    let result = async {
        client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await
    }
    .await;

    result.map_err(|e: reqwest::Error| {
        record_error("upstream");
        let e = e.without_url();
        tracing::warn!(upstream, status = ?e.status(), error = %e, "Upstream request failed");
        ApiError::bad_gateway(failure_message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let client = reqwest::Client::new();
        let err = fetch_json(
            &client,
            "http://127.0.0.1:1/forecast",
            &[("appid", "secret-key")],
            "weather",
            "Failed to fetch weather data",
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, axum::http::StatusCode::BAD_GATEWAY);
        assert_eq!(err.code, "upstream_error");
        assert_eq!(err.message, "Failed to fetch weather data");
        assert!(!err.message.contains("secret-key"));
    }
}
