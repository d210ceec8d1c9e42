//! HTTP Endpoints
//!
//! REST API for the assistant.

use axum::{
    error_handling::HandleErrorLayer,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    BoxError, Json, Router,
};
use std::time::Duration;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::chat;
use crate::error::ApiError;
use crate::integrations::{news, weather};
use crate::metrics::{metrics_handler, record_error, record_request};
use crate::state::AppState;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let body_limit = server.max_upload_bytes;
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/chat", post(chat))
        .route("/api/audio/:filename", get(serve_audio))
        .route("/api/weather", get(weather))
        .route("/api/news", get(news))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(CompressionLayer::new())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Render middleware failures in the same JSON shape as handler errors
async fn handle_middleware_error(err: BoxError) -> ApiError {
    let request_id = uuid::Uuid::new_v4().to_string();
    if err.is::<Elapsed>() {
        record_error("timeout");
        tracing::error!(request_id = %request_id, "Request exceeded the server timeout");
        return ApiError::new(
            StatusCode::GATEWAY_TIMEOUT,
            "timeout",
            "The request took too long to process, please try again",
        )
        .with_request_id(request_id);
    }

    tracing::error!(request_id = %request_id, error = %err, "Unhandled middleware error");
    ApiError::internal().with_request_id(request_id)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer
/// - If no origin parses, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let mut parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", DEFAULT_CORS_ORIGIN);
        parsed_origins.push(HeaderValue::from_static(DEFAULT_CORS_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "AgroSaathi Backend is running" }))
}

/// Health check with per-component status
///
/// Unusable staging directories make the instance unhealthy; missing
/// credentials or disabled optional gateways only mark it degraded.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    record_request("health");
    let config = &state.config;
    let staging = state.staging();

    let staging_ok = staging.upload_dir().is_dir() && staging.output_dir().is_dir();
    let llm_key = config.llm.api_key.is_some();
    let stt_key = config.stt.api_key.is_some();
    let retrieval = state.orchestrator.has_retriever();
    let classifier = state.orchestrator.has_classifier();

    let status_of = |ok: bool, missing: &'static str| if ok { "ok" } else { missing };

    let checks = serde_json::json!({
        "staging": {
            "status": status_of(staging_ok, "error"),
            "upload_dir": staging.upload_dir().display().to_string(),
            "output_dir": staging.output_dir().display().to_string(),
        },
        "llm": {
            "status": status_of(llm_key, "missing_credentials"),
            "provider": config.llm.provider,
            "model": config.llm.model,
        },
        "stt": {
            "status": status_of(stt_key, "missing_credentials"),
            "model": config.stt.model,
        },
        "retrieval": { "status": status_of(retrieval, "disabled") },
        "classifier": { "status": status_of(classifier, "disabled") },
        "chat_slots_available": state.available_chat_permits(),
    });

    let all_ok = staging_ok && llm_key && stt_key && retrieval && classifier;
    let (status_code, status) = match (staging_ok, all_ok) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        (true, true) => (StatusCode::OK, "healthy"),
        (true, false) => (StatusCode::OK, "degraded"),
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "checks": checks
        })),
    )
}

fn audio_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Serve a previously synthesized answer
async fn serve_audio(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    record_request("audio");

    let path = state
        .staging()
        .resolve_output(&filename)
        .ok_or_else(|| ApiError::not_found("Audio file not found"))?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::warn!(file = %filename, error = %e, "Failed to read audio file");
        ApiError::not_found("Audio file not found")
    })?;

    Ok((
        [(header::CONTENT_TYPE, audio_content_type(&filename))],
        bytes,
    ))
}
