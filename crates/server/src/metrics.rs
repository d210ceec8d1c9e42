//! Observability Metrics
//!
//! Prometheus recorder and the `/metrics` endpoint.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use agrosaathi_pipeline::PipelineResult;

/// Global Prometheus handle
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics recorder
///
/// Safe to call more than once; later calls return the first handle.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Some(handle);
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let handle = METRICS_HANDLE.get_or_init(|| handle);
            register_default_metrics();
            Some(handle)
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            METRICS_HANDLE.get()
        },
    }
}

/// Get the global metrics handle
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Register default application metrics
fn register_default_metrics() {
    for endpoint in ["chat", "audio", "weather", "news", "health"] {
        counter!("agrosaathi_requests_total", "endpoint" => endpoint).absolute(0);
    }

    for kind in ["missing_input", "transcription", "generation", "staging"] {
        counter!("agrosaathi_errors_total", "type" => kind).absolute(0);
    }

    for stage in [
        "transcription",
        "translation_in",
        "classification",
        "retrieval",
        "translation_out",
        "synthesis",
    ] {
        counter!("agrosaathi_degraded_stages_total", "stage" => stage).absolute(0);
    }
}

/// Record request to endpoint
pub fn record_request(endpoint: &'static str) {
    counter!("agrosaathi_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record error by type
pub fn record_error(error_type: &'static str) {
    counter!("agrosaathi_errors_total", "type" => error_type).increment(1);
}

/// Record a stage that fell back to its default
pub fn record_degraded_stage(stage: &'static str) {
    counter!("agrosaathi_degraded_stages_total", "stage" => stage).increment(1);
}

/// Record latency of one pipeline stage
pub fn record_stage_latency(stage: &'static str, duration_secs: f64) {
    histogram!("agrosaathi_stage_duration_seconds", "stage" => stage).record(duration_secs);
}

/// Record total pipeline latency
pub fn record_total_latency(duration_secs: f64) {
    histogram!("agrosaathi_total_latency_seconds").record(duration_secs);
}

/// Record everything a finished chat request reports
pub fn record_pipeline_result(result: &PipelineResult) {
    let timings = &result.timings;
    let stages = [
        ("transcription", timings.transcription_ms),
        ("classification", timings.classification_ms),
        ("translation_in", timings.translation_in_ms),
        ("retrieval", timings.retrieval_ms),
        ("generation", timings.generation_ms),
        ("translation_out", timings.translation_out_ms),
        ("synthesis", timings.synthesis_ms),
    ];
    for (stage, ms) in stages {
        if let Some(ms) = ms {
            record_stage_latency(stage, ms as f64 / 1000.0);
        }
    }
    record_total_latency(timings.total_ms as f64 / 1000.0);

    for &stage in &result.degraded_stages {
        record_degraded_stage(stage);
    }
}

/// Metrics endpoint handler
///
/// Returns Prometheus-formatted metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_helpers() {
        // No recorder installed here; these must still not panic
        record_request("chat");
        record_error("generation");
        record_degraded_stage("synthesis");
        record_stage_latency("retrieval", 0.02);
        record_total_latency(1.5);
    }
}
