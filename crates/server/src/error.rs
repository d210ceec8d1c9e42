//! HTTP error responses
//!
//! Every failure leaves the server as `{"error", "code", "request_id"}`.
//! Provider error text is logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use agrosaathi_pipeline::PipelineError;

/// Error returned by handlers
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
    pub request_id: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            request_id: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn service_unavailable(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, code, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "upstream_error", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An internal error occurred",
        )
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl From<&PipelineError> for ApiError {
    fn from(err: &PipelineError) -> Self {
        let status = match err {
            PipelineError::MissingInput => StatusCode::BAD_REQUEST,
            PipelineError::Transcription(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.kind(), err.public_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
            request_id: self.request_id.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_mapping() {
        let err = ApiError::from(&PipelineError::MissingInput);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No audio or text input provided");
        assert_eq!(err.code, "missing_input");

        let err = ApiError::from(&PipelineError::Transcription("silence".into()));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);

        let err = ApiError::from(&PipelineError::Generation("API key sk-live-123 rejected".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("sk-live-123"));
        assert_eq!(err.code, "generation");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::bad_gateway("Failed to fetch weather data")
            .with_request_id("abc")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Failed to fetch weather data");
        assert_eq!(json["code"], "upstream_error");
        assert_eq!(json["request_id"], "abc");
    }
}
