//! Chat endpoint
//!
//! `POST /api/chat` takes a multipart form:
//! - `language`: ISO code, default `en`
//! - `text`: typed query
//! - `audio`: recorded query
//! - `image`: crop photo
//! - `conversation_history`: JSON array of `{role, content}`

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use std::time::Instant;

use agrosaathi_core::{Language, Turn};
use agrosaathi_pipeline::{IncomingRequest, MediaPayload, PipelineResult};

use crate::error::ApiError;
use crate::metrics::{record_error, record_pipeline_result, record_request};
use crate::state::AppState;

/// Raw multipart fields
#[derive(Debug, Default)]
pub struct ChatForm {
    pub language: Option<String>,
    pub text: Option<String>,
    pub audio: Option<MediaPayload>,
    pub image: Option<MediaPayload>,
    pub conversation_history: Option<String>,
}

impl ChatForm {
    /// Read every known field; unknown fields are skipped
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = ChatForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "language" => form.language = Some(read_text(field).await?),
                "text" => form.text = Some(read_text(field).await?),
                "conversation_history" => form.conversation_history = Some(read_text(field).await?),
                "audio" => form.audio = Some(read_file(field, "audio.webm").await?),
                "image" => form.image = Some(read_file(field, "image.jpg").await?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Convert into a pipeline request
    ///
    /// Malformed conversation history is rejected rather than dropped.
    pub fn into_request(self) -> Result<IncomingRequest, ApiError> {
        let language = Language::resolve(self.language.as_deref().unwrap_or("en"));

        let history = match self.conversation_history.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<Turn>>(raw).map_err(|e| {
                ApiError::bad_request(format!("Invalid conversation_history: {}", e))
            })?,
        };

        let mut request = IncomingRequest::new(language).with_history(history);
        request.text = self.text;
        request.audio = self.audio;
        request.image = self.image;
        Ok(request)
    }
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid form field: {}", e)))
}

async fn read_file(field: Field<'_>, default_name: &str) -> Result<MediaPayload, ApiError> {
    let filename = field
        .file_name()
        .filter(|n| !n.is_empty())
        .unwrap_or(default_name)
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid file upload: {}", e)))?;
    Ok(MediaPayload::new(bytes.to_vec(), filename))
}

/// Chat endpoint
pub async fn chat(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PipelineResult>, ApiError> {
    record_request("chat");
    let request_id = uuid::Uuid::new_v4().to_string();

    let request = ChatForm::from_multipart(multipart)
        .await
        .and_then(ChatForm::into_request)
        .map_err(|e| e.with_request_id(request_id.clone()))?;

    let _permit = state
        .acquire_chat_permit()
        .await
        .map_err(|e| e.with_request_id(request_id.clone()))?;

    let start = Instant::now();
    let language = request.language;
    match state.orchestrator.handle(request).await {
        Ok(result) => {
            record_pipeline_result(&result);
            tracing::info!(
                request_id = %request_id,
                language = language.code(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                audio = result.audio_url.is_some(),
                "Chat request served"
            );
            Ok(Json(result))
        },
        Err(e) => {
            record_error(e.kind());
            if e.is_client_error() {
                tracing::warn!(request_id = %request_id, error = %e, "Chat request rejected");
            } else {
                tracing::error!(request_id = %request_id, error = %e, "Chat request failed");
            }
            Err(ApiError::from(&e).with_request_id(request_id))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrosaathi_core::TurnRole;

    #[test]
    fn test_form_defaults_to_english() {
        let request = ChatForm {
            text: Some("hello".to_string()),
            ..Default::default()
        }
        .into_request()
        .unwrap();
        assert_eq!(request.language, Language::English);
        assert!(request.history.is_empty());
    }

    #[test]
    fn test_form_parses_history_and_legacy_codes() {
        let request = ChatForm {
            language: Some("ka".to_string()),
            conversation_history: Some(
                r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"Namaste"}]"#
                    .to_string(),
            ),
            ..Default::default()
        }
        .into_request()
        .unwrap();
        assert_eq!(request.language, Language::Kannada);
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[1].role, TurnRole::Assistant);
    }

    #[test]
    fn test_form_rejects_bad_history() {
        let err = ChatForm {
            conversation_history: Some("not json".to_string()),
            ..Default::default()
        }
        .into_request()
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_language_is_english() {
        let request = ChatForm {
            language: Some("xx".to_string()),
            ..Default::default()
        }
        .into_request()
        .unwrap();
        assert_eq!(request.language, Language::English);
    }
}
