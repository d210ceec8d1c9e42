//! Whisper transcription over HTTP
//!
//! Talks to any OpenAI-compatible `/audio/transcriptions` endpoint
//! (Groq by default) with `response_format=text`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::{Duration, Instant};

use agrosaathi_config::{
    constants::{endpoints, models, timeouts},
    SttSettings,
};
use agrosaathi_core::{Language, SpeechToText};

use crate::PipelineError;

/// Whisper gateway configuration
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// API base URL, e.g. `https://api.groq.com/openai/v1`
    pub endpoint: String,
    /// Bearer token
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::GROQ_DEFAULT.to_string(),
            api_key: None,
            model: models::WHISPER.to_string(),
            timeout: Duration::from_secs(timeouts::STT_SECS),
        }
    }
}

impl From<&SttSettings> for WhisperConfig {
    fn from(settings: &SttSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Whisper HTTP transcription backend
pub struct WhisperHttpStt {
    config: WhisperConfig,
    client: reqwest::Client,
}

impl WhisperHttpStt {
    pub fn new(config: WhisperConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Stt(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            tracing::warn!(
                endpoint = %config.endpoint,
                "No STT API key configured; transcription requests will likely be rejected"
            );
        }

        Ok(Self { config, client })
    }

    fn transcriptions_url(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    async fn request(&self, audio: &Path, language: Language) -> Result<String, PipelineError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| PipelineError::Stt(format!("Failed to read audio: {}", e)))?;
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", self.config.model.clone())
            .text("language", language.whisper_code())
            .text("response_format", "text");

        let mut request = self.client.post(self.transcriptions_url()).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::Stt(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Stt(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(PipelineError::Stt(format!("HTTP {}: {}", status, body)));
        }

        let text = body.trim();
        if text.is_empty() {
            return Err(PipelineError::Stt("Empty transcription".to_string()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl SpeechToText for WhisperHttpStt {
    async fn transcribe(&self, audio: &Path, language: Language) -> agrosaathi_core::Result<String> {
        let start = Instant::now();
        let text = self.request(audio, language).await?;

        tracing::debug!(
            language = language.code(),
            chars = text.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Transcription complete"
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = SttSettings {
            endpoint: "http://localhost:9000/v1/".to_string(),
            api_key: Some("k".to_string()),
            model: "whisper-large-v3-turbo".to_string(),
            timeout_secs: 5,
        };
        let config = WhisperConfig::from(&settings);
        assert_eq!(config.timeout, Duration::from_secs(5));

        let stt = WhisperHttpStt::new(config).unwrap();
        assert_eq!(
            stt.transcriptions_url(),
            "http://localhost:9000/v1/audio/transcriptions"
        );
        assert_eq!(stt.model_name(), "whisper-large-v3-turbo");
    }

    #[tokio::test]
    async fn test_missing_file_is_transcription_error() {
        let stt = WhisperHttpStt::new(WhisperConfig::default()).unwrap();
        let err = stt
            .transcribe(Path::new("/nonexistent/audio.wav"), Language::Hindi)
            .await
            .unwrap_err();
        assert!(matches!(err, agrosaathi_core::Error::Transcription(_)));
    }
}
