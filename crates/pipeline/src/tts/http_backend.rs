//! Neural voice synthesis over HTTP
//!
//! The synthesis sidecar wraps an edge-style neural TTS service. Voice names
//! come from the language registry, so the sidecar never maps languages itself.

use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

use agrosaathi_config::{
    constants::{endpoints, timeouts},
    TtsSettings,
};
use agrosaathi_core::{Language, SynthesizedAudio, TextToSpeech};

use crate::staging::sanitize_extension;
use crate::PipelineError;

/// Synthesis gateway configuration
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Sidecar base URL
    pub endpoint: String,
    /// Audio container (`mp3`, `wav`, `ogg`)
    pub format: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::TTS_DEFAULT.to_string(),
            format: "mp3".to_string(),
            timeout: Duration::from_secs(timeouts::TTS_SECS),
        }
    }
}

impl From<&TtsSettings> for SynthesizerConfig {
    fn from(settings: &TtsSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            format: settings.format.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
    language: &'a str,
    format: &'a str,
}

/// HTTP speech synthesizer
pub struct HttpSpeechSynthesizer {
    config: SynthesizerConfig,
    client: reqwest::Client,
}

impl HttpSpeechSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Tts(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn synthesize_url(&self) -> String {
        format!("{}/synthesize", self.config.endpoint.trim_end_matches('/'))
    }

    async fn request(&self, text: &str, language: Language) -> Result<Vec<u8>, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::Tts("Nothing to synthesize".to_string()));
        }

        let body = SynthesisRequest {
            text,
            voice: language.edge_voice(),
            language: language.code(),
            format: &self.config.format,
        };

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Tts(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::Tts(format!("HTTP {}: {}", status, detail)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Tts(format!("Failed to read audio: {}", e)))?;
        if bytes.is_empty() {
            return Err(PipelineError::Tts("Empty audio returned".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TextToSpeech for HttpSpeechSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
    ) -> agrosaathi_core::Result<SynthesizedAudio> {
        let start = Instant::now();
        let bytes = self.request(text, language).await?;

        tracing::debug!(
            language = language.code(),
            voice = language.edge_voice(),
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Synthesis complete"
        );

        Ok(SynthesizedAudio {
            bytes,
            extension: sanitize_extension(&self.config.format),
        })
    }

    fn model_name(&self) -> &str {
        "edge-neural-tts"
    }
}
