//! Disease classifier over HTTP
//!
//! The sidecar hosts a MobileNetV2 model trained on plant-disease classes and
//! answers `POST /classify` with `{predicted_class, confidence}` or `{error}`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

use agrosaathi_config::{
    constants::{endpoints, timeouts},
    VisionSettings,
};
use agrosaathi_core::{Classification, ImageClassifier};

use crate::PipelineError;

/// Classifier gateway configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Sidecar base URL
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::VISION_DEFAULT.to_string(),
            timeout: Duration::from_secs(timeouts::VISION_SECS),
        }
    }
}

impl From<&VisionSettings> for ClassifierConfig {
    fn from(settings: &VisionSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Classifier response, either a prediction or an error
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    predicted_class: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    error: Option<String>,
}

impl ClassifyResponse {
    fn into_classification(self) -> Result<Classification, PipelineError> {
        if let Some(error) = self.error {
            return Err(PipelineError::Vision(error));
        }
        match self.predicted_class {
            Some(label) if !label.trim().is_empty() => Ok(Classification::new(
                label.trim(),
                self.confidence.unwrap_or(0.0),
            )),
            _ => Err(PipelineError::Vision(
                "Classifier returned no label".to_string(),
            )),
        }
    }
}

/// HTTP image classifier
pub struct HttpImageClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl HttpImageClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Vision(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn classify_url(&self) -> String {
        format!("{}/classify", self.config.endpoint.trim_end_matches('/'))
    }

    async fn request(&self, image: &Path) -> Result<Classification, PipelineError> {
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|e| PipelineError::Vision(format!("Failed to read image: {}", e)))?;
        let file_name = image
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.jpg")
            .to_string();

        let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.classify_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Vision(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Vision(format!("Failed to read response: {}", e)))?;

        // Error payloads may arrive with 4xx/5xx status, so try to parse first
        match serde_json::from_str::<ClassifyResponse>(&body) {
            Ok(parsed) => parsed.into_classification(),
            Err(_) if !status.is_success() => {
                Err(PipelineError::Vision(format!("HTTP {}: {}", status, body)))
            },
            Err(e) => Err(PipelineError::Vision(format!("Invalid response: {}", e))),
        }
    }
}

#[async_trait]
impl ImageClassifier for HttpImageClassifier {
    async fn classify(&self, image: &Path) -> agrosaathi_core::Result<Classification> {
        let start = Instant::now();
        let result = self.request(image).await?;

        tracing::debug!(
            label = %result.label,
            confidence = result.confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Classification complete"
        );
        Ok(result)
    }

    fn model_name(&self) -> &str {
        "mobilenet_v2-plant-disease"
    }
}
