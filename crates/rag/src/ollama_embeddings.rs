//! Ollama Embeddings
//!
//! Uses Ollama's `/api/embed` endpoint, which accepts a batch of inputs
//! and returns one vector per input.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use agrosaathi_config::{constants::endpoints, RagSettings};

use crate::embeddings::Embedder;
use crate::RagError;

/// Ollama embedding configuration
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingConfig {
    /// Ollama API endpoint
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Embedding dimension
    pub embedding_dim: usize,
    /// Inputs sent per request during ingestion
    pub batch_size: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OllamaEmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OLLAMA_DEFAULT.to_string(),
            model: "all-minilm".to_string(),
            embedding_dim: 384,
            batch_size: 32,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&RagSettings> for OllamaEmbeddingConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            endpoint: settings.embedding_endpoint.clone(),
            model: settings.embedding_model.clone(),
            embedding_dim: settings.vector_dim,
            ..Default::default()
        }
    }
}

/// Request to Ollama embedding API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response from Ollama embedding API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedder
pub struct OllamaEmbedder {
    client: Client,
    config: OllamaEmbeddingConfig,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: OllamaEmbeddingConfig) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Connection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Embed one request's worth of inputs
    async fn embed_raw(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: inputs,
        };

        let url = format!("{}/api/embed", self.config.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "Ollama embedding failed: {} - {}",
                status, text
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to parse Ollama response: {}", e)))?;

        check_batch(embed_response.embeddings, inputs.len(), self.config.embedding_dim)
    }
}

/// Validate the shape of an embedding batch
fn check_batch(
    embeddings: Vec<Vec<f32>>,
    expected: usize,
    dim: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    if embeddings.len() != expected {
        return Err(RagError::Embedding(format!(
            "Expected {} embeddings, got {}",
            expected,
            embeddings.len()
        )));
    }
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
        return Err(RagError::Embedding(format!(
            "Embedding dimension mismatch: expected {}, got {}",
            dim,
            bad.len()
        )));
    }
    Ok(embeddings)
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size.max(1)) {
            embeddings.extend(self.embed_raw(batch).await?);
        }
        Ok(embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        self.embed_raw(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("No embedding returned".to_string()))
    }

    fn dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
