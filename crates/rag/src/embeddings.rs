//! Text Embeddings
//!
//! Dense embeddings for semantic search. Queries and documents go through
//! separate methods so instruction-tuned models can prefix queries.

use async_trait::async_trait;

use crate::RagError;

/// Embedding backend
#[async_trait]
pub trait Embedder: Send + Sync + 'static {
    /// Embed document passages
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embed a search query
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError>;

    /// Embedding dimension
    fn dim(&self) -> usize;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Embedding dimension
    pub embedding_dim: usize,
    /// Normalize embeddings
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            normalize: true,
        }
    }
}

/// Scale a vector to unit length
pub fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity of two vectors (0 when either is zero or lengths differ)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// Hash-based embedder (no model required)
///
/// Character-frequency vectors; only useful offline and in tests.
pub struct SimpleEmbedder {
    config: EmbeddingConfig,
}

impl SimpleEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    /// Generate a simple hash-based embedding
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let dim = self.config.embedding_dim.max(1);
        let mut embedding = vec![0.0f32; dim];

        for (i, c) in text.to_lowercase().chars().enumerate() {
            let idx = (c as usize + i) % dim;
            embedding[idx] += 1.0;
        }

        if self.config.normalize {
            normalize(&mut embedding);
        }
        embedding
    }
}

#[async_trait]
impl Embedder for SimpleEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embed(query))
    }

    fn dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn model_name(&self) -> &str {
        "simple-hash"
    }
}
