//! Vector Store using Qdrant
//!
//! Dense passage storage and similarity search behind the [`PassageStore`]
//! trait, so the retriever can run against Qdrant or the in-process index.

use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        value::Kind, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
        UpsertPointsBuilder, VectorParamsBuilder,
    },
    Qdrant,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use agrosaathi_config::{constants::endpoints, RagSettings};

use crate::RagError;

/// A chunk of knowledge stored with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Unique ID (UUID)
    pub id: String,
    /// Passage text handed to the LLM
    pub text: String,
    /// Title of the source document
    pub title: Option<String>,
    /// Source file or document id
    pub source: Option<String>,
    /// Category (e.g. "disease", "fertilizer", "scheme")
    pub category: Option<String>,
}

/// Passage with similarity score
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Passage storage backend
#[async_trait]
pub trait PassageStore: Send + Sync + 'static {
    /// Create the backing collection if missing
    async fn ensure_collection(&self) -> Result<(), RagError>;

    /// Insert passages with their embeddings
    async fn upsert(&self, passages: &[Passage], embeddings: &[Vec<f32>]) -> Result<(), RagError>;

    /// Most similar passages, best first
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredPassage>, RagError>;

    /// Number of stored passages
    async fn count(&self) -> Result<u64, RagError>;

    fn name(&self) -> &str;
}

/// Vector store configuration
#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    /// Qdrant endpoint
    pub endpoint: String,
    /// Collection name
    pub collection: String,
    /// Vector dimension
    pub vector_dim: usize,
    /// Distance metric
    pub distance: VectorDistance,
    /// API key (optional)
    pub api_key: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::QDRANT_DEFAULT.to_string(),
            collection: "agrosaathi_knowledge".to_string(),
            vector_dim: 384,
            distance: VectorDistance::Cosine,
            api_key: None,
        }
    }
}

impl From<&RagSettings> for VectorStoreConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            endpoint: settings.qdrant_endpoint.clone(),
            collection: settings.qdrant_collection.clone(),
            vector_dim: settings.vector_dim,
            distance: VectorDistance::Cosine,
            api_key: settings.qdrant_api_key.clone(),
        }
    }
}

/// Distance metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorDistance {
    Cosine,
    Euclidean,
    DotProduct,
}

impl From<VectorDistance> for Distance {
    fn from(d: VectorDistance) -> Self {
        match d {
            VectorDistance::Cosine => Distance::Cosine,
            VectorDistance::Euclidean => Distance::Euclid,
            VectorDistance::DotProduct => Distance::Dot,
        }
    }
}

/// Qdrant payload for a passage
fn passage_payload(passage: &Passage) -> HashMap<String, qdrant_client::qdrant::Value> {
    let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
    payload.insert("text".to_string(), passage.text.clone().into());
    if let Some(ref title) = passage.title {
        payload.insert("title".to_string(), title.clone().into());
    }
    if let Some(ref source) = passage.source {
        payload.insert("source".to_string(), source.clone().into());
    }
    if let Some(ref category) = passage.category {
        payload.insert("category".to_string(), category.clone().into());
    }
    payload
}

/// Rebuild a passage from a Qdrant payload
fn passage_from_payload(id: String, payload: HashMap<String, qdrant_client::qdrant::Value>) -> Passage {
    let mut fields: HashMap<String, String> = payload
        .into_iter()
        .filter_map(|(k, v)| match v.kind {
            Some(Kind::StringValue(s)) => Some((k, s)),
            _ => None,
        })
        .collect();

    Passage {
        id,
        text: fields.remove("text").unwrap_or_default(),
        title: fields.remove("title"),
        source: fields.remove("source"),
        category: fields.remove("category"),
    }
}

/// Qdrant vector store client
pub struct VectorStore {
    client: Qdrant,
    config: VectorStoreConfig,
}

impl VectorStore {
    /// Create a new vector store connection
    pub fn new(config: VectorStoreConfig) -> Result<Self, RagError> {
        let mut builder = Qdrant::from_url(&config.endpoint);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
            tracing::info!("Qdrant connection using API key authentication");
        }

        let client = builder
            .build()
            .map_err(|e| RagError::Connection(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }
}

#[async_trait]
impl PassageStore for VectorStore {
    async fn ensure_collection(&self) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(&self.config.collection)
            .await
            .map_err(|e| RagError::VectorStore(e.to_string()))?;

        if !exists {
            tracing::info!(collection = %self.config.collection, "Creating Qdrant collection");
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.config.collection).vectors_config(
                        VectorParamsBuilder::new(
                            self.config.vector_dim as u64,
                            Distance::from(self.config.distance),
                        ),
                    ),
                )
                .await
                .map_err(|e| RagError::VectorStore(e.to_string()))?;
        }

        Ok(())
    }

    async fn upsert(&self, passages: &[Passage], embeddings: &[Vec<f32>]) -> Result<(), RagError> {
        if passages.len() != embeddings.len() {
            return Err(RagError::VectorStore(
                "Passage and embedding count mismatch".to_string(),
            ));
        }
        if passages.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = passages
            .iter()
            .zip(embeddings.iter())
            .map(|(passage, emb)| {
                PointStruct::new(passage.id.clone(), emb.clone(), passage_payload(passage))
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.config.collection, points))
            .await
            .map_err(|e| RagError::VectorStore(e.to_string()))?;

        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredPassage>, RagError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.config.collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| RagError::Search(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .map(|pid| match pid.point_id_options {
                        Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u)) => u,
                        Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => {
                            n.to_string()
                        },
                        None => String::new(),
                    })
                    .unwrap_or_default();

                ScoredPassage {
                    passage: passage_from_payload(id, point.payload),
                    score: point.score,
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, RagError> {
        let info = self
            .client
            .collection_info(&self.config.collection)
            .await
            .map_err(|e| RagError::VectorStore(e.to_string()))?;

        Ok(info
            .result
            .map(|r| r.points_count.unwrap_or(0))
            .unwrap_or(0))
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = VectorStoreConfig::default();
        assert_eq!(config.vector_dim, 384);
        assert_eq!(config.distance, VectorDistance::Cosine);
        assert_eq!(config.collection, "agrosaathi_knowledge");
    }

    #[test]
    fn test_config_from_settings() {
        let settings = RagSettings {
            qdrant_collection: "kb_test".to_string(),
            qdrant_api_key: Some("secret".to_string()),
            ..RagSettings::default()
        };
        let config = VectorStoreConfig::from(&settings);
        assert_eq!(config.collection, "kb_test");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_payload_roundtrip() {
        let passage = Passage {
            id: "3f1c".to_string(),
            text: "Apply 50 kg urea per acre at tillering.".to_string(),
            title: Some("Wheat nutrition".to_string()),
            source: Some("wheat.yaml".to_string()),
            category: None,
        };
        let payload = passage_payload(&passage);
        assert_eq!(payload.len(), 3);

        let rebuilt = passage_from_payload("3f1c".to_string(), payload);
        assert_eq!(rebuilt, passage);
    }
}
