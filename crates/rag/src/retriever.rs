//! Knowledge Retriever
//!
//! Dense retrieval over a [`PassageStore`], plus ingestion of knowledge
//! documents (chunk, embed, upsert).

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use agrosaathi_config::{constants::rag, RagSettings};
use agrosaathi_core::Retriever;

use crate::chunker::TextChunker;
use crate::embeddings::Embedder;
use crate::knowledge_loader::{KnowledgeDocument, KnowledgeLoader};
use crate::vector_store::{Passage, PassageStore};
use crate::RagError;

/// Chunks embedded per request during ingestion
const INGEST_BATCH: usize = 32;

/// Retriever configuration
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Minimum similarity score to keep a passage
    pub min_score: f32,
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            min_score: rag::MIN_SCORE,
            chunk_size: rag::CHUNK_SIZE,
            chunk_overlap: rag::CHUNK_OVERLAP,
        }
    }
}

impl From<&RagSettings> for RetrieverConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            min_score: settings.min_score,
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}

/// Retriever over an embedded knowledge base
pub struct KnowledgeRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn PassageStore>,
    chunker: TextChunker,
    config: RetrieverConfig,
}

impl KnowledgeRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn PassageStore>) -> Self {
        Self::with_config(embedder, store, RetrieverConfig::default())
    }

    pub fn with_config(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn PassageStore>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap),
            embedder,
            store,
            config,
        }
    }

    /// Chunk, embed and store documents
    ///
    /// Returns the number of passages written.
    pub async fn ingest_documents(&self, documents: &[KnowledgeDocument]) -> Result<usize, RagError> {
        let mut passages = Vec::new();
        for doc in documents {
            for chunk in self.chunker.chunk(&doc.content) {
                passages.push(Passage {
                    id: uuid::Uuid::new_v4().to_string(),
                    text: chunk.text,
                    title: Some(doc.title.clone()),
                    source: doc.source.clone().or_else(|| Some(doc.id.clone())),
                    category: doc.category.clone(),
                });
            }
        }

        for batch in passages.chunks(INGEST_BATCH) {
            let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
            let embeddings = self.embedder.embed_documents(&texts).await?;
            self.store.upsert(batch, &embeddings).await?;
        }

        tracing::info!(
            documents = documents.len(),
            passages = passages.len(),
            store = self.store.name(),
            embedder = self.embedder.model_name(),
            "Ingested knowledge documents"
        );
        Ok(passages.len())
    }

    /// Load and ingest a knowledge directory when the store is empty
    ///
    /// Returns the number of passages written (0 when already populated).
    pub async fn ingest_if_empty(&self, knowledge_dir: &Path) -> Result<usize, RagError> {
        self.store.ensure_collection().await?;

        let existing = self.store.count().await?;
        if existing > 0 {
            tracing::info!(
                passages = existing,
                store = self.store.name(),
                "Knowledge base already populated, skipping ingestion"
            );
            return Ok(0);
        }

        let documents = KnowledgeLoader::load_directory(knowledge_dir)?;
        if documents.is_empty() {
            tracing::warn!(
                path = %knowledge_dir.display(),
                "No knowledge documents found; answers will use the empty-context sentinel"
            );
            return Ok(0);
        }

        self.ingest_documents(&documents).await
    }
}

#[async_trait]
impl Retriever for KnowledgeRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> agrosaathi_core::Result<Vec<String>> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed_query(query).await?;
        let results = self.store.search(&embedding, top_k).await?;

        let passages: Vec<String> = results
            .into_iter()
            .filter(|r| r.score >= self.config.min_score)
            .map(|r| r.passage.text)
            .collect();

        tracing::debug!(
            query_len = query.len(),
            top_k,
            returned = passages.len(),
            "Knowledge retrieval complete"
        );
        Ok(passages)
    }

    fn name(&self) -> &str {
        "knowledge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::InMemoryStore;
    use tempfile::tempdir;

    /// Embeds text as keyword counts over a tiny vocabulary
    struct KeywordEmbedder;

    const VOCAB: [&str; 4] = ["blight", "wheat", "fertilizer", "scheme"];

    fn keyword_vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        VOCAB
            .iter()
            .map(|w| lower.matches(w).count() as f32)
            .collect()
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts.iter().map(|t| keyword_vector(t)).collect())
        }

        async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
            Ok(keyword_vector(query))
        }

        fn dim(&self) -> usize {
            VOCAB.len()
        }

        fn model_name(&self) -> &str {
            "keyword"
        }
    }

    fn doc(id: &str, content: &str) -> KnowledgeDocument {
        KnowledgeDocument {
            id: id.to_string(),
            title: id.to_string(),
            content: content.to_string(),
            category: None,
            keywords: Vec::new(),
            source: None,
        }
    }

    fn retriever(store: Arc<InMemoryStore>) -> KnowledgeRetriever {
        KnowledgeRetriever::with_config(
            Arc::new(KeywordEmbedder),
            store,
            RetrieverConfig {
                min_score: 0.1,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_retrieve_best_match_first() {
        let store = Arc::new(InMemoryStore::new());
        let retriever = retriever(store.clone());
        let written = retriever
            .ingest_documents(&[
                doc("blight", "Late blight of potato: spray mancozeb when blight appears."),
                doc("wheat", "Sow wheat in November. Wheat needs four irrigations."),
                doc("scheme", "PM-KISAN scheme pays farmers directly."),
            ])
            .await
            .unwrap();
        assert_eq!(written, 3);

        let passages = retriever.retrieve("how to control blight", 2).await.unwrap();
        assert_eq!(passages.len(), 1);
        assert!(passages[0].contains("Late blight"));
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let retriever = retriever(Arc::new(InMemoryStore::new()));
        let passages = retriever.retrieve("wheat sowing", 3).await.unwrap();
        assert!(passages.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let retriever = retriever(store);
        retriever
            .ingest_documents(&[doc("wheat", "wheat wheat")])
            .await
            .unwrap();
        assert!(retriever.retrieve("   ", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_if_empty_runs_once() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("fertilizer.md"),
            "Apply fertilizer in split doses for better uptake.",
        )
        .unwrap();

        let store = Arc::new(InMemoryStore::new());
        let retriever = retriever(store.clone());

        assert_eq!(retriever.ingest_if_empty(dir.path()).await.unwrap(), 1);
        assert_eq!(retriever.ingest_if_empty(dir.path()).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 1);

        let passages = retriever.retrieve("which fertilizer", 3).await.unwrap();
        assert_eq!(passages.len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_if_empty_without_documents() {
        let dir = tempdir().unwrap();
        let retriever = retriever(Arc::new(InMemoryStore::new()));
        assert_eq!(retriever.ingest_if_empty(dir.path()).await.unwrap(), 0);
    }
}
