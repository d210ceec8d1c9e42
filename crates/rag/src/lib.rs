//! Knowledge-base retrieval for the AgroSaathi assistant
//!
//! Features:
//! - Recursive text chunking with overlap
//! - Ollama embeddings
//! - Dense vector search via Qdrant, or an in-process index
//! - Knowledge loading from YAML, JSON, Markdown and plain-text files
//! - Core `Retriever` trait implementation

pub mod chunker;
pub mod embeddings;
pub mod knowledge_loader;
pub mod memory_store;
pub mod ollama_embeddings;
pub mod retriever;
pub mod vector_store;

pub use chunker::{Chunk, TextChunker};
pub use embeddings::{Embedder, EmbeddingConfig, SimpleEmbedder};
pub use knowledge_loader::{KnowledgeDocument, KnowledgeFile, KnowledgeLoader};
pub use memory_store::InMemoryStore;
pub use ollama_embeddings::{OllamaEmbedder, OllamaEmbeddingConfig};
pub use retriever::{KnowledgeRetriever, RetrieverConfig};
pub use vector_store::{
    Passage, PassageStore, ScoredPassage, VectorDistance, VectorStore, VectorStoreConfig,
};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RagError> for agrosaathi_core::Error {
    fn from(err: RagError) -> Self {
        agrosaathi_core::Error::Retrieval(err.to_string())
    }
}
