//! Retrieval traits

use crate::Result;
use async_trait::async_trait;

/// Knowledge-base retriever
///
/// Implementations:
/// - `KnowledgeRetriever` - Dense search over a Qdrant collection
///
/// # Example
///
/// ```ignore
/// let retriever: Arc<dyn Retriever> = Arc::new(KnowledgeRetriever::new(embedder, store));
/// let passages = retriever.retrieve("yellow tomato leaves", 3).await?;
/// ```
#[async_trait]
pub trait Retriever: Send + Sync + 'static {
    /// Retrieve up to `top_k` passages, best match first
    ///
    /// An empty knowledge base yields an empty vector, not an error.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>>;

    /// Get retriever name
    fn name(&self) -> &str;
}
