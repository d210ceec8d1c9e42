//! In-process passage index
//!
//! Brute-force cosine search over passages held in memory. Rebuilt from the
//! knowledge directory at startup; suited to small knowledge bases and tests.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::embeddings::cosine_similarity;
use crate::vector_store::{Passage, PassageStore, ScoredPassage};
use crate::RagError;

#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<Vec<(Passage, Vec<f32>)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PassageStore for InMemoryStore {
    async fn ensure_collection(&self) -> Result<(), RagError> {
        Ok(())
    }

    async fn upsert(&self, passages: &[Passage], embeddings: &[Vec<f32>]) -> Result<(), RagError> {
        if passages.len() != embeddings.len() {
            return Err(RagError::VectorStore(
                "Passage and embedding count mismatch".to_string(),
            ));
        }

        let mut entries = self.entries.write();
        for (passage, embedding) in passages.iter().zip(embeddings) {
            entries.retain(|(p, _)| p.id != passage.id);
            entries.push((passage.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredPassage>, RagError> {
        let entries = self.entries.read();
        let mut scored: Vec<ScoredPassage> = entries
            .iter()
            .map(|(passage, vector)| ScoredPassage {
                passage: passage.clone(),
                score: cosine_similarity(embedding, vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self) -> Result<u64, RagError> {
        Ok(self.entries.read().len() as u64)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str, text: &str) -> Passage {
        Passage {
            id: id.to_string(),
            text: text.to_string(),
            title: None,
            source: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryStore::new();
        store
            .upsert(
                &[passage("a", "north"), passage("b", "east"), passage("c", "north-east")],
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            )
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.1], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].passage.id, "a");
        assert_eq!(results[1].passage.id, "c");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let store = InMemoryStore::new();
        store.upsert(&[passage("a", "old")], &[vec![1.0]]).await.unwrap();
        store.upsert(&[passage("a", "new")], &[vec![1.0]]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let results = store.search(&[1.0], 5).await.unwrap();
        assert_eq!(results[0].passage.text, "new");
    }

    #[tokio::test]
    async fn test_count_mismatch_rejected() {
        let store = InMemoryStore::new();
        assert!(store.upsert(&[passage("a", "x")], &[]).await.is_err());
    }
}
