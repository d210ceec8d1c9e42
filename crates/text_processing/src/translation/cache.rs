//! In-memory translation cache keyed by `(from, to, text)`

use agrosaathi_core::{Language, Result, Translator};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Wraps another translator with a bounded cache
pub struct CachingTranslator {
    inner: Arc<dyn Translator>,
    entries: RwLock<HashMap<(Language, Language, String), String>>,
    max_size: usize,
}

impl CachingTranslator {
    pub fn new(inner: Arc<dyn Translator>, max_size: usize) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            max_size: max_size.max(1),
        }
    }

    /// Number of cached translations
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn insert(&self, key: (Language, Language, String), translation: String) {
        let mut entries = self.entries.write();
        // Simple eviction: drop half when full
        if entries.len() >= self.max_size {
            let evict: Vec<_> = entries
                .keys()
                .take((self.max_size / 2).max(1))
                .cloned()
                .collect();
            for key in evict {
                entries.remove(&key);
            }
        }
        entries.insert(key, translation);
    }
}

#[async_trait]
impl Translator for CachingTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if from == to {
            return Ok(text.to_string());
        }

        let key = (from, to, text.to_string());
        let cached = self.entries.read().get(&key).cloned();
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let translated = self.inner.translate(text, from, to).await?;
        self.insert(key, translated.clone());
        Ok(translated)
    }

    fn supports_pair(&self, from: Language, to: Language) -> bool {
        self.inner.supports_pair(from, to)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
