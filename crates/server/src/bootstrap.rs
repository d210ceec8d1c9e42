//! Gateway wiring
//!
//! Builds every gateway from settings and injects them into the orchestrator.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use agrosaathi_config::{
    EmbeddingProviderKind, PassageStoreKind, RagSettings, Settings, TranslationSettings,
};
use agrosaathi_core::{Retriever, Translator};
use agrosaathi_llm::{LlmFactory, LlmProviderConfig};
use agrosaathi_pipeline::{
    ChatOrchestrator, ClassifierConfig, HttpImageClassifier, HttpSpeechSynthesizer,
    MediaStaging, OrchestratorConfig, SynthesizerConfig, WhisperConfig, WhisperHttpStt,
};
use agrosaathi_rag::{
    Embedder, EmbeddingConfig, InMemoryStore, KnowledgeRetriever, OllamaEmbedder, OllamaEmbeddingConfig,
    PassageStore, RagError, RetrieverConfig, SimpleEmbedder, VectorStore, VectorStoreConfig,
};
use agrosaathi_text_processing::{create_translator, TranslationConfig, TranslationProvider};

use crate::ServerError;

/// Build the chat orchestrator from settings
///
/// Retrieval that cannot be initialized is disabled with a warning; every
/// other gateway failing to build is a startup error.
pub async fn build_orchestrator(settings: &Settings) -> Result<ChatOrchestrator, ServerError> {
    let staging = MediaStaging::from(&settings.staging);
    staging
        .ensure_dirs()
        .await
        .map_err(|e| ServerError::startup("staging", e))?;

    let stt = WhisperHttpStt::new(WhisperConfig::from(&settings.stt))
        .map_err(|e| ServerError::startup("stt", e))?;
    let translator = build_translator(&settings.translation)?;
    let generator = LlmProviderConfig::from_settings(&settings.llm)
        .and_then(|config| LlmFactory::create(&config))
        .map_err(|e| ServerError::startup("llm", e))?;
    let tts = HttpSpeechSynthesizer::new(SynthesizerConfig::from(&settings.tts))
        .map_err(|e| ServerError::startup("tts", e))?;

    let mut orchestrator = ChatOrchestrator::new(
        Arc::new(stt),
        translator,
        generator,
        Arc::new(tts),
        staging,
        OrchestratorConfig::from(&settings.pipeline),
    );

    if settings.vision.enabled {
        let classifier = HttpImageClassifier::new(ClassifierConfig::from(&settings.vision))
            .map_err(|e| ServerError::startup("vision", e))?;
        orchestrator = orchestrator.with_classifier(Arc::new(classifier));
    } else {
        tracing::info!("Image classification disabled");
    }

    if settings.rag.enabled {
        match build_retriever(&settings.rag).await {
            Ok(retriever) => orchestrator = orchestrator.with_retriever(retriever),
            Err(e) => tracing::warn!(
                error = %e,
                "Knowledge retrieval unavailable; answers will use the empty-context sentinel"
            ),
        }
    } else {
        tracing::info!("Knowledge retrieval disabled");
    }

    Ok(orchestrator)
}

fn build_translator(settings: &TranslationSettings) -> Result<Arc<dyn Translator>, ServerError> {
    let provider = TranslationProvider::parse(&settings.provider).ok_or_else(|| {
        ServerError::startup(
            "translation",
            format!("Unknown translation provider '{}'", settings.provider),
        )
    })?;

    let config = TranslationConfig {
        provider,
        endpoint: settings.endpoint.clone(),
        timeout: Duration::from_secs(settings.timeout_secs),
        ..TranslationConfig::default()
    };
    create_translator(&config).map_err(|e| ServerError::startup("translation", e))
}

/// Connect the passage store and ingest the knowledge directory if it is empty
async fn build_retriever(settings: &RagSettings) -> Result<Arc<dyn Retriever>, RagError> {
    let embedder: Arc<dyn Embedder> = match settings.embedding_provider_kind() {
        Some(EmbeddingProviderKind::Hash) => Arc::new(SimpleEmbedder::new(EmbeddingConfig {
            embedding_dim: settings.vector_dim,
            normalize: true,
        })),
        Some(EmbeddingProviderKind::Ollama) => {
            Arc::new(OllamaEmbedder::new(OllamaEmbeddingConfig::from(settings))?)
        },
        None => {
            return Err(RagError::Config(format!(
                "Unknown embedding provider '{}'",
                settings.embedding_provider
            )))
        },
    };

    let store: Arc<dyn PassageStore> = match settings.store_kind() {
        Some(PassageStoreKind::Memory) => Arc::new(InMemoryStore::new()),
        Some(PassageStoreKind::Qdrant) => {
            Arc::new(VectorStore::new(VectorStoreConfig::from(settings))?)
        },
        None => {
            return Err(RagError::Config(format!(
                "Unknown passage store '{}'",
                settings.store
            )))
        },
    };

    let retriever = KnowledgeRetriever::with_config(
        embedder.clone(),
        store.clone(),
        RetrieverConfig::from(settings),
    );
    let ingested = retriever
        .ingest_if_empty(Path::new(&settings.knowledge_dir))
        .await?;

    tracing::info!(
        store = store.name(),
        embedder = embedder.model_name(),
        knowledge_dir = %settings.knowledge_dir,
        ingested,
        "Knowledge retrieval ready"
    );
    Ok(Arc::new(retriever))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_translation_provider() {
        let settings = TranslationSettings {
            provider: "babelfish".to_string(),
            ..TranslationSettings::default()
        };
        assert!(matches!(
            build_translator(&settings),
            Err(ServerError::Startup { component: "translation", .. })
        ));
    }

    #[test]
    fn test_disabled_translation_provider() {
        let settings = TranslationSettings {
            provider: "disabled".to_string(),
            ..TranslationSettings::default()
        };
        let translator = build_translator(&settings).unwrap();
        assert_eq!(translator.name(), "noop");
    }

    #[tokio::test]
    async fn test_offline_retriever_ingests_knowledge_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("neem.txt"),
            "Neem oil spray controls aphids and whiteflies on vegetables.",
        )
        .unwrap();

        let settings = RagSettings {
            store: "Memory".to_string(),
            embedding_provider: "Hash".to_string(),
            knowledge_dir: dir.path().display().to_string(),
            ..RagSettings::default()
        };

        let retriever = build_retriever(&settings).await.unwrap();
        let passages = retriever.retrieve("neem oil for aphids", 3).await.unwrap();
        assert_eq!(passages.len(), 1);
        assert!(passages[0].contains("Neem oil"));
    }

    #[tokio::test]
    async fn test_mixed_case_memory_store_enables_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.staging.upload_dir = dir.path().join("uploads").display().to_string();
        settings.staging.output_dir = dir.path().join("outputs").display().to_string();
        settings.vision.enabled = false;
        settings.rag.store = "Memory".to_string();
        settings.rag.embedding_provider = "HASH".to_string();
        settings.rag.knowledge_dir = dir.path().display().to_string();
        settings.llm.api_key = Some("test-key".to_string());
        std::fs::write(dir.path().join("wheat.md"), "Irrigate wheat at crown root initiation.")
            .unwrap();
        assert!(settings.validate().is_ok());

        let orchestrator = build_orchestrator(&settings).await.unwrap();
        assert!(orchestrator.has_retriever());
    }

    #[tokio::test]
    async fn test_unknown_store_is_rejected() {
        let settings = RagSettings {
            store: "faiss".to_string(),
            embedding_provider: "hash".to_string(),
            ..RagSettings::default()
        };
        assert!(matches!(build_retriever(&settings).await, Err(RagError::Config(_))));
    }
}
