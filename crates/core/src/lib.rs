//! Core traits and types for the AgroSaathi assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Gateway traits for pluggable backends (STT, translation, vision, retrieval, LLM, TTS)
//! - Language registry (English plus Indian languages)
//! - Classification and retrieved-context types
//! - Error taxonomy
//! - Conversation turns

pub mod classification;
pub mod conversation;
pub mod error;
pub mod language;
pub mod retrieval;
pub mod traits;

pub use classification::{Classification, ClassificationOutcome};
pub use conversation::{Turn, TurnRole};
pub use error::{Error, Result};
pub use language::{Language, Script};
pub use retrieval::{RetrievedContext, CONTEXT_SEPARATOR, EMPTY_CONTEXT_SENTINEL};

// Trait re-exports
pub use traits::{
    // Generation
    GenerationRequest,
    ImageClassifier,
    ResponseGenerator,
    // Retrieval
    Retriever,
    // Speech
    SpeechToText,
    SynthesizedAudio,
    TextToSpeech,
    // Text processing
    Translator,
};
