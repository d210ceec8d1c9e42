//! Request pipeline for the AgroSaathi assistant
//!
//! Features:
//! - Media staging with collision-free names and guaranteed cleanup
//! - Request orchestrator (STT → translate → classify → retrieve → generate → translate → TTS)
//! - HTTP gateways for Whisper transcription, speech synthesis and disease classification

pub mod orchestrator;
pub mod staging;
pub mod stt;
pub mod tts;
pub mod vision;

pub use orchestrator::{
    ChatOrchestrator, IncomingRequest, MediaPayload, OrchestratorConfig, PipelineResult,
    StageTimings,
};
pub use staging::{MediaStaging, PublishedAudio, StagedFile};
pub use stt::{WhisperConfig, WhisperHttpStt};
pub use tts::{HttpSpeechSynthesizer, SynthesizerConfig};
pub use vision::{ClassifierConfig, HttpImageClassifier};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No audio or text input provided")]
    MissingInput,

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Staging error: {0}")]
    Staging(String),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Vision error: {0}")]
    Vision(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the failure was caused by the request itself
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::MissingInput | PipelineError::Transcription(_))
    }

    /// Short machine-readable tag, used for metric labels and error codes
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MissingInput => "missing_input",
            PipelineError::Transcription(_) | PipelineError::Stt(_) => "transcription",
            PipelineError::Generation(_) => "generation",
            PipelineError::Staging(_) | PipelineError::Io(_) => "staging",
            PipelineError::Tts(_) => "synthesis",
            PipelineError::Vision(_) => "classification",
        }
    }

    /// Message safe to show to end users
    pub fn public_message(&self) -> &'static str {
        match self {
            PipelineError::MissingInput => "No audio or text input provided",
            PipelineError::Transcription(_) | PipelineError::Stt(_) => {
                "Could not understand the audio. Please try again or type your question."
            },
            PipelineError::Generation(_) => {
                "Sorry, I could not generate an answer right now. Please try again."
            },
            _ => "An internal error occurred",
        }
    }
}

impl From<PipelineError> for agrosaathi_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::MissingInput => agrosaathi_core::Error::MissingInput,
            PipelineError::Transcription(e) | PipelineError::Stt(e) => {
                agrosaathi_core::Error::Transcription(e)
            },
            PipelineError::Generation(e) => agrosaathi_core::Error::Generation(e),
            PipelineError::Staging(e) => agrosaathi_core::Error::Staging(e),
            PipelineError::Tts(e) => agrosaathi_core::Error::Synthesis(e),
            PipelineError::Vision(e) => agrosaathi_core::Error::Classification(e),
            PipelineError::Io(e) => agrosaathi_core::Error::Io(e),
        }
    }
}
