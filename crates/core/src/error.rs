//! Error types for the assistant

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type shared by every gateway
///
/// Each external collaborator reports failures through exactly one variant,
/// so callers can decide per stage whether to degrade or abort.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither text nor audio carried a usable utterance
    #[error("No audio or text input provided")]
    MissingInput,

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    // Scratch-file errors
    #[error("Staging error: {0}")]
    Staging(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Short machine-readable tag, used for metric labels and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingInput => "missing_input",
            Error::Transcription(_) => "transcription",
            Error::Translation(_) => "translation",
            Error::Classification(_) => "classification",
            Error::Retrieval(_) => "retrieval",
            Error::Generation(_) => "generation",
            Error::Synthesis(_) => "synthesis",
            Error::Staging(_) => "staging",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Other(_) => "other",
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
