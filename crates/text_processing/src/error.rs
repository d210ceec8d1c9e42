//! Error types for text processing

use thiserror::Error;

/// Result type for text processing operations
pub type Result<T> = std::result::Result<T, TextProcessingError>;

/// Text processing errors
#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Translation service unreachable: {0}")]
    Http(String),

    #[error("Unexpected translation response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported translation pair: {from} -> {to}")]
    UnsupportedPair { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TextProcessingError {
    fn from(err: reqwest::Error) -> Self {
        TextProcessingError::Http(err.to_string())
    }
}

impl From<TextProcessingError> for agrosaathi_core::Error {
    fn from(err: TextProcessingError) -> Self {
        match err {
            TextProcessingError::Config(msg) => agrosaathi_core::Error::Config(msg),
            other => agrosaathi_core::Error::Translation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_translation_error() {
        let err: agrosaathi_core::Error = TextProcessingError::Http("refused".into()).into();
        assert_eq!(err.kind(), "translation");

        let err: agrosaathi_core::Error = TextProcessingError::Config("bad".into()).into();
        assert_eq!(err.kind(), "config");
    }
}
