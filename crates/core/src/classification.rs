//! Image classification results
//!
//! A missing image and a failed classifier are ordinary outcomes, not errors:
//! both still render a sentence that is handed to the generation stage.

use serde::{Deserialize, Serialize};

/// Predicted crop/plant condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Predicted class label (e.g. `Tomato___Late_blight`)
    pub label: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

impl Classification {
    /// Create a classification, clamping confidence into [0, 1]
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// What the classification stage produced for one request
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    /// The request carried no image
    NoImage,
    /// The classifier returned a label
    Detected(Classification),
    /// The classifier was called and failed
    Failed { reason: String },
    /// An image was supplied but no classifier is configured
    Unavailable,
}

impl ClassificationOutcome {
    /// Detected label, if any
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Detected(c) => Some(c.label.as_str()),
            _ => None,
        }
    }

    /// Detected classification, if any
    pub fn detection(&self) -> Option<&Classification> {
        match self {
            Self::Detected(c) => Some(c),
            _ => None,
        }
    }

    /// Auxiliary sentence passed to the generation stage
    pub fn describe(&self) -> String {
        match self {
            Self::NoImage => "No image provided.".to_string(),
            Self::Detected(c) => format!(
                "Detected Class: {} (Confidence: {:.2})",
                c.label, c.confidence
            ),
            Self::Failed { reason } => format!("Classification failed: {}", reason),
            Self::Unavailable => "Image analysis is not available.".to_string(),
        }
    }
}
