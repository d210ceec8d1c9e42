//! Text processing for the AgroSaathi backend
//!
//! Provides the translation gateways used by the pivot-language pipeline:
//! user text is translated to English, answered, and the answer translated
//! back to the user's language.
//!
//! # Example
//!
//! ```ignore
//! use agrosaathi_text_processing::{create_translator, TranslationConfig};
//!
//! let translator = create_translator(&TranslationConfig::default())?;
//! let english = translator
//!     .translate("मेरी फसल में कीड़े लगे हैं", Language::Hindi, Language::English)
//!     .await?;
//! ```

pub mod translation;

mod error;

pub use error::{Result, TextProcessingError};
pub use translation::{
    create_translator, CachingTranslator, GoogleTranslator, IndicTransTranslator,
    NoopTranslator, TranslationConfig, TranslationProvider,
};
