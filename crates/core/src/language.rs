//! Language registry
//!
//! Single source of truth mapping the short language identifiers sent by the
//! frontend (`en`, `hi`, `mr`, `kn`/`ka`, `ta`, ...) to the identifiers each
//! external service expects: Whisper language hints, translation codes,
//! IndicTrans FLORES tags and neural voice names.

use serde::{Deserialize, Serialize};

/// Supported languages
///
/// English is the pivot language: every downstream stage (retrieval,
/// generation) works on English text only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Kannada,
    Tamil,
    Telugu,
    Bengali,
    Gujarati,
    Punjabi,
    Malayalam,
}

impl Language {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Marathi => "mr",
            Self::Kannada => "kn",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Bengali => "bn",
            Self::Gujarati => "gu",
            Self::Punjabi => "pa",
            Self::Malayalam => "ml",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
            Self::Kannada => "Kannada",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Bengali => "Bengali",
            Self::Gujarati => "Gujarati",
            Self::Punjabi => "Punjabi",
            Self::Malayalam => "Malayalam",
        }
    }

    /// Language hint for Whisper-style transcription models
    pub fn whisper_code(&self) -> &'static str {
        // Whisper uses plain ISO 639-1 codes for every language we support
        self.code()
    }

    /// Code understood by the Google translation endpoint
    pub fn translate_code(&self) -> &'static str {
        self.code()
    }

    /// FLORES-200 tag used by IndicTrans2 models
    pub fn flores_code(&self) -> &'static str {
        match self {
            Self::English => "eng_Latn",
            Self::Hindi => "hin_Deva",
            Self::Marathi => "mar_Deva",
            Self::Kannada => "kan_Knda",
            Self::Tamil => "tam_Taml",
            Self::Telugu => "tel_Telu",
            Self::Bengali => "ben_Beng",
            Self::Gujarati => "guj_Gujr",
            Self::Punjabi => "pan_Guru",
            Self::Malayalam => "mal_Mlym",
        }
    }

    /// Neural voice used for speech synthesis
    pub fn edge_voice(&self) -> &'static str {
        match self {
            Self::English => "en-IN-NeerjaNeural",
            Self::Hindi => "hi-IN-SwaraNeural",
            Self::Marathi => "mr-IN-AarohiNeural",
            Self::Kannada => "kn-IN-SapnaNeural",
            Self::Tamil => "ta-IN-PallaviNeural",
            Self::Telugu => "te-IN-ShrutiNeural",
            Self::Bengali => "bn-IN-TanishaaNeural",
            Self::Gujarati => "gu-IN-DhwaniNeural",
            Self::Punjabi => "pa-IN-OjasNeural",
            Self::Malayalam => "ml-IN-SobhanaNeural",
        }
    }

    /// Get script used by this language
    pub fn script(&self) -> Script {
        match self {
            Self::English => Script::Latin,
            Self::Hindi | Self::Marathi => Script::Devanagari,
            Self::Kannada => Script::Kannada,
            Self::Tamil => Script::Tamil,
            Self::Telugu => Script::Telugu,
            Self::Bengali => Script::Bengali,
            Self::Gujarati => Script::Gujarati,
            Self::Punjabi => Script::Gurmukhi,
            Self::Malayalam => Script::Malayalam,
        }
    }

    pub fn is_english(&self) -> bool {
        matches!(self, Self::English)
    }

    /// Parse a short identifier or name (case-insensitive)
    ///
    /// Accepts the legacy `ka` identifier for Kannada that older clients send.
    pub fn from_code(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "en" | "eng" | "english" => Some(Self::English),
            "hi" | "hin" | "hindi" => Some(Self::Hindi),
            "mr" | "mar" | "marathi" => Some(Self::Marathi),
            "kn" | "ka" | "kan" | "kannada" => Some(Self::Kannada),
            "ta" | "tam" | "tamil" => Some(Self::Tamil),
            "te" | "tel" | "telugu" => Some(Self::Telugu),
            "bn" | "ben" | "bengali" | "bangla" => Some(Self::Bengali),
            "gu" | "guj" | "gujarati" => Some(Self::Gujarati),
            "pa" | "pan" | "punjabi" => Some(Self::Punjabi),
            "ml" | "mal" | "malayalam" => Some(Self::Malayalam),
            _ => None,
        }
    }

    /// Resolve a request language, falling back to English
    ///
    /// Unknown codes never fail a request. English means every translation
    /// step becomes an identity pass-through.
    pub fn resolve(s: &str) -> Self {
        match Self::from_code(s) {
            Some(lang) => lang,
            None => {
                if !s.trim().is_empty() {
                    tracing::warn!(code = %s, "Unsupported language code, defaulting to English");
                }
                Self::English
            },
        }
    }

    /// Get all supported languages
    pub fn all() -> &'static [Language] {
        &[
            Self::English,
            Self::Hindi,
            Self::Marathi,
            Self::Kannada,
            Self::Tamil,
            Self::Telugu,
            Self::Bengali,
            Self::Gujarati,
            Self::Punjabi,
            Self::Malayalam,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Writing systems of the supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Devanagari,
    Bengali,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Gujarati,
    Gurmukhi,
}
