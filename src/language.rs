//! Supported languages.
//!
//! A closed set of ten locale codes drives both reply text and voice
//! selection. Unknown codes fail closed to English at every lookup so a
//! missing translation can never break a chat turn.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    English,
    Hindi,
    Tamil,
    Telugu,
    Bengali,
    Marathi,
    Gujarati,
    Kannada,
    Malayalam,
    Punjabi,
}

impl LanguageCode {
    /// Every supported language, in display order.
    pub const ALL: [LanguageCode; 10] = [
        Self::English,
        Self::Hindi,
        Self::Tamil,
        Self::Telugu,
        Self::Bengali,
        Self::Marathi,
        Self::Gujarati,
        Self::Kannada,
        Self::Malayalam,
        Self::Punjabi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Hindi => "hindi",
            Self::Tamil => "tamil",
            Self::Telugu => "telugu",
            Self::Bengali => "bengali",
            Self::Marathi => "marathi",
            Self::Gujarati => "gujarati",
            Self::Kannada => "kannada",
            Self::Malayalam => "malayalam",
            Self::Punjabi => "punjabi",
        }
    }

    /// Parse a user-supplied code, falling back to English on anything
    /// unrecognized.
    pub fn parse_or_english(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "english" => Self::English,
            "hindi" => Self::Hindi,
            "tamil" => Self::Tamil,
            "telugu" => Self::Telugu,
            "bengali" => Self::Bengali,
            "marathi" => Self::Marathi,
            "gujarati" => Self::Gujarati,
            "kannada" => Self::Kannada,
            "malayalam" => Self::Malayalam,
            "punjabi" => Self::Punjabi,
            _ => Self::English,
        }
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::English
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
