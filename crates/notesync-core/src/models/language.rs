//! Supported note languages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Language a note's content is currently written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Es,
    Fr,
    Ar,
    Hi,
    Zh,
    De,
    Ko,
    Ja,
    Uk,
}

impl LanguageCode {
    /// Every supported language, in selection-menu order.
    pub const ALL: [Self; 10] = [
        Self::En,
        Self::Es,
        Self::Fr,
        Self::Ar,
        Self::Hi,
        Self::Zh,
        Self::De,
        Self::Ko,
        Self::Ja,
        Self::Uk,
    ];

    /// Two-letter ISO-639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::Ar => "ar",
            Self::Hi => "hi",
            Self::Zh => "zh",
            Self::De => "de",
            Self::Ko => "ko",
            Self::Ja => "ja",
            Self::Uk => "uk",
        }
    }

    /// Human-readable name for selection lists.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Spanish",
            Self::Fr => "French",
            Self::Ar => "Arabic",
            Self::Hi => "Hindi",
            Self::Zh => "Chinese",
            Self::De => "German",
            Self::Ko => "Korean",
            Self::Ja => "Japanese",
            Self::Uk => "Ukrainian",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.code() == normalized)
            .ok_or_else(|| Error::UnsupportedLanguage(s.trim().to_string()))
    }
}
