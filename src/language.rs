//! Supported conversation languages
//!
//! The language selects the speech-recognition locale and is sent along with
//! every chat and synthesis request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Locale used when a language code is not recognized
pub const DEFAULT_LOCALE: &str = "en-US";

/// A conversation language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Hindi
    Hi,
    /// Tamil
    Ta,
    /// Telugu
    Te,
}

impl Language {
    /// Every supported language, in display order
    pub const ALL: [Self; 4] = [Self::En, Self::Hi, Self::Ta, Self::Te];

    /// Short code sent to the backend (e.g. `"hi"`)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Ta => "ta",
            Self::Te => "te",
        }
    }

    /// BCP 47 locale tag for speech recognition (e.g. `"hi-IN"`)
    #[must_use]
    pub const fn locale(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Hi => "hi-IN",
            Self::Ta => "ta-IN",
            Self::Te => "te-IN",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::En => "English (en-US)",
            Self::Hi => "Hindi (hi-IN)",
            Self::Ta => "Tamil (ta-IN)",
            Self::Te => "Telugu (te-IN)",
        }
    }

    /// Look up a language by its short code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| {
            Error::Config(format!(
                "unsupported language '{s}' (expected one of: en, hi, ta, te)"
            ))
        })
    }
}

/// Map a language code to its recognition locale, defaulting to `en-US`
#[must_use]
pub fn locale_for_code(code: &str) -> &'static str {
    Language::from_code(code).map_or(DEFAULT_LOCALE, Language::locale)
}
