//! Configuration management for the voice chat client

pub mod file;

use crate::capture::DEFAULT_RECORDING_FILE_NAME;
use crate::{Error, Language, Result};

/// Backend used when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the backend URL
pub const BACKEND_URL_ENV: &str = "VCHAT_BACKEND_URL";

/// Environment variable overriding the language
pub const LANGUAGE_ENV: &str = "VCHAT_LANGUAGE";

/// Voice chat client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the chat/TTS/STT backend
    pub backend_url: String,

    /// Initial conversation language
    pub language: Language,

    /// File name sent with fallback recordings
    pub recording_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            language: Language::default(),
            recording_file_name: DEFAULT_RECORDING_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if a configured language code is not supported
    pub fn load() -> Result<Self> {
        Self::resolve(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Merge a config file with environment lookups
    ///
    /// # Errors
    ///
    /// Returns error if a configured language code is not supported
    pub fn resolve<F>(fc: file::ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend_url = env(BACKEND_URL_ENV)
            .or(fc.backend.url)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.backend_url);

        let language = match env(LANGUAGE_ENV).or(fc.language) {
            Some(code) => code.parse::<Language>().map_err(|_| {
                Error::Config(format!("unsupported language in configuration: {code}"))
            })?,
            None => defaults.language,
        };

        let recording_file_name = fc
            .audio
            .recording_file_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(defaults.recording_file_name);

        Ok(Self {
            backend_url,
            language,
            recording_file_name,
        })
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, backend_url: Option<String>, language: Option<Language>) -> Self {
        if let Some(url) = backend_url {
            self.backend_url = url;
        }
        if let Some(language) = language {
            self.language = language;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::file::ConfigFile;
    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(ConfigFile::default(), env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.language, Language::En);
    }

    #[test]
    fn test_env_beats_file() {
        let fc = ConfigFile::from_toml_str(
            "language = \"hi\"\n[backend]\nurl = \"http://file:1\"\n",
        )
        .unwrap();
        let config = Config::resolve(
            fc,
            env_from(&[(BACKEND_URL_ENV, "http://env:2"), (LANGUAGE_ENV, "ta")]),
        )
        .unwrap();

        assert_eq!(config.backend_url, "http://env:2");
        assert_eq!(config.language, Language::Ta);
    }

    #[test]
    fn test_file_beats_default() {
        let fc = ConfigFile::from_toml_str(
            "language = \"te\"\n[audio]\nrecording_file_name = \"clip.wav\"\n",
        )
        .unwrap();
        let config = Config::resolve(fc, env_from(&[])).unwrap();

        assert_eq!(config.language, Language::Te);
        assert_eq!(config.recording_file_name, "clip.wav");
    }

    #[test]
    fn test_unknown_language_is_config_error() {
        let result = Config::resolve(ConfigFile::default(), env_from(&[(LANGUAGE_ENV, "fr")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some("http://cli:3".to_string()), Some(Language::Hi));
        assert_eq!(config.backend_url, "http://cli:3");
        assert_eq!(config.language, Language::Hi);
    }
}
