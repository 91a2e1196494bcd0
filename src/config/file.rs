//! TOML configuration file loading
//!
//! Supports `~/.config/vchat/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Conversation language code (e.g. "ta")
    #[serde(default)]
    pub language: Option<String>,

    /// Backend connection
    #[serde(default)]
    pub backend: BackendFileConfig,

    /// Audio capture settings
    #[serde(default)]
    pub audio: AudioFileConfig,
}

/// Backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct BackendFileConfig {
    /// Base URL of the chat/TTS/STT backend
    pub url: Option<String>,
}

/// Audio configuration
#[derive(Debug, Default, Deserialize)]
pub struct AudioFileConfig {
    /// File name sent with recordings
    pub recording_file_name: Option<String>,
}

impl ConfigFile {
    /// Parse a config file body
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> ConfigFile {
    config_file_path().map_or_else(ConfigFile::default, |path| load_from_path(&path))
}

/// Load a config file from `path`, falling back to defaults
#[must_use]
pub fn load_from_path(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match ConfigFile::from_toml_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/vchat/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vchat").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let fc = ConfigFile::from_toml_str("language = \"te\"\n").unwrap();
        assert_eq!(fc.language.as_deref(), Some("te"));
        assert!(fc.backend.url.is_none());
        assert!(fc.audio.recording_file_name.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let fc = ConfigFile::from_toml_str(
            r#"
            language = "hi"

            [backend]
            url = "https://chat.example.com"

            [audio]
            recording_file_name = "take.wav"
            "#,
        )
        .unwrap();

        assert_eq!(fc.backend.url.as_deref(), Some("https://chat.example.com"));
        assert_eq!(fc.audio.recording_file_name.as_deref(), Some("take.wav"));
    }

    #[test]
    fn test_load_from_path_falls_back_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "language = [not toml").unwrap();

        let fc = load_from_path(&path);
        assert!(fc.language.is_none());
    }

    #[test]
    fn test_load_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let fc = load_from_path(&dir.path().join("absent.toml"));
        assert!(fc.backend.url.is_none());
    }
}
