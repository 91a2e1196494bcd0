//! Backend gateway
//!
//! The chat, synthesis and transcription endpoints the session depends on.
//! Every call is a single attempt; retry policy (there is none) lives with the
//! caller.

mod http;

use std::sync::Arc;

use async_trait::async_trait;

pub use http::HttpBackend;

use crate::capture::Recording;
use crate::{Language, Result};

/// Synthesized audio returned by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    /// Response content type (e.g. `audio/mpeg`)
    pub content_type: String,

    /// Raw encoded audio
    pub bytes: Arc<[u8]>,
}

impl AudioPayload {
    /// Create a payload from a content type and encoded bytes
    #[must_use]
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether the content type denotes audio
    #[must_use]
    pub fn is_audio(&self) -> bool {
        is_audio_content_type(&self.content_type)
    }

    /// Payload size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload carries no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Synthesis responses only count when their content type mentions audio
#[must_use]
pub fn is_audio_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("audio")
}

/// Remote chat/TTS/STT backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Push the preferred language; the response is only of diagnostic interest
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    async fn set_language(&self, language: Language) -> Result<serde_json::Value>;

    /// Run one chat turn, returning the reply text if the backend supplied one
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status
    async fn send_chat_message(&self, text: &str, language: Language) -> Result<Option<String>>;

    /// Synthesize speech for `text`
    ///
    /// # Errors
    ///
    /// Returns error on a non-success status or a non-audio response
    async fn synthesize_speech(&self, text: &str, language: Language) -> Result<AudioPayload>;

    /// Transcribe a recording; `None` means the backend heard nothing
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    async fn transcribe_audio(&self, recording: Recording) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_content_type() {
        assert!(is_audio_content_type("audio/mpeg"));
        assert!(is_audio_content_type("Audio/WAV; charset=binary"));
        assert!(!is_audio_content_type("application/json"));
        assert!(!is_audio_content_type(""));
    }

    #[test]
    fn test_payload() {
        let payload = AudioPayload::new("audio/mpeg", vec![1u8, 2, 3]);
        assert!(payload.is_audio());
        assert_eq!(payload.len(), 3);
        assert!(!payload.is_empty());
    }
}
