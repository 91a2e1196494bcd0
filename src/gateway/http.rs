//! HTTP/JSON backend client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AudioPayload, Backend, is_audio_content_type};
use crate::capture::Recording;
use crate::{Error, Language, Result};

#[derive(Serialize)]
struct SetLanguageRequest<'a> {
    language: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
}

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct SttResponse {
    #[serde(default)]
    transcript: Option<String>,
}

/// Backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty or not http(s)
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::Config("backend URL is empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend URL must start with http:// or https://: {base_url}"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn set_language(&self, language: Language) -> Result<serde_json::Value> {
        tracing::debug!(language = %language, "setting backend language");

        let ack: serde_json::Value = self
            .client
            .post(self.endpoint("/api/set_language"))
            .json(&SetLanguageRequest {
                language: language.code(),
            })
            .send()
            .await?
            .json()
            .await?;

        tracing::debug!(response = %ack, "backend language response");
        Ok(ack)
    }

    async fn send_chat_message(&self, text: &str, language: Language) -> Result<Option<String>> {
        tracing::debug!(language = %language, chars = text.len(), "sending chat message");

        let response = self
            .client
            .post(self.endpoint("/api/process_message"))
            .json(&ChatRequest {
                message: text,
                language: language.code(),
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat endpoint error");
            return Err(Error::Chat(format!("chat endpoint returned {status}")));
        }

        let result: ChatResponse = response.json().await?;
        Ok(result.reply)
    }

    async fn synthesize_speech(&self, text: &str, language: Language) -> Result<AudioPayload> {
        tracing::debug!(language = %language, chars = text.len(), "requesting synthesis");

        let response = self
            .client
            .post(self.endpoint("/api/tts"))
            .json(&TtsRequest {
                text,
                language: language.code(),
            })
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !status.is_success() {
            return Err(Error::Tts(format!("tts endpoint returned {status}")));
        }
        if !is_audio_content_type(&content_type) {
            return Err(Error::Tts(format!(
                "tts endpoint returned non-audio content type '{content_type}'"
            )));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), content_type = %content_type, "synthesis complete");
        Ok(AudioPayload::new(content_type, audio.to_vec()))
    }

    async fn transcribe_audio(&self, recording: Recording) -> Result<Option<String>> {
        tracing::debug!(audio_bytes = recording.bytes.len(), "starting transcription");

        let part = reqwest::multipart::Part::bytes(recording.bytes)
            .file_name(recording.file_name)
            .mime_str(&recording.mime_type)
            .map_err(|e| Error::Stt(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("/api/stt"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "stt endpoint error");
            return Err(Error::Stt(format!("stt endpoint returned {status}")));
        }

        let result: SttResponse = response.json().await?;
        let transcript = result
            .transcript
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        match &transcript {
            Some(text) => tracing::info!(transcript = %text, "transcription complete"),
            None => tracing::warn!("no transcript received"),
        }
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(
            backend.endpoint("/api/tts"),
            "http://localhost:8000/api/tts"
        );
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(HttpBackend::new("  "), Err(Error::Config(_))));
        assert!(matches!(
            HttpBackend::new("ftp://example.com"),
            Err(Error::Config(_))
        ));
    }
}
