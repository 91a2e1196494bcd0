//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use voice_chat::{
    AudioOutput, AudioPayload, AudioRecorder, Backend, Error, Event, EventSender, Language,
    PlaybackId, Recording, Result, SpeechRecognizer,
};

/// A call received by [`FakeBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetLanguage(Language),
    Chat(String, Language),
    Tts(String, Language),
    Stt(usize),
}

/// Scripted backend that records every call
pub struct FakeBackend {
    chat_reply: Mutex<Option<Option<String>>>,
    tts_content_type: Mutex<Option<String>>,
    transcript: Mutex<Option<String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    /// Chat replies "hi there", synthesis returns `audio/mpeg`, STT hears nothing
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            chat_reply: Mutex::new(Some(Some("hi there".to_string()))),
            tts_content_type: Mutex::new(Some("audio/mpeg".to_string())),
            transcript: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// `Some(reply)` answers with that reply field, `None` fails like an HTTP 500
    pub fn set_chat(&self, reply: Option<Option<&str>>) {
        *self.chat_reply.lock().unwrap() = reply.map(|r| r.map(ToString::to_string));
    }

    /// `Some(content_type)` answers with that content type, `None` fails
    pub fn set_tts(&self, content_type: Option<&str>) {
        *self.tts_content_type.lock().unwrap() = content_type.map(ToString::to_string);
    }

    pub fn set_transcript(&self, transcript: Option<&str>) {
        *self.transcript.lock().unwrap() = transcript.map(ToString::to_string);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tts_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Tts(..)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Bytes returned by [`FakeBackend`] synthesis
pub const FAKE_AUDIO: &[u8] = &[0xFF, 0xFB, 0x90, 0x00];

#[async_trait]
impl Backend for FakeBackend {
    async fn set_language(&self, language: Language) -> Result<serde_json::Value> {
        self.record(Call::SetLanguage(language));
        Ok(serde_json::json!({ "status": "ok" }))
    }

    async fn send_chat_message(&self, text: &str, language: Language) -> Result<Option<String>> {
        self.record(Call::Chat(text.to_string(), language));
        self.chat_reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Chat("chat endpoint returned 500 Internal Server Error".to_string()))
    }

    async fn synthesize_speech(&self, text: &str, language: Language) -> Result<AudioPayload> {
        self.record(Call::Tts(text.to_string(), language));
        let content_type = self
            .tts_content_type
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Tts("tts endpoint returned 503".to_string()))?;
        Ok(AudioPayload::new(content_type, FAKE_AUDIO))
    }

    async fn transcribe_audio(&self, recording: Recording) -> Result<Option<String>> {
        self.record(Call::Stt(recording.bytes.len()));
        Ok(self.transcript.lock().unwrap().clone())
    }
}

/// A call received by [`FakeOutput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCall {
    Play(PlaybackId),
    Stop,
}

/// Audio output that only records what it was asked to do
#[derive(Clone, Default)]
pub struct FakeOutput {
    pub calls: Arc<Mutex<Vec<OutputCall>>>,
}

impl FakeOutput {
    pub fn calls(&self) -> Vec<OutputCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl AudioOutput for FakeOutput {
    fn play(&mut self, id: PlaybackId, _audio: AudioPayload, _events: EventSender) -> Result<()> {
        self.calls.lock().unwrap().push(OutputCall::Play(id));
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(OutputCall::Stop);
    }
}

/// Recorder returning a fixed recording
#[derive(Clone, Default)]
pub struct FakeRecorder {
    pub fail_start: bool,
    pub starts: Arc<Mutex<usize>>,
    recording: Arc<Mutex<bool>>,
}

impl FakeRecorder {
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn starts(&self) -> usize {
        *self.starts.lock().unwrap()
    }
}

impl AudioRecorder for FakeRecorder {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(Error::Capture("permission denied".to_string()));
        }
        *self.starts.lock().unwrap() += 1;
        *self.recording.lock().unwrap() = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<Recording> {
        let mut recording = self.recording.lock().unwrap();
        if !*recording {
            return Err(Error::Capture("not recording".to_string()));
        }
        *recording = false;
        Ok(Recording {
            bytes: vec![0u8; 128],
            mime_type: "audio/wav".to_string(),
            file_name: "recording.wav".to_string(),
        })
    }
}

/// Recognizer that immediately reports a scripted outcome
#[derive(Clone, Default)]
pub struct FakeRecognizer {
    /// Transcript to deliver; `None` delivers a recognizer error instead
    pub transcript: Option<String>,
    pub locales: Arc<Mutex<Vec<String>>>,
}

impl FakeRecognizer {
    pub fn hearing(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            ..Self::default()
        }
    }

    pub fn locales(&self) -> Vec<String> {
        self.locales.lock().unwrap().clone()
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn start(&mut self, locale: &str, events: EventSender) -> Result<()> {
        self.locales.lock().unwrap().push(locale.to_string());
        let _ = events.send(Event::RecognitionStarted);
        match &self.transcript {
            Some(transcript) => {
                let _ = events.send(Event::RecognitionResult(transcript.clone()));
                let _ = events.send(Event::RecognitionEnded);
            }
            None => {
                let _ = events.send(Event::RecognitionFailed("no-speech".to_string()));
            }
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}
