//! Voice Chat - speech and text chat client for a remote chat/TTS/STT backend
//!
//! This library provides:
//! - A session state machine for the conversation log, playback and capture
//! - A driver that runs the session against a backend, microphone and speaker
//! - An HTTP client for the backend's chat, synthesis and transcription endpoints
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Front-end                         │
//! │        Terminal  │  Microphone  │  Speaker          │
//! └────────────────────┬────────────────────────────────┘
//!                      │ events
//! ┌────────────────────▼────────────────────────────────┐
//! │                     Driver                           │
//! │   Session (log │ playback │ capture mode)           │
//! └────────────────────┬────────────────────────────────┘
//!                      │ effects
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Backend (HTTP)                       │
//! │   set_language  │  chat  │  TTS  │  STT             │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod capture;
pub mod config;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod language;
pub mod session;
pub mod terminal;

pub use audio::{AudioOutput, SpeakerOutput};
pub use capture::{AudioRecorder, Capture, CaptureStrategy, MicrophoneRecorder, Recording, SpeechRecognizer};
pub use config::Config;
pub use driver::{Driver, SessionView};
pub use error::{Error, Result};
pub use gateway::{AudioPayload, Backend, HttpBackend};
pub use language::{Language, locale_for_code};
pub use session::{
    CaptureMode, Effect, Event, EventSender, Message, PlaybackId, Sender, Session, SynthesisId,
    TurnId,
};
