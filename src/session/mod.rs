//! Conversation and playback session state machine
//!
//! [`Session::update`] is the only place state changes. It consumes one
//! [`Event`] (a user intent, a device lifecycle event or a backend completion)
//! and returns the [`Effect`]s the driver must carry out. The session itself
//! never performs IO.

mod event;
mod input;
mod log;
mod playback;
mod state;
mod turn;

pub use event::{Effect, Event, EventReceiver, EventSender, PlaybackId, SynthesisId, TurnId};
pub use log::{ConversationLog, Message, Sender};
pub use state::{CaptureMode, SessionState};
pub use turn::{CHAT_ERROR_TEXT, NO_REPLY_TEXT};

use crate::Language;
use crate::capture::CaptureStrategy;

/// One user's conversation with the backend
#[derive(Debug, Clone)]
pub struct Session {
    strategy: CaptureStrategy,
    state: SessionState,
    log: ConversationLog,
    live_playback: Option<PlaybackId>,
    awaited_synthesis: Option<SynthesisId>,
    transcribing: bool,
    next_turn: u64,
    next_playback: u64,
    next_synthesis: u64,
}

impl Session {
    /// Create a session using `strategy` for speech input
    #[must_use]
    pub const fn new(strategy: CaptureStrategy, language: Language) -> Self {
        Self {
            strategy,
            state: SessionState::new(language),
            log: ConversationLog::new(),
            live_playback: None,
            awaited_synthesis: None,
            transcribing: false,
            next_turn: 0,
            next_playback: 0,
            next_synthesis: 0,
        }
    }

    /// Effects to run once when the session comes up
    #[must_use]
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::PushLanguage(self.state.language)]
    }

    /// Apply one event and return the resulting effects
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Submit(text) => self.begin_turn(&text, self.state.language),
            Event::ToggleMic => self.toggle_mic(),
            Event::Play(index) => self.play(index),
            Event::SetLanguage(language) => self.set_language(language),
            Event::Shutdown => Vec::new(),

            Event::RecognitionStarted => self.on_recognition_started(),
            Event::RecognitionResult(transcript) => {
                self.begin_turn(&transcript, self.state.language)
            }
            Event::RecognitionEnded => self.reset_capture(),
            Event::RecognitionFailed(error) => {
                tracing::warn!(error = %error, "speech recognition error");
                self.reset_capture()
            }
            Event::CaptureFailed(error) => {
                tracing::warn!(error = %error, "capture error");
                self.reset_capture()
            }
            Event::RecordingFinished(recording) => self.on_recording_finished(recording),
            Event::Transcribed(result) => self.on_transcribed(result),

            Event::LanguagePushed { language, result } => {
                match result {
                    Ok(ack) => tracing::debug!(language = %language, response = %ack, "backend language set"),
                    Err(e) => tracing::warn!(language = %language, error = %e, "failed to set backend language"),
                }
                Vec::new()
            }
            Event::ChatReplied {
                turn,
                language,
                result,
            } => self.on_chat_replied(turn, language, result),
            Event::ReplySynthesized {
                turn,
                reply,
                result,
            } => self.on_reply_synthesized(turn, reply, result),
            Event::PlaybackSynthesized {
                request,
                index,
                result,
            } => self.on_playback_synthesized(request, index, result),
            Event::PlaybackEnded { id } => self.on_playback_finished(id, None),
            Event::PlaybackFailed { id, error } => self.on_playback_finished(id, Some(error)),
        }
    }

    fn set_language(&mut self, language: Language) -> Vec<Effect> {
        if language == self.state.language {
            return Vec::new();
        }

        tracing::info!(language = %language, locale = language.locale(), "language changed");
        self.state.language = language;
        vec![
            Effect::LanguageChanged(language),
            Effect::PushLanguage(language),
        ]
    }

    /// Capture strategy fixed at construction
    #[must_use]
    pub const fn strategy(&self) -> CaptureStrategy {
        self.strategy
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Conversation so far
    #[must_use]
    pub const fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Active conversation language
    #[must_use]
    pub const fn language(&self) -> Language {
        self.state.language
    }

    /// Current capture mode
    #[must_use]
    pub const fn capture_mode(&self) -> CaptureMode {
        self.state.capture_mode
    }

    /// Index of the now-playing message
    #[must_use]
    pub const fn now_playing(&self) -> Option<usize> {
        self.state.now_playing
    }

    /// Whether a playback resource is live
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.live_playback.is_some()
    }

    /// Whether a fallback recording is awaiting transcription
    #[must_use]
    pub const fn is_transcribing(&self) -> bool {
        self.transcribing
    }
}
