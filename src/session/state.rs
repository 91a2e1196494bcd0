//! Live session state

use crate::Language;

/// What the capture subsystem is doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureMode {
    /// Not capturing
    #[default]
    Idle,
    /// Native recognizer is listening
    Listening,
    /// Fallback recorder is running (or its audio is being transcribed)
    RecordingFallback,
}

impl CaptureMode {
    /// Whether any capture is in progress
    #[must_use]
    pub fn is_active(self) -> bool {
        self != Self::Idle
    }
}

/// Language, capture mode and now-playing message of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(super) language: Language,
    pub(super) capture_mode: CaptureMode,
    pub(super) now_playing: Option<usize>,
}

impl SessionState {
    /// Fresh state in `language`
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self {
            language,
            capture_mode: CaptureMode::Idle,
            now_playing: None,
        }
    }

    /// Active conversation language
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Current capture mode
    #[must_use]
    pub const fn capture_mode(&self) -> CaptureMode {
        self.capture_mode
    }

    /// Index of the message producing (or about to produce) audio
    #[must_use]
    pub const fn now_playing(&self) -> Option<usize> {
        self.now_playing
    }
}
