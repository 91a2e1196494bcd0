//! Speech input capture
//!
//! Two strategies exist and one is chosen when the session starts:
//! a native recognizer that produces transcripts directly, or a recorder whose
//! audio is transcribed by the backend.

mod recorder;

pub use recorder::{MicrophoneRecorder, RECORDING_MIME_TYPE, SAMPLE_RATE, samples_to_wav};

use crate::Result;
use crate::session::EventSender;

/// File name used for recordings when none is configured
pub const DEFAULT_RECORDING_FILE_NAME: &str = "recording.wav";

/// A finished recording, packaged for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Encoded audio
    pub bytes: Vec<u8>,

    /// MIME type of `bytes`
    pub mime_type: String,

    /// File name presented to the transcription endpoint
    pub file_name: String,
}

/// Recognizer that turns live speech into text on its own
///
/// Implementations report their lifecycle through the event sender:
/// `RecognitionStarted`, at most one `RecognitionResult`, then
/// `RecognitionEnded` (or `RecognitionFailed`).
pub trait SpeechRecognizer {
    /// Begin listening in `locale` (e.g. `"ta-IN"`)
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer cannot start
    fn start(&mut self, locale: &str, events: EventSender) -> Result<()>;

    /// Stop listening; the recognizer still reports `RecognitionEnded`
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer cannot be stopped
    fn stop(&mut self) -> Result<()>;
}

/// Recorder that accumulates raw audio until stopped
pub trait AudioRecorder {
    /// Start accumulating audio
    ///
    /// # Errors
    ///
    /// Returns error if the input device cannot be opened
    fn start(&mut self) -> Result<()>;

    /// Stop and package everything captured since `start`
    ///
    /// # Errors
    ///
    /// Returns error if nothing was recording or encoding fails
    fn stop(&mut self) -> Result<Recording>;
}

/// Which capture strategy a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStrategy {
    /// Transcripts come straight from a local recognizer
    NativeRecognition,
    /// Audio is recorded and transcribed by the backend
    FallbackRecording,
}

/// The capture capability selected for a session
pub enum Capture {
    /// Native speech recognition
    NativeRecognition(Box<dyn SpeechRecognizer>),
    /// Recording with server-side transcription
    FallbackRecording(Box<dyn AudioRecorder>),
}

impl Capture {
    /// Prefer a native recognizer when the platform has one
    #[must_use]
    pub fn select<F>(native: Option<Box<dyn SpeechRecognizer>>, fallback: F) -> Self
    where
        F: FnOnce() -> Box<dyn AudioRecorder>,
    {
        match native {
            Some(recognizer) => {
                tracing::info!("using native speech recognition");
                Self::NativeRecognition(recognizer)
            }
            None => {
                tracing::info!("speech recognition not available, using fallback recording");
                Self::FallbackRecording(fallback())
            }
        }
    }

    /// Strategy implemented by this capability
    #[must_use]
    pub const fn strategy(&self) -> CaptureStrategy {
        match self {
            Self::NativeRecognition(_) => CaptureStrategy::NativeRecognition,
            Self::FallbackRecording(_) => CaptureStrategy::FallbackRecording,
        }
    }
}

impl std::fmt::Debug for Capture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Capture").field(&self.strategy()).finish()
    }
}
