//! Events consumed and effects produced by the session state machine

use std::fmt;

use tokio::sync::mpsc;

use super::CaptureMode;
use crate::capture::Recording;
use crate::gateway::AudioPayload;
use crate::{Language, Result};

/// Channel over which devices and background requests report back
pub type EventSender = mpsc::UnboundedSender<Event>;

/// Receiving half of the session event channel
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Correlates the requests of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

/// Identifies one started playback resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(pub u64);

impl fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback-{}", self.0)
    }
}

/// Identifies one synthesis requested by a play action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SynthesisId(pub u64);

impl fmt::Display for SynthesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "synthesis-{}", self.0)
    }
}

/// Everything that can happen to a session
#[derive(Debug)]
pub enum Event {
    /// Text entered directly by the user
    Submit(String),
    /// The mic action: start capture when idle, stop it when active
    ToggleMic,
    /// The play action on the message at this index
    Play(usize),
    /// Switch conversation language
    SetLanguage(Language),
    /// Stop the driver loop
    Shutdown,

    /// Native recognizer began listening
    RecognitionStarted,
    /// Native recognizer produced its final transcript
    RecognitionResult(String),
    /// Native recognizer stopped listening
    RecognitionEnded,
    /// Native recognizer reported an error
    RecognitionFailed(String),
    /// A capture device could not start or stop
    CaptureFailed(String),
    /// The fallback recorder packaged its audio
    RecordingFinished(Recording),

    /// Backend acknowledged (or rejected) a language push
    LanguagePushed {
        /// Language that was pushed
        language: Language,
        /// Backend response
        result: Result<serde_json::Value>,
    },
    /// Chat reply for a turn
    ChatReplied {
        /// Turn the reply belongs to
        turn: TurnId,
        /// Language the turn was submitted in
        language: Language,
        /// Reply text, absent if the backend sent none
        result: Result<Option<String>>,
    },
    /// Synthesis of a turn's reply finished
    ReplySynthesized {
        /// Turn the reply belongs to
        turn: TurnId,
        /// Reply text that was synthesized
        reply: String,
        /// Synthesized audio
        result: Result<AudioPayload>,
    },
    /// Synthesis requested by a play action finished
    PlaybackSynthesized {
        /// Request being answered
        request: SynthesisId,
        /// Message the audio belongs to
        index: usize,
        /// Synthesized audio
        result: Result<AudioPayload>,
    },
    /// Backend transcription of a recording finished
    Transcribed(Result<Option<String>>),

    /// Playback reached the end of the audio
    PlaybackEnded {
        /// Playback that ended
        id: PlaybackId,
    },
    /// Playback broke off with an error
    PlaybackFailed {
        /// Playback that failed
        id: PlaybackId,
        /// Failure description
        error: String,
    },
}

impl Event {
    /// Whether this event completes a backend request issued by an [`Effect`]
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        matches!(
            self,
            Self::LanguagePushed { .. }
                | Self::ChatReplied { .. }
                | Self::ReplySynthesized { .. }
                | Self::PlaybackSynthesized { .. }
                | Self::Transcribed(_)
        )
    }
}

/// Output of a state transition: work for the driver, or news for the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Push the language preference to the backend
    PushLanguage(Language),
    /// Start the native recognizer
    StartRecognition {
        /// Locale tag for this capture
        locale: &'static str,
    },
    /// Stop the native recognizer
    StopRecognition,
    /// Start the fallback recorder
    StartRecording,
    /// Stop the fallback recorder and package its audio
    StopRecording,
    /// Send a recording for transcription
    Transcribe(Recording),
    /// Request a chat reply
    RequestChat {
        /// Turn being executed
        turn: TurnId,
        /// User utterance
        text: String,
        /// Language of the turn
        language: Language,
    },
    /// Synthesize a turn's reply before it is appended
    SynthesizeReply {
        /// Turn being executed
        turn: TurnId,
        /// Reply text
        reply: String,
        /// Language of the turn
        language: Language,
    },
    /// Synthesize an uncached message for playback
    SynthesizeForPlayback {
        /// New synthesis request
        request: SynthesisId,
        /// Message index
        index: usize,
        /// Message text
        text: String,
        /// Current language
        language: Language,
    },
    /// Start rendering audio
    StartPlayback {
        /// New playback resource
        id: PlaybackId,
        /// Message being played
        index: usize,
        /// Audio to render
        audio: AudioPayload,
    },
    /// Tear down the live playback resource
    StopPlayback,

    /// A message was appended at this index
    MessageAppended(usize),
    /// The now-playing message changed
    NowPlayingChanged(Option<usize>),
    /// Capture mode changed
    CaptureModeChanged(CaptureMode),
    /// Conversation language changed
    LanguageChanged(Language),
}

impl Effect {
    /// Whether the effect only informs the view
    #[must_use]
    pub const fn is_notice(&self) -> bool {
        matches!(
            self,
            Self::MessageAppended(_)
                | Self::NowPlayingChanged(_)
                | Self::CaptureModeChanged(_)
                | Self::LanguageChanged(_)
        )
    }
}
