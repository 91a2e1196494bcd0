//! Audio output for synthesized replies

mod decode;
mod speaker;

pub use decode::{DecodedAudio, decode};
pub use speaker::SpeakerOutput;

use crate::Result;
use crate::gateway::AudioPayload;
use crate::session::{EventSender, PlaybackId};

/// A sink that renders one payload at a time
///
/// When playback of `id` finishes on its own the output posts
/// `Event::PlaybackEnded`, or `Event::PlaybackFailed` if rendering broke.
/// Nothing is posted for a playback torn down by [`AudioOutput::stop`].
pub trait AudioOutput {
    /// Start rendering `audio`, replacing anything still playing
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be decoded or playback cannot start
    fn play(&mut self, id: PlaybackId, audio: AudioPayload, events: EventSender) -> Result<()>;

    /// Stop the current playback and release its resources
    fn stop(&mut self);
}
