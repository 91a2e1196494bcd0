//! Single-flight playback with per-message toggle

use super::{Effect, Message, PlaybackId, Session, SynthesisId};
use crate::Result;
use crate::gateway::AudioPayload;

impl Session {
    /// Toggle playback of the bot message at `index`
    pub(super) fn play(&mut self, index: usize) -> Vec<Effect> {
        let Some(message) = self.log.get(index) else {
            tracing::debug!(index, "play requested for unknown message");
            return Vec::new();
        };
        if !message.is_bot() {
            tracing::debug!(index, "play requested for user message");
            return Vec::new();
        }

        if self.state.now_playing == Some(index) {
            tracing::debug!(index, "stopping playback");
            return self.stop_playback();
        }

        let cached = message.audio().cloned();
        let text = message.text().to_string();

        let mut effects = self.stop_playback();
        self.state.now_playing = Some(index);
        effects.push(Effect::NowPlayingChanged(Some(index)));

        match cached {
            Some(audio) => effects.push(self.start_playback(index, audio)),
            None => {
                let request = SynthesisId(self.next_synthesis);
                self.next_synthesis += 1;
                self.awaited_synthesis = Some(request);
                tracing::debug!(%request, index, language = %self.state.language, "generating audio for message");
                effects.push(Effect::SynthesizeForPlayback {
                    request,
                    index,
                    text,
                    language: self.state.language,
                });
            }
        }
        effects
    }

    /// Tear down the live resource (if any) and clear the now-playing index
    fn stop_playback(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.awaited_synthesis = None;
        if self.live_playback.take().is_some() {
            effects.push(Effect::StopPlayback);
        }
        if self.state.now_playing.take().is_some() {
            effects.push(Effect::NowPlayingChanged(None));
        }
        effects
    }

    fn start_playback(&mut self, index: usize, audio: AudioPayload) -> Effect {
        let id = PlaybackId(self.next_playback);
        self.next_playback += 1;
        self.live_playback = Some(id);
        Effect::StartPlayback { id, index, audio }
    }

    pub(super) fn on_playback_synthesized(
        &mut self,
        request: SynthesisId,
        index: usize,
        result: Result<AudioPayload>,
    ) -> Vec<Effect> {
        let failure = match result {
            Ok(audio) if audio.is_audio() => {
                // Cached even when the user has moved on to another message
                if self.log.cache_audio(index, audio) {
                    tracing::debug!(index, "cached synthesized audio");
                }

                let waiting = self.state.now_playing == Some(index) && self.live_playback.is_none();
                let cached = self.log.get(index).and_then(Message::audio).cloned();
                return match cached {
                    Some(audio) if waiting => {
                        self.awaited_synthesis = None;
                        vec![self.start_playback(index, audio)]
                    }
                    _ => Vec::new(),
                };
            }
            Ok(audio) => format!("non-audio content type '{}'", audio.content_type),
            Err(e) => e.to_string(),
        };

        tracing::warn!(%request, index, error = %failure, "playback synthesis failed");
        // Only the request the current play is waiting on may cancel it
        if self.awaited_synthesis == Some(request)
            && self.state.now_playing == Some(index)
            && self.live_playback.is_none()
        {
            self.awaited_synthesis = None;
            self.state.now_playing = None;
            return vec![Effect::NowPlayingChanged(None)];
        }
        Vec::new()
    }

    pub(super) fn on_playback_finished(
        &mut self,
        id: PlaybackId,
        error: Option<String>,
    ) -> Vec<Effect> {
        if self.live_playback != Some(id) {
            tracing::trace!(%id, "ignoring event from released playback");
            return Vec::new();
        }

        match error {
            Some(e) => tracing::warn!(%id, error = %e, "audio playback error"),
            None => tracing::debug!(%id, "playback finished"),
        }

        self.live_playback = None;
        if self.state.now_playing.take().is_some() {
            return vec![Effect::NowPlayingChanged(None)];
        }
        Vec::new()
    }
}
