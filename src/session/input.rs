//! Capture mode transitions

use super::{CaptureMode, Effect, Session};
use crate::Result;
use crate::capture::{CaptureStrategy, Recording};

impl Session {
    /// The mic action
    pub(super) fn toggle_mic(&mut self) -> Vec<Effect> {
        match (self.strategy, self.state.capture_mode) {
            (CaptureStrategy::NativeRecognition, CaptureMode::Idle) => {
                let locale = self.state.language.locale();
                tracing::info!(locale, "starting speech recognition");
                self.state.capture_mode = CaptureMode::Listening;
                vec![
                    Effect::CaptureModeChanged(CaptureMode::Listening),
                    Effect::StartRecognition { locale },
                ]
            }
            (CaptureStrategy::FallbackRecording, CaptureMode::Idle) => {
                tracing::info!("starting fallback recording");
                self.state.capture_mode = CaptureMode::RecordingFallback;
                vec![
                    Effect::CaptureModeChanged(CaptureMode::RecordingFallback),
                    Effect::StartRecording,
                ]
            }
            (CaptureStrategy::NativeRecognition, CaptureMode::Listening) => {
                tracing::info!("stopping speech recognition");
                vec![Effect::StopRecognition]
            }
            (CaptureStrategy::FallbackRecording, CaptureMode::RecordingFallback) => {
                if self.transcribing {
                    tracing::debug!("recording already stopped, awaiting transcript");
                    return Vec::new();
                }
                tracing::info!("stopping fallback recording");
                self.transcribing = true;
                vec![Effect::StopRecording]
            }
            (strategy, mode) => {
                tracing::warn!(?strategy, ?mode, "capture mode does not match strategy");
                self.reset_capture()
            }
        }
    }

    pub(super) fn on_recognition_started(&mut self) -> Vec<Effect> {
        if self.strategy != CaptureStrategy::NativeRecognition
            || self.state.capture_mode == CaptureMode::Listening
        {
            return Vec::new();
        }
        self.state.capture_mode = CaptureMode::Listening;
        vec![Effect::CaptureModeChanged(CaptureMode::Listening)]
    }

    pub(super) fn on_recording_finished(&mut self, recording: Recording) -> Vec<Effect> {
        if self.state.capture_mode != CaptureMode::RecordingFallback {
            tracing::debug!("dropping recording delivered outside a capture");
            return Vec::new();
        }

        tracing::info!(bytes = recording.bytes.len(), "recording stopped, sending to STT");
        self.transcribing = true;
        vec![Effect::Transcribe(recording)]
    }

    pub(super) fn on_transcribed(&mut self, result: Result<Option<String>>) -> Vec<Effect> {
        let mut effects = self.reset_capture();
        match result {
            Ok(Some(transcript)) => {
                effects.extend(self.begin_turn(&transcript, self.state.language));
            }
            Ok(None) => tracing::warn!("no transcript received from STT"),
            Err(e) => tracing::error!(error = %e, "STT error"),
        }
        effects
    }

    /// Return to idle after a capture ends or fails
    pub(super) fn reset_capture(&mut self) -> Vec<Effect> {
        self.transcribing = false;
        if self.state.capture_mode == CaptureMode::Idle {
            return Vec::new();
        }
        self.state.capture_mode = CaptureMode::Idle;
        vec![Effect::CaptureModeChanged(CaptureMode::Idle)]
    }
}
