//! Playback to the default output device

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use super::{AudioOutput, DecodedAudio, decode};
use crate::gateway::AudioPayload;
use crate::session::{Event, EventSender, PlaybackId};
use crate::{Error, Result};

/// Poll interval while waiting for a playback to drain
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Grace period past the nominal duration before giving up
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Renders decoded audio on the calling thread until it drains or `stop` is set
type Player = Arc<dyn Fn(DecodedAudio, Arc<AtomicBool>) -> Result<()> + Send + Sync>;

struct ActivePlayback {
    id: PlaybackId,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Renders payloads on the default speaker, one at a time
///
/// Each playback runs on its own thread; the cpal stream is created there and
/// dropped when the audio drains or the stop flag is raised. [`AudioOutput::stop`]
/// joins that thread, so a replaced stream is gone before the next one opens.
pub struct SpeakerOutput {
    player: Player,
    current: Option<ActivePlayback>,
}

impl SpeakerOutput {
    /// Create an idle speaker output
    #[must_use]
    pub fn new() -> Self {
        Self::with_player(Arc::new(Self::play_blocking))
    }

    fn with_player(player: Player) -> Self {
        Self {
            player,
            current: None,
        }
    }

    /// Play decoded samples to completion on the calling thread
    ///
    /// The output callback writes silence as soon as `stop` is raised.
    ///
    /// # Errors
    ///
    /// Returns error if no output device or config is available
    pub fn play_blocking(audio: DecodedAudio, stop: Arc<AtomicBool>) -> Result<()> {
        if audio.samples.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;
        let config = output_config(&device, audio.sample_rate)?;
        let channels = usize::from(config.channels);

        let duration = Duration::from_millis(audio.duration_ms());
        let sample_count = audio.samples.len();
        let finished = Arc::new(AtomicBool::new(false));
        let finished_cb = Arc::clone(&finished);
        let stop_requested = Arc::clone(&stop);
        let samples = audio.samples;
        let mut position = 0usize;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let silenced = stop.load(Ordering::Acquire);
                    if fill_frames(data, channels, &samples, &mut position, silenced) {
                        finished_cb.store(true, Ordering::Release);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        let start = Instant::now();
        let timeout = duration + DRAIN_GRACE;
        while !finished.load(Ordering::Acquire) && !stop_requested.load(Ordering::Acquire) {
            if start.elapsed() > timeout {
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        drop(stream);
        tracing::debug!(samples = sample_count, "playback complete");
        Ok(())
    }
}

impl Default for SpeakerOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpeakerOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeakerOutput")
            .field("current", &self.current.as_ref().map(|p| p.id))
            .finish_non_exhaustive()
    }
}

impl AudioOutput for SpeakerOutput {
    fn play(&mut self, id: PlaybackId, audio: AudioPayload, events: EventSender) -> Result<()> {
        self.stop();

        let decoded = decode(&audio)?;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let player = Arc::clone(&self.player);

        tracing::debug!(
            %id,
            sample_rate = decoded.sample_rate,
            duration_ms = decoded.duration_ms(),
            "starting playback"
        );

        let thread = std::thread::Builder::new()
            .name(format!("playback-{id}"))
            .spawn(move || {
                let result = player(decoded, Arc::clone(&stop_flag));
                if stop_flag.load(Ordering::Acquire) {
                    return;
                }
                let event = match result {
                    Ok(()) => Event::PlaybackEnded { id },
                    Err(e) => Event::PlaybackFailed {
                        id,
                        error: e.to_string(),
                    },
                };
                let _ = events.send(event);
            })?;

        self.current = Some(ActivePlayback { id, stop, thread });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(playback) = self.current.take() {
            playback.stop.store(true, Ordering::Release);
            if playback.thread.join().is_err() {
                tracing::warn!(id = %playback.id, "playback thread panicked");
            }
            tracing::debug!(id = %playback.id, "playback stopped");
        }
    }
}

/// Fill one output buffer, duplicating each mono sample across `channels`
///
/// Writes silence once `silenced` is set or the samples run out. Returns true
/// when every sample has been rendered.
fn fill_frames(
    data: &mut [f32],
    channels: usize,
    samples: &[f32],
    position: &mut usize,
    silenced: bool,
) -> bool {
    if silenced {
        data.fill(0.0);
        return false;
    }

    for frame in data.chunks_mut(channels.max(1)) {
        let sample = samples.get(*position).copied().unwrap_or(0.0);
        frame.fill(sample);
        if *position < samples.len() {
            *position += 1;
        }
    }
    *position >= samples.len()
}

/// Pick a mono or stereo output config that supports `sample_rate`
fn output_config(device: &cpal::Device, sample_rate: u32) -> Result<StreamConfig> {
    let rate = SampleRate(sample_rate);
    let supports = |channels: u16| {
        device.supported_output_configs().ok()?.find(|c| {
            c.channels() == channels && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate
        })
    };

    supports(1)
        .or_else(|| supports(2))
        .map(|c| c.with_sample_rate(rate).config())
        .ok_or_else(|| Error::Audio(format!("no output config supports {sample_rate} Hz")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::samples_to_wav;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc;

    fn wav_payload() -> AudioPayload {
        let wav = samples_to_wav(&[0.1, 0.2, 0.3, 0.4], 16000).unwrap();
        AudioPayload::new("audio/wav", wav)
    }

    /// Player that holds its "stream" open until stopped, tracking overlap
    #[derive(Default)]
    struct LiveStreams {
        live: AtomicUsize,
        max_live: AtomicUsize,
        opened: Mutex<Vec<usize>>,
    }

    fn holding_player(streams: &Arc<LiveStreams>) -> Player {
        let streams = Arc::clone(streams);
        Arc::new(move |_audio: DecodedAudio, stop: Arc<AtomicBool>| -> Result<()> {
            let live = streams.live.fetch_add(1, Ordering::SeqCst) + 1;
            streams.max_live.fetch_max(live, Ordering::SeqCst);
            streams.opened.lock().unwrap().push(live);

            let start = Instant::now();
            while !stop.load(Ordering::Acquire) && start.elapsed() < Duration::from_secs(5) {
                std::thread::sleep(Duration::from_millis(1));
            }
            streams.live.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_play_after_play_releases_first_stream() {
        let streams = Arc::new(LiveStreams::default());
        let mut output = SpeakerOutput::with_player(holding_player(&streams));
        let (tx, mut rx) = mpsc::unbounded_channel();

        output.play(PlaybackId(0), wav_payload(), tx.clone()).unwrap();
        output.play(PlaybackId(1), wav_payload(), tx).unwrap();
        output.stop();

        assert_eq!(streams.live.load(Ordering::SeqCst), 0);
        assert_eq!(streams.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(*streams.opened.lock().unwrap(), vec![1, 1]);
        // Stopped playbacks report nothing
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stop_releases_stream_before_returning() {
        let streams = Arc::new(LiveStreams::default());
        let mut output = SpeakerOutput::with_player(holding_player(&streams));
        let (tx, _rx) = mpsc::unbounded_channel();

        output.play(PlaybackId(3), wav_payload(), tx).unwrap();
        output.stop();

        assert_eq!(streams.live.load(Ordering::SeqCst), 0);
        assert!(output.current.is_none());
    }

    #[test]
    fn test_natural_end_posts_event() {
        let mut output = SpeakerOutput::with_player(Arc::new(
            |_audio: DecodedAudio, _stop: Arc<AtomicBool>| -> Result<()> { Ok(()) },
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();

        output.play(PlaybackId(7), wav_payload(), tx).unwrap();
        let thread = output.current.take().unwrap().thread;
        thread.join().unwrap();

        assert!(matches!(
            rx.try_recv(),
            Ok(Event::PlaybackEnded { id: PlaybackId(7) })
        ));
    }

    #[test]
    fn test_fill_frames_duplicates_across_channels() {
        let samples = [0.5, -0.5];
        let mut position = 0;
        let mut data = [1.0f32; 6];

        let done = fill_frames(&mut data, 2, &samples, &mut position, false);

        assert!(done);
        assert_eq!(data, [0.5, 0.5, -0.5, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_frames_silenced_writes_zeros() {
        let samples = [0.5, 0.5, 0.5];
        let mut position = 1;
        let mut data = [1.0f32; 4];

        let done = fill_frames(&mut data, 1, &samples, &mut position, true);

        assert!(!done);
        assert_eq!(data, [0.0; 4]);
        assert_eq!(position, 1);
    }
}
