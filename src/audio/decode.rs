//! Decoding of synthesized audio payloads

use std::io::Cursor;

use crate::gateway::AudioPayload;
use crate::{Error, Result};

/// Mono PCM samples ready for playback
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Samples in `[-1.0, 1.0]`
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Playback duration in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000) / u64::from(self.sample_rate)
    }
}

/// Decode a WAV or MP3 payload to mono samples
///
/// # Errors
///
/// Returns error if the payload is empty or cannot be decoded
pub fn decode(audio: &AudioPayload) -> Result<DecodedAudio> {
    if audio.is_empty() {
        return Err(Error::Audio("empty audio payload".to_string()));
    }

    let content_type = audio.content_type.to_ascii_lowercase();
    if content_type.contains("wav") || audio.bytes.starts_with(b"RIFF") {
        decode_wav(&audio.bytes)
    } else {
        decode_mp3(&audio.bytes)
    }
}

#[allow(clippy::cast_precision_loss)]
fn decode_wav(data: &[u8]) -> Result<DecodedAudio> {
    let reader = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?
        }
    };

    Ok(DecodedAudio {
        samples: downmix(&interleaved, channels),
        sample_rate: spec.sample_rate,
    })
}

fn decode_mp3(data: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(data));
    let mut samples = Vec::new();
    let mut sample_rate = 0_u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = u32::try_from(frame.sample_rate).unwrap_or(0);
                }
                let pcm: Vec<f32> = frame.data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                samples.extend(downmix(&pcm, frame.channels));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(Error::Audio("MP3 payload contained no frames".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Average interleaved channels down to mono
#[allow(clippy::cast_precision_loss)]
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::samples_to_wav;

    #[test]
    fn test_decode_wav_payload() {
        let wav = samples_to_wav(&[0.0, 0.5, -0.5], 16000).unwrap();
        let decoded = decode(&AudioPayload::new("audio/wav", wav)).unwrap();

        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.samples.len(), 3);
        assert!((decoded.samples[1] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_decode_sniffs_riff_header() {
        let wav = samples_to_wav(&[0.25; 160], 8000).unwrap();
        let decoded = decode(&AudioPayload::new("audio/mpeg", wav)).unwrap();
        assert_eq!(decoded.duration_ms(), 20);
    }

    #[test]
    fn test_decode_rejects_empty_and_garbage() {
        assert!(decode(&AudioPayload::new("audio/mpeg", Vec::new())).is_err());
        assert!(decode(&AudioPayload::new("audio/mpeg", vec![0u8; 64])).is_err());
    }

    #[test]
    fn test_downmix_stereo() {
        assert_eq!(downmix(&[1.0, 0.0, 0.5, 0.5], 2), vec![0.5, 0.5]);
    }
}
