//! Audio decoding using symphonia.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded audio data.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Audio samples as mono f32 in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration_secs: f32,
}

/// Decode an audio file to mono f32 samples.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        name: name.clone(),
        source: Box::new(e),
    })?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_source(Box::new(file), hint, &name)
}

/// Decode an in-memory audio buffer to mono f32 samples.
///
/// `extension` hints the container format the way a file extension would
/// (e.g. `"wav"`); `name` only labels errors.
pub fn decode_audio_bytes(bytes: Vec<u8>, extension: &str, name: &str) -> Result<DecodedAudio> {
    let mut hint = Hint::new();
    hint.with_extension(extension);
    decode_source(Box::new(Cursor::new(bytes)), hint, name)
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint, name: &str) -> Result<DecodedAudio> {
    let mss = MediaSourceStream::new(source, MediaSourceStreamOptions::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            name: name.to_string(),
            source: Box::new(e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            name: name.to_string(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            name: name.to_string(),
            source: "missing sample rate".into(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            name: name.to_string(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    name: name.to_string(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|e| Error::AudioDecode {
            name: name.to_string(),
            source: Box::new(e),
        })?;

        mix_to_mono(&decoded, channels, &mut samples);
    }

    #[allow(clippy::cast_precision_loss)]
    let duration_secs = samples.len() as f32 / sample_rate as f32;

    Ok(DecodedAudio {
        samples,
        sample_rate,
        duration_secs,
    })
}

/// Append one decoded buffer to the output, averaging channels to mono.
fn mix_to_mono(buffer: &AudioBufferRef, channels: usize, output: &mut Vec<f32>) {
    #[allow(clippy::cast_precision_loss)]
    let channel_norm = channels as f32;

    match buffer {
        AudioBufferRef::F32(buf) => {
            if channels == 1 {
                output.extend(buf.chan(0));
            } else {
                for i in 0..buf.frames() {
                    let sum: f32 = (0..channels).map(|ch| buf.chan(ch)[i]).sum();
                    output.push(sum / channel_norm);
                }
            }
        }
        AudioBufferRef::S16(buf) => {
            const I16_NORM: f32 = 32768.0;
            if channels == 1 {
                output.extend(buf.chan(0).iter().map(|&s| f32::from(s) / I16_NORM));
            } else {
                for i in 0..buf.frames() {
                    let sum: f32 = (0..channels)
                        .map(|ch| f32::from(buf.chan(ch)[i]) / I16_NORM)
                        .sum();
                    output.push(sum / channel_norm);
                }
            }
        }
        AudioBufferRef::S32(buf) => {
            const I32_NORM: f32 = 2_147_483_648.0;
            if channels == 1 {
                #[allow(clippy::cast_precision_loss)]
                output.extend(buf.chan(0).iter().map(|&s| s as f32 / I32_NORM));
            } else {
                for i in 0..buf.frames() {
                    #[allow(clippy::cast_precision_loss)]
                    let sum: f32 = (0..channels)
                        .map(|ch| buf.chan(ch)[i] as f32 / I32_NORM)
                        .sum();
                    output.push(sum / channel_norm);
                }
            }
        }
        _ => {
            // Unsupported sample format, skip
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wav_bytes(channels: u16, secs: f32, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
            #[allow(clippy::cast_possible_truncation)]
            let frames = (secs * sample_rate as f32) as usize;
            for i in 0..frames {
                for ch in 0..channels {
                    // Opposite-phase channels so the mono mix is near zero.
                    let sign = if ch % 2 == 0 { 1.0 } else { -1.0 };
                    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
                    let sample = ((i as f32 * 0.01).sin() * sign * 8192.0) as i16;
                    writer.write_sample(sample).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_bytes_mono_wav() {
        let bytes = wav_bytes(1, 0.5, 16_000);
        let decoded = decode_audio_bytes(bytes, "wav", "mem.wav").unwrap();
        assert_eq!(decoded.sample_rate, 16_000);
        assert_eq!(decoded.samples.len(), 8_000);
        assert!((decoded.duration_secs - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_decode_bytes_stereo_mixes_to_mono() {
        let bytes = wav_bytes(2, 0.25, 16_000);
        let decoded = decode_audio_bytes(bytes, "wav", "mem.wav").unwrap();
        // One mono sample per frame, channels averaged away.
        assert_eq!(decoded.samples.len(), 4_000);
        assert!(decoded.samples.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn test_decode_garbage_is_an_error() {
        let result = decode_audio_bytes(b"definitely not audio".to_vec(), "wav", "junk");
        assert!(matches!(result, Err(Error::AudioOpen { .. })));
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_audio_file(Path::new("/nonexistent/clip.wav"));
        assert!(matches!(result, Err(Error::AudioOpen { .. })));
    }
}
