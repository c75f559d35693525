/// Audio decoder implementation using Symphonia
use crate::error::{AudioError, Result};
use loudnorm_core::{AudioBuffer, AudioDecoder, AudioFormat, SampleRate};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Audio decoder using Symphonia
///
/// Supports: WAV, MP3, AAC (ADTS and MP4/M4A), FLAC, OGG/Vorbis
///
/// Decodes the whole default track into memory. The channel layout of the
/// source is kept as-is; loudness weighting needs the real channels, so
/// nothing is downmixed here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    fn decode_file(path: &Path) -> Result<AudioBuffer> {
        if !path.exists() {
            return Err(AudioError::FileNotFound(path.display().to_string()));
        }

        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::Symphonia(format!("Failed to probe file: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::DecodeError("No audio tracks found".to_string()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);
        let bits_per_sample = track.codec_params.bits_per_sample.unwrap_or(32) as u16;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Symphonia(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();
        let mut decoded_packets = 0_usize;
        let mut skipped_packets = 0_usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                // Track list changed mid-stream; everything up to here is the file
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(AudioError::DecodeError(format!(
                        "Error reading packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // A single corrupt frame is skipped, as players do
                Err(SymphoniaError::DecodeError(e)) => {
                    skipped_packets += 1;
                    tracing::warn!(path = %path.display(), "skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(AudioError::DecodeError(format!("Decode error: {}", e)));
                }
            };

            let spec = *decoded.spec();
            let packet_channels = spec.channels.count() as u16;
            if decoded_packets == 0 {
                sample_rate = spec.rate;
                channels = packet_channels;
            } else if packet_channels != channels {
                return Err(AudioError::DecodeError(format!(
                    "Channel count changed mid-stream ({} -> {})",
                    channels, packet_channels
                )));
            }

            Self::append_interleaved(decoded, &mut samples);
            decoded_packets += 1;
        }

        if decoded_packets == 0 && skipped_packets > 0 {
            return Err(AudioError::DecodeError(format!(
                "No decodable audio ({} corrupt packets)",
                skipped_packets
            )));
        }

        if channels == 0 || sample_rate == 0 {
            return Err(AudioError::UnsupportedFormat(format!(
                "Stream reports {} channels at {} Hz",
                channels, sample_rate
            )));
        }

        tracing::debug!(
            path = %path.display(),
            sample_rate,
            channels,
            bits_per_sample,
            frames = samples.len() / channels as usize,
            "decoded audio file"
        );

        Ok(AudioBuffer::new(
            samples,
            AudioFormat::new(SampleRate::new(sample_rate), channels, bits_per_sample),
        ))
    }

    /// Convert a Symphonia buffer to interleaved f32 and append it to `out`
    ///
    /// Signed integers use symmetric scaling (divide by 2^(N-1)), so the
    /// most negative code maps to exactly -1.0. Unsigned formats are recentred
    /// on their midpoint first. Float formats are passed through unclamped so
    /// that float files with overs measure the same as the signal they hold.
    fn append_interleaved(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
        match decoded {
            AudioBufferRef::F32(buf) => Self::interleave(&buf, out, |s| s),
            AudioBufferRef::F64(buf) => Self::interleave(&buf, out, |s| s as f32),
            // i32 range: -2147483648 to 2147483647
            AudioBufferRef::S32(buf) => {
                Self::interleave(&buf, out, |s| (f64::from(s) / 2_147_483_648.0) as f32)
            }
            // S24 range: -8388608 to 8388607
            AudioBufferRef::S24(buf) => {
                Self::interleave(&buf, out, |s| s.inner() as f32 / 8_388_608.0)
            }
            AudioBufferRef::S16(buf) => Self::interleave(&buf, out, |s| f32::from(s) / 32_768.0),
            AudioBufferRef::S8(buf) => Self::interleave(&buf, out, |s| f32::from(s) / 128.0),
            AudioBufferRef::U32(buf) => Self::interleave(&buf, out, |s| {
                ((f64::from(s) - 2_147_483_648.0) / 2_147_483_648.0) as f32
            }),
            AudioBufferRef::U24(buf) => Self::interleave(&buf, out, |s| {
                (s.inner() as f32 - 8_388_608.0) / 8_388_608.0
            }),
            AudioBufferRef::U16(buf) => {
                Self::interleave(&buf, out, |s| (f32::from(s) - 32_768.0) / 32_768.0)
            }
            AudioBufferRef::U8(buf) => {
                Self::interleave(&buf, out, |s| (f32::from(s) - 128.0) / 128.0)
            }
        }
    }

    fn interleave<T, F>(
        buf: &symphonia::core::audio::AudioBuffer<T>,
        out: &mut Vec<f32>,
        normalize: F,
    ) where
        T: Sample + Copy,
        F: Fn(T) -> f32,
    {
        let channels = buf.spec().channels.count();
        let frames = buf.frames();
        let planes: Vec<&[T]> = (0..channels).map(|ch| buf.chan(ch)).collect();

        out.reserve(frames * channels);
        for frame in 0..frames {
            for plane in &planes {
                out.push(normalize(plane[frame]));
            }
        }
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> loudnorm_core::Result<AudioBuffer> {
        Self::decode_file(path).map_err(Into::into)
    }

    fn supports_format(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            matches!(
                ext.to_lowercase().as_str(),
                "wav" | "mp3" | "flac" | "ogg" | "m4a" | "mp4" | "aac"
            )
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loudnorm_core::NormalizerError;
    use std::io::Write;

    fn write_wav_i16(path: &Path, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = SymphoniaDecoder::new()
            .decode(Path::new("/definitely/not/here.wav"))
            .unwrap_err();
        assert!(matches!(err, NormalizerError::FileNotFound(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"this is not a riff header at all").unwrap();
        drop(file);

        let err = SymphoniaDecoder::new().decode(&path).unwrap_err();
        assert!(matches!(err, NormalizerError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn pcm16_is_scaled_by_two_to_the_fifteen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scale.wav");
        write_wav_i16(&path, 1, &[i16::MIN, -16384, 0, 16384]);

        let buffer = SymphoniaDecoder::new().decode(&path).unwrap();
        assert_eq!(buffer.samples, vec![-1.0, -0.5, 0.0, 0.5]);
        assert_eq!(buffer.format.bits_per_sample, 16);
    }

    #[test]
    fn channel_layout_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // Left is loud, right is silent
        write_wav_i16(&path, 2, &[16384, 0, 16384, 0, -16384, 0]);

        let buffer = SymphoniaDecoder::new().decode(&path).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.samples, vec![0.5, 0.0, 0.5, 0.0, -0.5, 0.0]);
    }

    #[test]
    fn supported_extensions() {
        let decoder = SymphoniaDecoder::new();
        assert!(decoder.supports_format(Path::new("a.WAV")));
        assert!(decoder.supports_format(Path::new("b.m4a")));
        assert!(!decoder.supports_format(Path::new("c.txt")));
        assert!(!decoder.supports_format(Path::new("noext")));
    }
}
