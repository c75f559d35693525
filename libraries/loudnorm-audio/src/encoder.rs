/// Output encoders: WAV via hound, AAC via an ffmpeg executable
use crate::error::{AudioError, Result};
use loudnorm_core::{AudioBuffer, AudioEncoder, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Sample format of written WAV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavSampleFormat {
    /// 32-bit IEEE float; keeps samples above full scale intact
    #[default]
    Float32,
    /// 16-bit signed integer, clamped to full scale
    Pcm16,
    /// 24-bit signed integer, clamped to full scale
    Pcm24,
}

/// Float to signed PCM with the decoder's 2^(bits-1) scale
///
/// Values that decode to an exact code come back unchanged; +1.0 clamps to
/// the largest positive code.
fn to_pcm(sample: f32, bits: u32) -> i32 {
    let scale = f64::from(1_u32 << (bits - 1));
    (f64::from(sample) * scale)
        .round()
        .clamp(-scale, scale - 1.0) as i32
}

impl WavSampleFormat {
    fn spec(self, channels: u16, sample_rate: u32) -> hound::WavSpec {
        let (bits_per_sample, sample_format) = match self {
            Self::Float32 => (32, hound::SampleFormat::Float),
            Self::Pcm16 => (16, hound::SampleFormat::Int),
            Self::Pcm24 => (24, hound::SampleFormat::Int),
        };
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Settings shared by the encoders
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    /// Sample format for WAV output
    pub wav_sample_format: WavSampleFormat,
    /// ffmpeg executable used for AAC output
    pub ffmpeg_path: PathBuf,
    /// AAC bitrate in kbit/s
    pub aac_bitrate_kbps: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            wav_sample_format: WavSampleFormat::Float32,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            aac_bitrate_kbps: 192,
        }
    }
}

/// Build the encoder for `format`
pub fn encoder_for(format: OutputFormat, settings: &EncoderSettings) -> Box<dyn AudioEncoder> {
    match format {
        OutputFormat::Wav => Box::new(WavEncoder::new(settings.wav_sample_format)),
        OutputFormat::Aac => Box::new(AacEncoder::new(
            settings.ffmpeg_path.clone(),
            settings.aac_bitrate_kbps,
        )),
    }
}

/// Lossless WAV encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder {
    sample_format: WavSampleFormat,
}

impl WavEncoder {
    /// Create a WAV encoder writing `sample_format`
    pub fn new(sample_format: WavSampleFormat) -> Self {
        Self { sample_format }
    }

    /// Write `buffer` to `path`, replacing any existing file
    pub fn write(&self, buffer: &AudioBuffer, path: &Path) -> Result<()> {
        if buffer.channel_count() == 0 {
            return Err(AudioError::EncodeError(
                "cannot write audio with zero channels".to_string(),
            ));
        }

        let spec = self
            .sample_format
            .spec(buffer.channel_count(), buffer.sample_rate());
        let mut writer = hound::WavWriter::create(path, spec)?;

        match self.sample_format {
            WavSampleFormat::Float32 => {
                for &s in &buffer.samples {
                    writer.write_sample(s)?;
                }
            }
            WavSampleFormat::Pcm16 => {
                for &s in &buffer.samples {
                    writer.write_sample(to_pcm(s, 16) as i16)?;
                }
            }
            WavSampleFormat::Pcm24 => {
                for &s in &buffer.samples {
                    writer.write_sample(to_pcm(s, 24))?;
                }
            }
        }

        writer.finalize()?;
        Ok(())
    }
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, buffer: &AudioBuffer, path: &Path) -> loudnorm_core::Result<()> {
        self.write(buffer, path).map_err(Into::into)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Wav
    }
}

/// AAC encoder driving an ffmpeg executable
///
/// The buffer is written to a scratch float WAV, then ffmpeg's native AAC
/// encoder produces an ADTS stream at `path`.
#[derive(Debug, Clone)]
pub struct AacEncoder {
    ffmpeg_path: PathBuf,
    bitrate_kbps: u32,
}

impl AacEncoder {
    /// Create an AAC encoder
    pub fn new(ffmpeg_path: PathBuf, bitrate_kbps: u32) -> Self {
        Self {
            ffmpeg_path,
            bitrate_kbps,
        }
    }

    /// True when the ffmpeg executable can be started
    pub fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Write `buffer` to `path` as AAC, replacing any existing file
    pub fn write(&self, buffer: &AudioBuffer, path: &Path) -> Result<()> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("input.wav");
        WavEncoder::new(WavSampleFormat::Float32).write(buffer, &input)?;

        let output = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(&input)
            .arg("-y") // Overwrite output file
            .arg("-c:a")
            .arg("aac")
            .arg("-b:a")
            .arg(format!("{}k", self.bitrate_kbps))
            .arg("-f")
            .arg("adts")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                AudioError::Ffmpeg(format!(
                    "failed to run {}: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::Ffmpeg(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            path = %path.display(),
            bitrate_kbps = self.bitrate_kbps,
            "encoded AAC"
        );
        Ok(())
    }
}

impl AudioEncoder for AacEncoder {
    fn encode(&self, buffer: &AudioBuffer, path: &Path) -> loudnorm_core::Result<()> {
        self.write(buffer, path).map_err(Into::into)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Aac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loudnorm_core::{AudioFormat, NormalizerError, SampleRate};

    fn buffer(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::new(samples, AudioFormat::new(SampleRate::CD_QUALITY, 2, 32))
    }

    #[test]
    fn factory_picks_encoder_by_format() {
        let settings = EncoderSettings::default();
        assert_eq!(
            encoder_for(OutputFormat::Wav, &settings).format(),
            OutputFormat::Wav
        );
        assert_eq!(
            encoder_for(OutputFormat::Aac, &settings).format(),
            OutputFormat::Aac
        );
    }

    #[test]
    fn float_wav_keeps_overs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("over.wav");
        WavEncoder::new(WavSampleFormat::Float32)
            .write(&buffer(vec![1.5, -1.25, 0.5, 0.0]), &path)
            .unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);
        let samples: Vec<f32> = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1.5, -1.25, 0.5, 0.0]);
    }

    #[test]
    fn pcm16_clamps_to_full_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clamped.wav");
        WavEncoder::new(WavSampleFormat::Pcm16)
            .write(&buffer(vec![1.5, -1.5, 0.5, 0.0]), &path)
            .unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 16);
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![32767, -32768, 16384, 0]);
    }

    #[test]
    fn existing_output_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replace.wav");
        let encoder = WavEncoder::default();
        encoder.write(&buffer(vec![0.1; 400]), &path).unwrap();
        encoder.write(&buffer(vec![0.2; 4]), &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn missing_directory_is_an_encode_error() {
        let err = WavEncoder::default()
            .encode(&buffer(vec![0.0; 4]), Path::new("/no/such/dir/out.wav"))
            .unwrap_err();
        assert!(matches!(err, NormalizerError::Encode(_)), "got {err:?}");
    }

    #[test]
    fn missing_ffmpeg_is_an_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = AacEncoder::new(dir.path().join("no-ffmpeg-here"), 128);
        assert!(!encoder.is_available());

        let err = encoder
            .encode(&buffer(vec![0.0; 4]), &dir.path().join("out.aac"))
            .unwrap_err();
        assert!(matches!(err, NormalizerError::Encode(_)), "got {err:?}");
    }
}
