/// Audio-related types
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Common sample rates
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,

    /// Bit depth of the source stream before float conversion
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Create CD quality stereo format (44.1kHz, 16-bit, stereo)
    pub fn cd_quality() -> Self {
        Self {
            sample_rate: SampleRate::CD_QUALITY,
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

/// Decoded audio, held entirely in memory
///
/// Samples are stored as f32 in the range [-1.0, 1.0], interleaved
/// (`[L, R, L, R, ...]` for stereo). Processing stages never modify a buffer
/// in place; they return a new one built with [`AudioBuffer::map_samples`]
/// or [`AudioBuffer::with_samples`].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioBuffer {
    /// Create a new audio buffer
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate.as_hz()
    }

    /// Number of interleaved channels
    pub fn channel_count(&self) -> u16 {
        self.format.channels
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.format.channels == 0 {
            return 0;
        }
        self.samples.len() / self.format.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        let rate = self.format.sample_rate.as_hz();
        if rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / rate as f64
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Maximum absolute sample value (linear)
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }

    /// Maximum absolute sample value in dBFS (`-inf` for silence)
    pub fn peak_dbfs(&self) -> f64 {
        crate::linear_to_db(f64::from(self.peak()))
    }

    /// Build a new buffer with the same format by mapping every sample
    #[must_use]
    pub fn map_samples<F>(&self, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        Self {
            samples: self.samples.iter().map(|&s| f(s)).collect(),
            format: self.format,
        }
    }

    /// Build a new buffer with the same format from replacement samples
    #[must_use]
    pub fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self {
            samples,
            format: self.format,
        }
    }
}
