//! Error types for loudness measurement

use loudnorm_core::NormalizerError;
use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur during loudness measurement
#[derive(Error, Debug)]
pub enum LoudnessError {
    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(u16),

    /// Interleaved data does not divide into whole frames
    #[error("Sample count {samples} is not divisible by channel count {channels}")]
    MisalignedSamples {
        /// Total interleaved samples
        samples: usize,
        /// Channel count of the buffer
        channels: u16,
    },

    /// No samples were provided for analysis
    #[error("No audio samples provided for analysis")]
    NoSamples,

    /// Buffer is shorter than one gating block
    #[error("Audio is too short for integrated loudness: {duration_ms:.0} ms (minimum {minimum_ms:.0} ms)")]
    TooShort {
        /// Buffer duration
        duration_ms: f64,
        /// Minimum measurable duration
        minimum_ms: f64,
    },

    /// Audio is silent or entirely below the absolute gate
    #[error("Audio is silent (no loudness data available)")]
    SilentAudio,

    /// EBU R128 analysis error
    #[error("EBU R128 analysis failed: {0}")]
    AnalysisError(String),
}

impl From<ebur128::Error> for LoudnessError {
    fn from(err: ebur128::Error) -> Self {
        Self::AnalysisError(format!("{:?}", err))
    }
}

impl From<LoudnessError> for NormalizerError {
    fn from(err: LoudnessError) -> Self {
        NormalizerError::measurement(err.to_string())
    }
}
