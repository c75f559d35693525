//! Loudness Normalizer Core
//!
//! Platform-agnostic types, traits, and error handling shared by every
//! loudnorm crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `AudioBuffer`, `AudioFormat`, `SampleRate`
//! - **Processing Types**: `CompressorParams`, `TargetLoudness`, `OutputFormat`,
//!   `ProcessingRequest`, `ProcessingResult`
//! - **Core Traits**: `AudioDecoder`, `AudioEncoder`
//! - **Error Handling**: Unified `NormalizerError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use loudnorm_core::{CompressorParams, OutputFormat, ProcessingRequest, TargetLoudness};
//!
//! // The front end stores the target as a positive magnitude
//! let target = TargetLoudness::from_magnitude(16.0);
//! assert_eq!(target.lufs(), -16.0);
//!
//! let request = ProcessingRequest {
//!     output_format: OutputFormat::Wav,
//!     target,
//!     compressor: CompressorParams::default(),
//!     peak_limit_dbfs: -3.0,
//! };
//! assert!(request.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{NormalizerError, Result};
pub use traits::{AudioDecoder, AudioEncoder};

pub use types::{
    // Audio types
    AudioBuffer, AudioFormat, SampleRate,
    // Processing parameters
    CompressorParams, OutputFormat, ProcessingRequest, TargetLoudness,
    // Results
    ProcessingResult, ProcessingStatus,
};

/// Convert a decibel value to a linear amplitude factor
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude to decibels (`-inf` for zero)
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f64::NEG_INFINITY
    }
}
