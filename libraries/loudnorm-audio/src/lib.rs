//! Loudness Normalizer Audio
//!
//! Audio decoding, encoding, and dynamics processing.
//!
//! This crate provides:
//! - Audio decoding via Symphonia (WAV, MP3, AAC/M4A, FLAC, OGG)
//! - WAV encoding via hound and AAC encoding via an ffmpeg executable
//! - A feed-forward dynamic range compressor
//!
//! # Example: Decoding Audio
//!
//! ```rust,no_run
//! use loudnorm_audio::SymphoniaDecoder;
//! use loudnorm_core::AudioDecoder;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let decoder = SymphoniaDecoder::new();
//! let buffer = decoder.decode(Path::new("/music/song.mp3"))?;
//!
//! println!("Decoded {} samples at {} Hz", buffer.len(), buffer.sample_rate());
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Compressing
//!
//! ```rust
//! use loudnorm_audio::effects::compress;
//! use loudnorm_core::{AudioBuffer, AudioFormat, CompressorParams};
//!
//! let buffer = AudioBuffer::new(vec![0.8; 4410], AudioFormat::cd_quality());
//! let compressed = compress(&buffer, &CompressorParams::default());
//! assert!(compressed.peak() < buffer.peak());
//! ```

mod decoder;
pub mod effects;
mod encoder;
mod error;

pub use decoder::SymphoniaDecoder;
pub use encoder::{encoder_for, AacEncoder, EncoderSettings, WavEncoder, WavSampleFormat};
pub use error::{AudioError, Result};
