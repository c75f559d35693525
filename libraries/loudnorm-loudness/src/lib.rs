//! Loudness measurement and gain staging for the loudness normalizer
//!
//! This crate provides:
//! - ITU-R BS.1770 / EBU R128 integrated loudness (LUFS) via `ebur128`
//! - Uniform gain application and loudness correction
//! - A uniform peak limiter that pulls a buffer's sample peak down to a ceiling
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ AudioBuffer  │ ──► │ PeakLimiter  │ ──► │ LoudnessMeter │ ──► │ apply_gain   │
//! └──────────────┘     └──────────────┘     └───────────────┘     └──────────────┘
//!                                            measured LUFS ──► correction_gain_db
//! ```
//!
//! # Example
//!
//! ```ignore
//! use loudnorm_loudness::{apply_gain_db, correction_gain_db, LoudnessMeter, PeakLimiter};
//!
//! let limited = PeakLimiter::new(-3.0).apply(&buffer);
//! let measured = LoudnessMeter::new().measure(&limited)?;
//! let output = apply_gain_db(&limited, correction_gain_db(measured, -16.0));
//! ```

#![deny(unsafe_code)]

mod error;
mod gain;
mod limiter;
mod meter;

pub use error::{LoudnessError, Result};
pub use gain::{apply_gain_db, correction_gain_db};
pub use limiter::{PeakLimiter, PEAK_TOLERANCE_DB};
pub use meter::{LoudnessMeter, LoudnessReport, MIN_MEASURABLE_SECS};

/// EBU R128 broadcast reference level (-23 LUFS)
pub const EBU_R128_BROADCAST_LUFS: f64 = -23.0;
