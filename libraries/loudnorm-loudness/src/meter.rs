//! EBU R128 loudness measurement
//!
//! Integrated loudness follows ITU-R BS.1770 as implemented by the `ebur128`
//! crate: K-weighting, 400 ms gating blocks with 75% overlap, an absolute gate
//! at -70 LUFS and a relative gate 10 LU below the ungated mean.
//!
//! Every gain decision downstream depends on this number, so the meter refuses
//! to guess: buffers shorter than one gating block, silent buffers and
//! malformed buffers are errors rather than a fallback value.

use crate::error::{LoudnessError, Result};
use ebur128::{EbuR128, Mode};
use loudnorm_core::{linear_to_db, AudioBuffer};
use std::fmt;

/// Shortest buffer (one gating block) that has an integrated loudness
pub const MIN_MEASURABLE_SECS: f64 = 0.4;

/// Full loudness picture of a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessReport {
    /// Integrated loudness in LUFS
    pub integrated_lufs: f64,

    /// Loudness range in LU
    pub loudness_range_lu: f64,

    /// True peak in dBTP (4x oversampled inter-sample peak)
    pub true_peak_dbtp: f64,

    /// Sample peak in dBFS
    pub sample_peak_dbfs: f64,

    /// Duration of the analyzed audio in seconds
    pub duration_seconds: f64,

    /// Sample rate of the analyzed audio
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,
}

impl fmt::Display for LoudnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: {:.1} LUFS, Range: {:.1} LU, True Peak: {:.1} dBTP, Sample Peak: {:.1} dBFS",
            self.integrated_lufs,
            self.loudness_range_lu,
            self.true_peak_dbtp,
            self.sample_peak_dbfs
        )
    }
}

/// Integrated loudness meter
///
/// Stateless: every call builds a fresh `ebur128` state for the buffer, so
/// one meter can be shared across a whole batch.
///
/// # Example
///
/// ```ignore
/// use loudnorm_loudness::LoudnessMeter;
///
/// let lufs = LoudnessMeter::new().measure(&buffer)?;
/// println!("Integrated loudness: {:.1} LUFS", lufs);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoudnessMeter;

impl LoudnessMeter {
    /// Create a new meter
    pub fn new() -> Self {
        Self
    }

    /// Integrated loudness of `buffer` in LUFS
    ///
    /// # Errors
    /// - `NoSamples` for an empty buffer
    /// - `InvalidSampleRate` / `InvalidChannelCount` for unsupported formats
    /// - `MisalignedSamples` when the interleaved data is not whole frames
    /// - `TooShort` when the buffer is under [`MIN_MEASURABLE_SECS`]
    /// - `SilentAudio` when every block falls below the absolute gate
    pub fn measure(&self, buffer: &AudioBuffer) -> Result<f64> {
        let state = Self::feed(buffer, Mode::I)?;
        let integrated = Self::integrated(&state)?;
        tracing::trace!(integrated_lufs = integrated, "measured integrated loudness");
        Ok(integrated)
    }

    /// Integrated loudness plus range and peak figures
    ///
    /// # Errors
    /// Same conditions as [`LoudnessMeter::measure`]
    pub fn analyze(&self, buffer: &AudioBuffer) -> Result<LoudnessReport> {
        // Mode::I = Integrated loudness
        // Mode::LRA = Loudness range
        // Mode::SAMPLE_PEAK = Maximum sample value
        // Mode::TRUE_PEAK = Inter-sample peak (4x oversampling)
        let mode = Mode::I | Mode::LRA | Mode::SAMPLE_PEAK | Mode::TRUE_PEAK;
        let state = Self::feed(buffer, mode)?;

        let integrated_lufs = Self::integrated(&state)?;
        let loudness_range_lu = state.loudness_range().unwrap_or(0.0);

        let channels = u32::from(buffer.channel_count());
        let mut true_peak_linear = 0.0_f64;
        let mut sample_peak_linear = 0.0_f64;
        for ch in 0..channels {
            true_peak_linear = true_peak_linear.max(state.true_peak(ch).unwrap_or(0.0));
            sample_peak_linear = sample_peak_linear.max(state.sample_peak(ch).unwrap_or(0.0));
        }

        Ok(LoudnessReport {
            integrated_lufs,
            loudness_range_lu,
            true_peak_dbtp: linear_to_db(true_peak_linear),
            sample_peak_dbfs: linear_to_db(sample_peak_linear),
            duration_seconds: buffer.duration_secs(),
            sample_rate: buffer.sample_rate(),
            channels: buffer.channel_count(),
        })
    }

    /// Validate the buffer and run it through a new `ebur128` state
    fn feed(buffer: &AudioBuffer, mode: Mode) -> Result<EbuR128> {
        if buffer.is_empty() {
            return Err(LoudnessError::NoSamples);
        }

        let sample_rate = buffer.sample_rate();
        if !(8000..=384_000).contains(&sample_rate) {
            return Err(LoudnessError::InvalidSampleRate(sample_rate));
        }

        let channels = buffer.channel_count();
        if !(1..=8).contains(&channels) {
            return Err(LoudnessError::InvalidChannelCount(channels));
        }

        if buffer.len() % channels as usize != 0 {
            return Err(LoudnessError::MisalignedSamples {
                samples: buffer.len(),
                channels,
            });
        }

        let duration = buffer.duration_secs();
        if duration < MIN_MEASURABLE_SECS {
            return Err(LoudnessError::TooShort {
                duration_ms: duration * 1000.0,
                minimum_ms: MIN_MEASURABLE_SECS * 1000.0,
            });
        }

        let mut state = EbuR128::new(u32::from(channels), sample_rate, mode)?;
        state.add_frames_f32(&buffer.samples)?;
        Ok(state)
    }

    fn integrated(state: &EbuR128) -> Result<f64> {
        let integrated = state.loudness_global()?;

        // ebur128 reports -inf when no block passes the absolute gate
        if integrated.is_infinite() || integrated.is_nan() {
            return Err(LoudnessError::SilentAudio);
        }
        Ok(integrated)
    }
}
