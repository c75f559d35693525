//! Uniform peak limiter
//!
//! Pulls the sample peak of a whole buffer down to a ceiling with a single
//! static gain. Unlike a lookahead limiter it never changes the shape of the
//! signal, so the relative loudness of every passage is preserved.

use crate::gain::apply_gain_db;
use loudnorm_core::AudioBuffer;

/// Reductions smaller than this are treated as zero
///
/// After one pass the peak sits on the ceiling up to f32 rounding; without the
/// tolerance a second pass would nudge every sample by a few ULPs.
pub const PEAK_TOLERANCE_DB: f64 = 1e-4;

/// Peak limiter with a fixed dBFS ceiling
///
/// # Example
///
/// ```ignore
/// use loudnorm_loudness::PeakLimiter;
///
/// let limiter = PeakLimiter::new(-3.0);
/// let limited = limiter.apply(&buffer);
/// assert!(limited.peak_dbfs() <= -3.0 + 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakLimiter {
    ceiling_dbfs: f64,
}

impl PeakLimiter {
    /// Create a limiter with the given ceiling in dBFS
    pub fn new(ceiling_dbfs: f64) -> Self {
        Self { ceiling_dbfs }
    }

    /// Attenuation in dB this limiter would apply to `buffer`
    ///
    /// Always >= 0: a buffer under the ceiling needs no reduction and is
    /// never boosted.
    pub fn gain_reduction_db(&self, buffer: &AudioBuffer) -> f64 {
        let reduction = (buffer.peak_dbfs() - self.ceiling_dbfs).max(0.0);
        if reduction < PEAK_TOLERANCE_DB {
            0.0
        } else {
            reduction
        }
    }

    /// Return a copy of `buffer` whose sample peak does not exceed the ceiling
    #[must_use]
    pub fn apply(&self, buffer: &AudioBuffer) -> AudioBuffer {
        let reduction = self.gain_reduction_db(buffer);
        if reduction == 0.0 {
            return buffer.clone();
        }
        tracing::debug!(
            peak_dbfs = buffer.peak_dbfs(),
            ceiling_dbfs = self.ceiling_dbfs,
            reduction_db = reduction,
            "peak limiting"
        );
        apply_gain_db(buffer, -reduction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loudnorm_core::AudioFormat;

    fn buffer(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::new(samples, AudioFormat::cd_quality())
    }

    #[test]
    fn loud_buffer_lands_on_ceiling() {
        let limiter = PeakLimiter::new(-3.0);
        let limited = limiter.apply(&buffer(vec![0.9, -1.0, 0.5, 0.2]));
        assert!((limited.peak_dbfs() - (-3.0)).abs() < 1e-3);
    }

    #[test]
    fn quiet_buffer_is_untouched() {
        let limiter = PeakLimiter::new(-3.0);
        let quiet = buffer(vec![0.1, -0.2, 0.05, 0.0]);
        assert_eq!(limiter.gain_reduction_db(&quiet), 0.0);
        assert_eq!(limiter.apply(&quiet), quiet);
    }

    #[test]
    fn silence_is_untouched() {
        let limiter = PeakLimiter::new(-60.0);
        let silence = buffer(vec![0.0; 8]);
        assert_eq!(limiter.apply(&silence), silence);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let limiter = PeakLimiter::new(-1.5);
        let once = limiter.apply(&buffer(vec![0.99, -0.97, 0.3, -0.6]));
        let twice = limiter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn reduction_matches_excess() {
        let limiter = PeakLimiter::new(-6.0);
        // Peak at 0 dBFS, 6 dB over the ceiling
        let reduction = limiter.gain_reduction_db(&buffer(vec![1.0, 0.5]));
        assert!((reduction - 6.0).abs() < 1e-9);
    }
}
