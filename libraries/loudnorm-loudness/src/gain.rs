//! Uniform gain staging

use loudnorm_core::{db_to_linear, AudioBuffer};

/// Return a copy of `buffer` with `gain_db` applied to every sample
///
/// No clipping or limiting is performed: a positive gain may push samples past
/// full scale, and the caller decides what to do about it.
#[must_use]
pub fn apply_gain_db(buffer: &AudioBuffer, gain_db: f64) -> AudioBuffer {
    if gain_db == 0.0 {
        return buffer.clone();
    }
    let factor = db_to_linear(gain_db);
    buffer.map_samples(|s| (f64::from(s) * factor) as f32)
}

/// Gain that moves a buffer measured at `measured_lufs` onto `target_lufs`
///
/// Integrated loudness scales one-to-one with uniform gain, so the correction
/// is the plain difference.
#[inline]
pub fn correction_gain_db(measured_lufs: f64, target_lufs: f64) -> f64 {
    target_lufs - measured_lufs
}
