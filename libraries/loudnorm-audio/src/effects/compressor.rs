/// Dynamic Range Compressor
///
/// Attenuates the part of the signal level that rises above a threshold.
use loudnorm_core::{AudioBuffer, CompressorParams};

/// Floor of the level detector in dB
const NOISE_FLOOR_DB: f64 = -120.0;

/// Release of the peak detector
///
/// Long enough to hold a peak across the cycles of low-frequency content,
/// short enough to follow level changes within ~100 ms.
const PEAK_RELEASE_MS: f64 = 50.0;

/// Dynamic Range Compressor
///
/// Uses a two-stage feed-forward design:
/// 1. Peak level detection with instant attack and fixed release (peak hold).
///    This tracks the signal level without per-cycle variation.
/// 2. Smoothing of the level's excess over the threshold with the
///    configured attack/release. The applied gain reduction is
///    `(1 - 1/ratio)` times the smoothed excess.
///
/// Both stages only look at the input, and the attack/release decision does
/// not depend on the ratio. Raising the ratio therefore scales the gain
/// reduction of every sample up and can never raise an output peak.
///
/// All channels share one detector (linked), so the stereo image is kept.
/// The filter is stateful: each sample's gain depends on the envelope left by
/// the previous one.
pub struct Compressor {
    params: CompressorParams,
    channels: usize,

    // Peak level detector (in dB)
    peak_level_db: f64,

    // Smoothed excess over threshold (in dB, >= 0)
    envelope_db: f64,

    // Coefficient cache
    peak_release_coeff: f64,
    attack_coeff: f64,
    release_coeff: f64,
    slope: f64,
}

impl Compressor {
    /// Create a compressor for interleaved audio
    ///
    /// `params` are expected to be validated already; see
    /// [`CompressorParams::validate`].
    pub fn new(params: CompressorParams, sample_rate: u32, channels: u16) -> Self {
        let sr = f64::from(sample_rate.max(1));

        // coeff = exp(-1 / (time_ms * sample_rate / 1000))
        // gives 63.2% (1 - 1/e) of the step after the given time
        let time_coeff = |ms: f64| (-1.0 / (ms * sr / 1000.0)).exp();

        Self {
            params,
            channels: usize::from(channels.max(1)),
            peak_level_db: NOISE_FLOOR_DB,
            envelope_db: 0.0,
            peak_release_coeff: time_coeff(PEAK_RELEASE_MS),
            attack_coeff: time_coeff(params.attack_ms),
            release_coeff: time_coeff(params.release_ms),
            slope: 1.0 - 1.0 / params.ratio,
        }
    }

    /// Gain reduction currently applied, in dB (positive = attenuation)
    pub fn gain_reduction_db(&self) -> f64 {
        self.slope * self.envelope_db
    }

    /// Static curve: how far `level_db` sits above the threshold
    #[inline]
    fn excess_over_threshold(&self, level_db: f64) -> f64 {
        (level_db - self.params.threshold_db).max(0.0)
    }

    /// Instant attack, slow release toward the noise floor
    #[inline]
    fn update_peak_level(&mut self, input_db: f64) {
        if input_db >= self.peak_level_db {
            self.peak_level_db = input_db;
        } else {
            // Decay toward the floor rather than the input, which is -inf at
            // every zero crossing
            self.peak_level_db = self.peak_release_coeff * (self.peak_level_db - NOISE_FLOOR_DB)
                + NOISE_FLOOR_DB;
        }
    }

    /// Attack while the excess rises, release while it falls
    #[inline]
    fn smooth_envelope(&mut self, target_db: f64) {
        let coeff = if target_db > self.envelope_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope_db = coeff * self.envelope_db + (1.0 - coeff) * target_db;
    }

    /// Process interleaved samples in place
    pub fn process(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_mut(self.channels) {
            // Linked detection: the loudest channel drives all of them
            let frame_peak = frame.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()));
            let input_db = if frame_peak > 1e-10 {
                20.0 * f64::from(frame_peak).log10()
            } else {
                NOISE_FLOOR_DB
            };

            self.update_peak_level(input_db);
            let target = self.excess_over_threshold(self.peak_level_db);
            self.smooth_envelope(target);

            let gain = 10.0_f64.powf(-self.gain_reduction_db() / 20.0);
            for sample in frame.iter_mut() {
                *sample = (f64::from(*sample) * gain) as f32;
            }
        }
    }

    /// Clear the detector and envelope
    pub fn reset(&mut self) {
        self.peak_level_db = NOISE_FLOOR_DB;
        self.envelope_db = 0.0;
    }
}

/// Compress a whole buffer with a fresh compressor, returning a new buffer
#[must_use]
pub fn compress(buffer: &AudioBuffer, params: &CompressorParams) -> AudioBuffer {
    let mut compressor = Compressor::new(*params, buffer.sample_rate(), buffer.channel_count());
    let mut samples = buffer.samples.clone();
    compressor.process(&mut samples);
    tracing::debug!(
        threshold_db = params.threshold_db,
        ratio = params.ratio,
        attack_ms = params.attack_ms,
        release_ms = params.release_ms,
        final_reduction_db = compressor.gain_reduction_db(),
        "compressed buffer"
    );
    buffer.with_samples(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_signals::generate_sine;
    use loudnorm_core::{AudioFormat, SampleRate};

    fn params(threshold_db: f64, ratio: f64) -> CompressorParams {
        CompressorParams {
            threshold_db,
            ratio,
            attack_ms: 5.0,
            release_ms: 50.0,
        }
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0_f32, |p, s| p.max(s.abs()))
    }

    #[test]
    fn below_threshold_is_untouched() {
        let mut comp = Compressor::new(params(-6.0, 4.0), 44100, 2);
        let mut buffer = generate_sine(440.0, 0.1, 44100, 2, 0.5); // -20 dBFS
        let original = buffer.clone();

        comp.process(&mut buffer);

        assert_eq!(buffer, original);
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn steady_state_reduction_matches_ratio() {
        // 0.5 = -6.02 dBFS, 14 dB over a -20 dB threshold; 2:1 removes 7 dB
        let mut comp = Compressor::new(params(-20.0, 2.0), 44100, 1);
        let mut buffer = vec![0.5_f32; 44100];
        comp.process(&mut buffer);

        let expected = (20.0 * 0.5_f64.log10() + 20.0) / 2.0;
        assert!(
            (comp.gain_reduction_db() - expected).abs() < 0.05,
            "Expected {:.2} dB reduction, got {:.2}",
            expected,
            comp.gain_reduction_db()
        );
        let out_db = 20.0 * f64::from(*buffer.last().unwrap()).log10();
        assert!((out_db - (-20.0 + 14.02 / 2.0)).abs() < 0.1);
    }

    #[test]
    fn unity_ratio_is_transparent() {
        let mut comp = Compressor::new(params(-40.0, 1.0), 48000, 2);
        let mut buffer = generate_sine(1000.0, 0.9, 48000, 2, 0.2);
        let original = buffer.clone();
        comp.process(&mut buffer);
        assert_eq!(buffer, original);
    }

    #[test]
    fn attack_reaches_63_percent_after_attack_time() {
        let attack_ms = 10.0;
        let sr = 48000;
        let mut comp = Compressor::new(
            CompressorParams {
                threshold_db: -20.0,
                ratio: 4.0,
                attack_ms,
                release_ms: 100.0,
            },
            sr,
            1,
        );
        let target = 0.75 * (20.0 * 0.8_f64.log10() + 20.0);

        let attack_samples = (attack_ms * f64::from(sr) / 1000.0) as usize;
        let mut buffer = vec![0.8_f32; attack_samples];
        comp.process(&mut buffer);

        let fraction = comp.gain_reduction_db() / target;
        assert!(
            (fraction - 0.632).abs() < 0.01,
            "Expected ~63% of target reduction, got {:.1}%",
            fraction * 100.0
        );
    }

    #[test]
    fn release_recovers_gain() {
        let mut comp = Compressor::new(params(-30.0, 8.0), 44100, 1);
        let mut loud = vec![0.9_f32; 22050];
        comp.process(&mut loud);
        let compressed_reduction = comp.gain_reduction_db();

        let mut quiet = vec![0.001_f32; 44100];
        comp.process(&mut quiet);

        assert!(compressed_reduction > 10.0);
        assert!(comp.gain_reduction_db() < 0.01);
    }

    #[test]
    fn channels_are_linked() {
        let mut comp = Compressor::new(params(-20.0, 4.0), 44100, 2);
        // Loud left, quiet right: both get the same gain
        let mut buffer: Vec<f32> = (0..4410).flat_map(|_| [0.9_f32, 0.05]).collect();
        comp.process(&mut buffer);

        let last = buffer.len() - 2;
        let left_gain = buffer[last] / 0.9;
        let right_gain = buffer[last + 1] / 0.05;
        assert!((left_gain - right_gain).abs() < 1e-4);
        assert!(left_gain < 0.5);
    }

    #[test]
    fn higher_ratio_lowers_peak() {
        let input = generate_sine(200.0, 0.9, 44100, 2, 0.5);
        let mut outputs = Vec::new();
        for ratio in [1.5, 3.0, 10.0] {
            let mut comp = Compressor::new(params(-24.0, ratio), 44100, 2);
            let mut buffer = input.clone();
            comp.process(&mut buffer);
            outputs.push(peak(&buffer));
        }
        assert!(outputs[0] >= outputs[1] && outputs[1] >= outputs[2]);
    }

    #[test]
    fn reset_clears_envelope() {
        let mut comp = Compressor::new(params(-20.0, 4.0), 44100, 2);
        let mut buffer = vec![0.9; 100];
        comp.process(&mut buffer);

        comp.reset();

        assert_eq!(comp.peak_level_db, NOISE_FLOOR_DB);
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn compress_returns_new_buffer() {
        let source = AudioBuffer::new(
            vec![0.8; 4410],
            AudioFormat::new(SampleRate::CD_QUALITY, 1, 16),
        );
        let compressed = compress(&source, &params(-20.0, 4.0));

        assert!(source.samples.iter().all(|&s| s == 0.8));
        assert_eq!(compressed.format, source.format);
        assert!(compressed.peak() < source.peak());
    }
}
