//! Property tests for the compressor

use loudnorm_audio::effects::compress;
use loudnorm_core::{AudioBuffer, AudioFormat, CompressorParams, SampleRate};
use proptest::prelude::*;

fn tone(freq: f32, amplitude: f32) -> AudioBuffer {
    let rate = 44_100_u32;
    let samples = (0..rate / 4)
        .flat_map(|i| {
            let s = amplitude
                * (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin();
            [s, s * 0.5]
        })
        .collect();
    AudioBuffer::new(samples, AudioFormat::new(SampleRate::new(rate), 2, 32))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn higher_ratio_never_raises_the_peak(
        freq in 50.0f32..5000.0,
        amplitude in 0.05f32..1.0,
        threshold in -40.0f64..0.0,
        ratio in 1.0f64..20.0,
        extra in 0.1f64..20.0,
        attack in 0.5f64..50.0,
        release in 5.0f64..500.0,
    ) {
        let input = tone(freq, amplitude);
        let gentle = CompressorParams { threshold_db: threshold, ratio, attack_ms: attack, release_ms: release };
        let hard = CompressorParams { ratio: ratio + extra, ..gentle };

        let gentle_peak = compress(&input, &gentle).peak();
        let hard_peak = compress(&input, &hard).peak();
        prop_assert!(hard_peak <= gentle_peak + 1e-6, "{} > {}", hard_peak, gentle_peak);
    }

    #[test]
    fn compression_never_boosts(
        amplitude in 0.0f32..1.0,
        threshold in -60.0f64..0.0,
        ratio in 1.0f64..20.0,
    ) {
        let input = tone(440.0, amplitude);
        let params = CompressorParams { threshold_db: threshold, ratio, ..CompressorParams::default() };
        let output = compress(&input, &params);
        for (o, i) in output.samples.iter().zip(&input.samples) {
            prop_assert!(o.abs() <= i.abs() + 1e-6);
        }
    }
}
