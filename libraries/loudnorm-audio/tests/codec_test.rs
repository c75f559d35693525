//! Encode/decode tests against real files on disk

use loudnorm_audio::{AacEncoder, EncoderSettings, SymphoniaDecoder, WavEncoder, WavSampleFormat};
use loudnorm_core::{AudioBuffer, AudioDecoder, AudioEncoder, AudioFormat, SampleRate};
use loudnorm_loudness::LoudnessMeter;

fn sine(amplitude: f32, channels: u16, secs: f32) -> AudioBuffer {
    let rate = 44_100_u32;
    let frames = (rate as f32 * secs) as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        let t = i as f32 / rate as f32;
        let s = amplitude * (2.0 * std::f32::consts::PI * 1000.0 * t).sin();
        for _ in 0..channels {
            samples.push(s);
        }
    }
    AudioBuffer::new(samples, AudioFormat::new(SampleRate::new(rate), channels, 32))
}

#[test]
fn float_wav_preserves_loudness_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    let source = sine(0.1, 2, 2.0);

    WavEncoder::new(WavSampleFormat::Float32)
        .encode(&source, &path)
        .unwrap();
    let decoded = SymphoniaDecoder::new().decode(&path).unwrap();

    assert_eq!(decoded.samples, source.samples);
    let meter = LoudnessMeter::new();
    let before = meter.measure(&source).unwrap();
    let after = meter.measure(&decoded).unwrap();
    assert!((before - after).abs() < 1e-6, "{before} vs {after}");
}

#[test]
fn pcm24_wav_stays_within_a_hundredth_of_a_lu() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone24.wav");
    let source = sine(0.25, 1, 1.0);

    WavEncoder::new(WavSampleFormat::Pcm24)
        .encode(&source, &path)
        .unwrap();
    let decoded = SymphoniaDecoder::new().decode(&path).unwrap();

    assert_eq!(decoded.format.bits_per_sample, 24);
    assert_eq!(decoded.frames(), source.frames());
    let meter = LoudnessMeter::new();
    let diff = meter.measure(&source).unwrap() - meter.measure(&decoded).unwrap();
    assert!(diff.abs() < 0.01, "drift of {diff} LU");
}

#[test]
fn aac_round_trip_is_within_one_lu() {
    let settings = EncoderSettings::default();
    let encoder = AacEncoder::new(settings.ffmpeg_path.clone(), settings.aac_bitrate_kbps);
    if !encoder.is_available() {
        eprintln!("ffmpeg not available, skipping AAC round trip");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.aac");
    let source = sine(0.1, 2, 3.0);
    encoder.encode(&source, &path).unwrap();

    let decoded = SymphoniaDecoder::new().decode(&path).unwrap();
    assert_eq!(decoded.channel_count(), 2);

    let meter = LoudnessMeter::new();
    let diff = meter.measure(&source).unwrap() - meter.measure(&decoded).unwrap();
    assert!(diff.abs() < 1.0, "AAC drift of {diff} LU");
}

#[test]
fn integer_wav_uses_the_decoder_scale() {
    let dir = tempfile::tempdir().unwrap();
    // Every value is an exact 16-bit code under the 2^15 scale
    let samples = vec![-1.0, -0.25, 0.0, 0.5, 12_345.0 / 32_768.0, 32_767.0 / 32_768.0];
    let source = AudioBuffer::new(
        samples.clone(),
        AudioFormat::new(SampleRate::CD_QUALITY, 1, 16),
    );

    for (format, name) in [
        (WavSampleFormat::Pcm16, "codes16.wav"),
        (WavSampleFormat::Pcm24, "codes24.wav"),
    ] {
        let path = dir.path().join(name);
        WavEncoder::new(format).encode(&source, &path).unwrap();
        let decoded = SymphoniaDecoder::new().decode(&path).unwrap();
        assert_eq!(decoded.samples, samples, "{format:?}");
    }
}
