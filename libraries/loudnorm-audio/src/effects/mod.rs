//! Dynamics processing
//!
//! Effects here work on interleaved f32 buffers with any channel count.
//!
//! Available effects:
//! - **Compressor**: feed-forward dynamic range compressor with linked-channel detection

mod compressor;

pub use compressor::{compress, Compressor};

#[cfg(test)]
pub(crate) mod test_signals {
    /// Generate an interleaved sine wave for testing
    pub(crate) fn generate_sine(
        freq: f32,
        amplitude: f32,
        sample_rate: u32,
        channels: usize,
        duration_secs: f32,
    ) -> Vec<f32> {
        let num_frames = (sample_rate as f32 * duration_secs) as usize;
        let mut samples = Vec::with_capacity(num_frames * channels);

        for i in 0..num_frames {
            let t = i as f32 / sample_rate as f32;
            let sample = amplitude * (2.0 * std::f32::consts::PI * freq * t).sin();
            for _ in 0..channels {
                samples.push(sample);
            }
        }

        samples
    }
}
