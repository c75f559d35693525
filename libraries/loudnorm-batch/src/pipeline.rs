//! Single-file processing: decode, compress, limit, normalize, encode

use crate::paths::Paths;
use loudnorm_audio::{effects::compress, encoder_for, EncoderSettings, SymphoniaDecoder};
use loudnorm_core::{AudioDecoder, ProcessingRequest, ProcessingResult, Result};
use loudnorm_loudness::{
    apply_gain_db, correction_gain_db, LoudnessMeter, LoudnessReport, PeakLimiter,
};
use std::path::Path;
use std::time::Instant;

/// Loudness normalization pipeline
///
/// Runs one input file through:
///
/// ```text
/// decode ─► measure (original) ─► compress ─► peak limit ─► measure ─► gain ─► encode
///                                                                               │
///                                   measure (processed) ◄─ decode ◄─────────────┘
/// ```
///
/// The correction gain is applied after limiting, so a large boost can push
/// peaks back above the ceiling. The output loudness is exact; the ceiling
/// is not re-enforced.
pub struct LoudnessPipeline {
    decoder: Box<dyn AudioDecoder>,
    meter: LoudnessMeter,
    encoder_settings: EncoderSettings,
    paths: Paths,
}

impl LoudnessPipeline {
    /// Pipeline with the Symphonia decoder
    pub fn new(paths: Paths, encoder_settings: EncoderSettings) -> Self {
        Self::with_decoder(Box::new(SymphoniaDecoder::new()), paths, encoder_settings)
    }

    /// Pipeline with a custom decoder
    pub fn with_decoder(
        decoder: Box<dyn AudioDecoder>,
        paths: Paths,
        encoder_settings: EncoderSettings,
    ) -> Self {
        Self {
            decoder,
            meter: LoudnessMeter::new(),
            encoder_settings,
            paths,
        }
    }

    /// Directories in use
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Integrated loudness of a file as decoded
    ///
    /// # Errors
    /// Decode errors, or `Measurement` when the audio cannot be measured
    pub fn measure_file(&self, path: &Path) -> Result<f64> {
        let buffer = self.decoder.decode(path)?;
        Ok(self.meter.measure(&buffer)?)
    }

    /// Full loudness report of a file as decoded
    ///
    /// # Errors
    /// Same as [`LoudnessPipeline::measure_file`]
    pub fn analyze_file(&self, path: &Path) -> Result<LoudnessReport> {
        let buffer = self.decoder.decode(path)?;
        Ok(self.meter.analyze(&buffer)?)
    }

    /// Process one file into the cache
    ///
    /// Never fails: every error ends up in a `Failed` result carrying the
    /// error message.
    pub fn process(&self, input: &Path, request: &ProcessingRequest) -> ProcessingResult {
        let output = self.paths.cache_output_path(input, request.output_format);
        self.process_to(input, request, &output)
    }

    /// Process one file into an explicit output path
    pub fn process_to(
        &self,
        input: &Path,
        request: &ProcessingRequest,
        output_path: &Path,
    ) -> ProcessingResult {
        let started = Instant::now();
        let mut original_lufs = None;

        match self.run(input, request, output_path, &mut original_lufs) {
            Ok(processed_lufs) => {
                tracing::info!(
                    input = %input.display(),
                    output = %output_path.display(),
                    original_lufs,
                    processed_lufs,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "processed file"
                );
                ProcessingResult::completed(original_lufs, processed_lufs, output_path.to_path_buf())
            }
            Err(e) => {
                tracing::warn!(input = %input.display(), "processing failed: {}", e);
                ProcessingResult::failed(e.to_string(), original_lufs)
            }
        }
    }

    fn run(
        &self,
        input: &Path,
        request: &ProcessingRequest,
        output_path: &Path,
        original_lufs: &mut Option<f64>,
    ) -> Result<Option<f64>> {
        request.validate()?;

        let decoded = self.decoder.decode(input)?;
        tracing::debug!(
            input = %input.display(),
            frames = decoded.frames(),
            channels = decoded.channel_count(),
            sample_rate = decoded.sample_rate(),
            "decoded"
        );

        // A file too short or silent to measure can still fail later at the
        // correction step; the original figure is informational only
        *original_lufs = match self.meter.measure(&decoded) {
            Ok(lufs) => Some(lufs),
            Err(e) => {
                tracing::debug!(input = %input.display(), "original loudness unavailable: {}", e);
                None
            }
        };

        let compressed = compress(&decoded, &request.compressor);
        let limited = PeakLimiter::new(request.peak_limit_dbfs).apply(&compressed);

        let measured = self.meter.measure(&limited)?;
        let gain_db = correction_gain_db(measured, request.target.lufs());
        tracing::debug!(
            measured_lufs = measured,
            target_lufs = request.target.lufs(),
            gain_db,
            "applying correction gain"
        );
        let normalized = apply_gain_db(&limited, gain_db);

        encoder_for(request.output_format, &self.encoder_settings)
            .encode(&normalized, output_path)?;

        // Report what actually landed on disk, after any codec loss
        let processed_lufs = match self.measure_file(output_path) {
            Ok(lufs) => Some(lufs),
            Err(e) => {
                tracing::warn!(
                    output = %output_path.display(),
                    "could not re-measure output: {}",
                    e
                );
                None
            }
        };

        Ok(processed_lufs)
    }
}
