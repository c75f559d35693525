/// Processing parameters
use crate::error::{NormalizerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dynamic-range compressor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorParams {
    /// Threshold in dBFS; levels above it are compressed
    pub threshold_db: f64,

    /// Compression ratio (e.g. 2.0 means 2:1)
    pub ratio: f64,

    /// Attack time in milliseconds (63% response time on rising level)
    pub attack_ms: f64,

    /// Release time in milliseconds (63% response time on falling level)
    pub release_ms: f64,
}

impl CompressorParams {
    /// Check the parameters are inside their domain
    ///
    /// # Errors
    /// Returns `NormalizerError::Validation` for a non-finite threshold, a
    /// ratio <= 0, or a non-positive attack/release time
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_db.is_finite() {
            return Err(NormalizerError::validation(format!(
                "threshold must be finite, got {}",
                self.threshold_db
            )));
        }
        if !(self.ratio.is_finite() && self.ratio > 0.0) {
            return Err(NormalizerError::validation(format!(
                "ratio must be greater than 0, got {}",
                self.ratio
            )));
        }
        if !(self.attack_ms.is_finite() && self.attack_ms > 0.0) {
            return Err(NormalizerError::validation(format!(
                "attack must be greater than 0 ms, got {}",
                self.attack_ms
            )));
        }
        if !(self.release_ms.is_finite() && self.release_ms > 0.0) {
            return Err(NormalizerError::validation(format!(
                "release must be greater than 0 ms, got {}",
                self.release_ms
            )));
        }
        Ok(())
    }
}

impl Default for CompressorParams {
    /// -20 dBFS threshold, 2:1 ratio, 5 ms attack, 50 ms release
    fn default() -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 2.0,
            attack_ms: 5.0,
            release_ms: 50.0,
        }
    }
}

/// Target integrated loudness in LUFS
///
/// The front end collects the target as a positive magnitude ("16") and the
/// core works with the negative LUFS value (-16). `from_magnitude` performs
/// that negation; `from_lufs` takes the value as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetLoudness(f64);

impl TargetLoudness {
    /// Target from a user-entered magnitude (16.0 -> -16 LUFS)
    pub fn from_magnitude(magnitude: f64) -> Self {
        Self(-magnitude)
    }

    /// Target from a LUFS value
    pub fn from_lufs(lufs: f64) -> Self {
        Self(lufs)
    }

    /// The target in LUFS
    pub fn lufs(&self) -> f64 {
        self.0
    }

    /// The target as the positive magnitude shown to users
    pub fn magnitude(&self) -> f64 {
        -self.0
    }
}

impl Default for TargetLoudness {
    fn default() -> Self {
        Self::from_magnitude(16.0)
    }
}

impl fmt::Display for TargetLoudness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} LUFS", self.0)
    }
}

/// Output container/codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PCM WAV
    #[default]
    Wav,
    /// Lossy AAC (ADTS stream)
    Aac,
}

impl OutputFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Aac => "aac",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Wav => f.write_str("WAV"),
            OutputFormat::Aac => f.write_str("AAC"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = NormalizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "wav" => Ok(Self::Wav),
            "aac" => Ok(Self::Aac),
            other => Err(NormalizerError::validation(format!(
                "unsupported output format: {other}"
            ))),
        }
    }
}

/// Everything one pipeline run needs besides the input path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingRequest {
    /// Output format
    pub output_format: OutputFormat,
    /// Target integrated loudness
    pub target: TargetLoudness,
    /// Compressor settings
    pub compressor: CompressorParams,
    /// Peak ceiling in dBFS applied after compression
    pub peak_limit_dbfs: f64,
}

impl ProcessingRequest {
    /// Reject out-of-domain parameters before any file is touched
    ///
    /// # Errors
    /// Returns `NormalizerError::Validation` describing the first bad value
    pub fn validate(&self) -> Result<()> {
        self.compressor.validate()?;
        if !self.peak_limit_dbfs.is_finite() {
            return Err(NormalizerError::validation(format!(
                "peak limit must be finite, got {}",
                self.peak_limit_dbfs
            )));
        }
        let target = self.target.lufs();
        if !target.is_finite() || target > 0.0 {
            return Err(NormalizerError::validation(format!(
                "target loudness must be a finite value <= 0 LUFS, got {target}"
            )));
        }
        Ok(())
    }
}

impl Default for ProcessingRequest {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Wav,
            target: TargetLoudness::default(),
            compressor: CompressorParams::default(),
            peak_limit_dbfs: -3.0,
        }
    }
}
