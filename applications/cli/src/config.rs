/// Normalizer configuration
use crate::error::{CliError, Result};
use loudnorm_audio::{EncoderSettings, WavSampleFormat};
use loudnorm_batch::{Paths, Preset};
use loudnorm_core::{CompressorParams, OutputFormat, ProcessingRequest, TargetLoudness};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "loudnorm.toml";

/// Prefix of environment overrides, e.g. `LOUDNORM_ENCODING__AAC_BITRATE=256`
pub const ENV_PREFIX: &str = "LOUDNORM";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_paths")]
    pub paths: PathSettings,

    #[serde(default = "default_defaults")]
    pub defaults: DefaultSettings,

    #[serde(default = "default_encoding")]
    pub encoding: EncodingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PathSettings {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_presets_dir")]
    pub presets_dir: PathBuf,
}

/// Processing parameters used when the command line does not set them
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DefaultSettings {
    /// Target loudness as a positive magnitude (16 means -16 LUFS)
    #[serde(default = "default_target_loudness")]
    pub target_loudness: f64,

    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default = "default_ratio")]
    pub ratio: f64,

    #[serde(default = "default_attack")]
    pub attack: f64,

    #[serde(default = "default_release")]
    pub release: f64,

    #[serde(default = "default_peak_limit")]
    pub peak_limit: f64,

    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EncodingSettings {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// AAC bitrate in kbit/s
    #[serde(default = "default_aac_bitrate")]
    pub aac_bitrate: u32,

    #[serde(default)]
    pub wav_sample_format: WavSampleFormat,
}

/// Parameters given explicitly on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamOverrides {
    pub output_format: Option<OutputFormat>,
    pub target_loudness: Option<f64>,
    pub threshold: Option<f64>,
    pub ratio: Option<f64>,
    pub attack: Option<f64>,
    pub release: Option<f64>,
    pub peak_limit: Option<f64>,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `loudnorm.toml` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load with an explicit environment source
    pub fn load_from(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Nested keys use a double underscore so single underscores survive
        // in field names (LOUDNORM_PATHS__CACHE_DIR)
        settings = settings.add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.default_request()
            .validate()
            .map_err(|e| CliError::Config(format!("invalid defaults: {e}")))?;

        if !(32..=512).contains(&self.encoding.aac_bitrate) {
            return Err(CliError::Config(format!(
                "aac_bitrate must be between 32 and 512 kbit/s, got {}",
                self.encoding.aac_bitrate
            )));
        }

        Ok(())
    }

    pub fn paths(&self) -> Paths {
        Paths::new(&self.paths.cache_dir, &self.paths.presets_dir)
    }

    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            wav_sample_format: self.encoding.wav_sample_format,
            ffmpeg_path: self.encoding.ffmpeg_path.clone(),
            aac_bitrate_kbps: self.encoding.aac_bitrate,
        }
    }

    /// Request built from the configured defaults alone
    pub fn default_request(&self) -> ProcessingRequest {
        self.request_with(None, &ParamOverrides::default())
    }

    /// Resolve the request: configured defaults, then the preset, then flags
    pub fn request_with(
        &self,
        preset: Option<&Preset>,
        overrides: &ParamOverrides,
    ) -> ProcessingRequest {
        let d = &self.defaults;
        let base = preset.copied().unwrap_or_else(|| {
            Preset::new(
                CompressorParams {
                    threshold_db: d.threshold,
                    ratio: d.ratio,
                    attack_ms: d.attack,
                    release_ms: d.release,
                },
                d.peak_limit,
            )
        });

        ProcessingRequest {
            output_format: overrides.output_format.unwrap_or(d.output_format),
            target: TargetLoudness::from_magnitude(
                overrides.target_loudness.unwrap_or(d.target_loudness),
            ),
            compressor: CompressorParams {
                threshold_db: overrides.threshold.unwrap_or(base.threshold_db),
                ratio: overrides.ratio.unwrap_or(base.ratio),
                attack_ms: overrides.attack.unwrap_or(base.attack_ms),
                release_ms: overrides.release.unwrap_or(base.release_ms),
            },
            peak_limit_dbfs: overrides.peak_limit.unwrap_or(base.peak_limit_dbfs),
        }
    }
}

// Default values
fn default_paths() -> PathSettings {
    PathSettings {
        cache_dir: default_cache_dir(),
        presets_dir: default_presets_dir(),
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./loudnorm_cache")
}

fn default_presets_dir() -> PathBuf {
    PathBuf::from("./presets")
}

fn default_defaults() -> DefaultSettings {
    DefaultSettings {
        target_loudness: default_target_loudness(),
        threshold: default_threshold(),
        ratio: default_ratio(),
        attack: default_attack(),
        release: default_release(),
        peak_limit: default_peak_limit(),
        output_format: OutputFormat::default(),
    }
}

fn default_target_loudness() -> f64 {
    16.0
}

fn default_threshold() -> f64 {
    -20.0
}

fn default_ratio() -> f64 {
    2.0
}

fn default_attack() -> f64 {
    5.0
}

fn default_release() -> f64 {
    50.0
}

fn default_peak_limit() -> f64 {
    -3.0
}

fn default_encoding() -> EncodingSettings {
    EncodingSettings {
        ffmpeg_path: default_ffmpeg_path(),
        aac_bitrate: default_aac_bitrate(),
        wav_sample_format: WavSampleFormat::default(),
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_aac_bitrate() -> u32 {
    192
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            defaults: default_defaults(),
            encoding: default_encoding(),
        }
    }
}
