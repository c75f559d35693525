//! Named compressor/limiter presets stored as JSON files

use loudnorm_core::{CompressorParams, NormalizerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Compressor settings plus the peak ceiling, as saved on disk
///
/// ```json
/// {
///     "threshold": -20.0,
///     "ratio": 2.0,
///     "attack": 5.0,
///     "release": 50.0,
///     "peak_limit_target": -3.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Compressor threshold in dBFS
    #[serde(rename = "threshold")]
    pub threshold_db: f64,
    /// Compression ratio
    pub ratio: f64,
    /// Attack in ms
    #[serde(rename = "attack")]
    pub attack_ms: f64,
    /// Release in ms
    #[serde(rename = "release")]
    pub release_ms: f64,
    /// Peak ceiling in dBFS
    #[serde(rename = "peak_limit_target")]
    pub peak_limit_dbfs: f64,
}

impl Preset {
    /// Build a preset from compressor settings and a ceiling
    pub fn new(compressor: CompressorParams, peak_limit_dbfs: f64) -> Self {
        Self {
            threshold_db: compressor.threshold_db,
            ratio: compressor.ratio,
            attack_ms: compressor.attack_ms,
            release_ms: compressor.release_ms,
            peak_limit_dbfs,
        }
    }

    /// The compressor half of the preset
    pub fn compressor(&self) -> CompressorParams {
        CompressorParams {
            threshold_db: self.threshold_db,
            ratio: self.ratio,
            attack_ms: self.attack_ms,
            release_ms: self.release_ms,
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new(CompressorParams::default(), -3.0)
    }
}

/// Preset files in one directory, `<dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Store over `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the presets
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let name = validate_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// Save `preset` under `name`, replacing an existing one
    ///
    /// # Errors
    /// `Validation` for a bad name or out-of-range values, `Io` on write failure
    pub fn save(&self, name: &str, preset: &Preset) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        preset.compressor().validate()?;
        if !preset.peak_limit_dbfs.is_finite() {
            return Err(NormalizerError::validation("peak limit must be finite"));
        }

        fs::create_dir_all(&self.dir)?;

        let mut json = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        preset.serialize(&mut serializer)?;
        fs::write(&path, json)?;

        tracing::info!(name = name.trim(), path = %path.display(), "saved preset");
        Ok(path)
    }

    /// Load the preset called `name`
    ///
    /// # Errors
    /// `PresetNotFound` when no such file exists, `Serialization` when the
    /// file is not a valid preset
    pub fn load(&self, name: &str) -> Result<Preset> {
        let path = self.path_for(name)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NormalizerError::PresetNotFound(name.trim().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Names of all saved presets, sorted
    ///
    /// A missing directory lists as empty.
    ///
    /// # Errors
    /// `Io` when the directory exists but cannot be read
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Delete the preset called `name`
    ///
    /// # Errors
    /// `PresetNotFound` when it does not exist
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(name = name.trim(), "deleted preset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(NormalizerError::PresetNotFound(name.trim().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Preset names become file names: no separators, no empty names
fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NormalizerError::validation("preset name must not be empty"));
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(NormalizerError::validation(format!(
            "invalid preset name: {trimmed}"
        )));
    }
    Ok(trimmed)
}
