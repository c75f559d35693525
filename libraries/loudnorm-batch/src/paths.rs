//! Working directories for cache and presets

use loudnorm_core::{OutputFormat, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the stem of every processed file
pub const PROCESSED_SUFFIX: &str = "_processed";

/// Cache and preset directories
///
/// Passed to every component that touches the filesystem instead of
/// process-wide constants, so tests can point them at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Where processed outputs are written
    pub cache_dir: PathBuf,
    /// Where preset JSON files live
    pub presets_dir: PathBuf,
}

impl Paths {
    /// Create paths without touching the filesystem
    pub fn new(cache_dir: impl Into<PathBuf>, presets_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            presets_dir: presets_dir.into(),
        }
    }

    /// Both directories under one root (`<root>/cache`, `<root>/presets`)
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("cache"), root.join("presets"))
    }

    /// Create both directories if they are missing
    ///
    /// # Errors
    /// Returns `NormalizerError::Io` when a directory cannot be created
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::create_dir_all(&self.presets_dir)?;
        Ok(())
    }

    /// Cache location for the processed version of `input`
    ///
    /// `<cache_dir>/<stem>_processed.<ext>`; a later run on the same input
    /// overwrites it.
    pub fn cache_output_path(&self, input: &Path, format: OutputFormat) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        self.cache_dir
            .join(format!("{stem}{PROCESSED_SUFFIX}.{}", format.extension()))
    }

    /// Remove everything inside the cache directory, keeping the directory
    ///
    /// Entries that cannot be removed are logged and skipped. Returns the
    /// number of entries removed. A missing cache directory removes nothing.
    ///
    /// # Errors
    /// Returns `NormalizerError::Io` only when the directory cannot be listed
    pub fn clear_cache(&self) -> Result<usize> {
        if !self.cache_dir.exists() {
            tracing::debug!(dir = %self.cache_dir.display(), "cache directory not found");
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Failed to read cache entry: {}", e);
                    continue;
                }
            };

            let outcome = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match outcome {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %path.display(), "Failed to remove: {}", e),
            }
        }

        tracing::info!(dir = %self.cache_dir.display(), removed, "cleared cache");
        Ok(removed)
    }
}

/// Claim `path` for one output of the current batch
///
/// When an earlier output already took it, `_2`, `_3`, ... is appended to the
/// stem until the name is free.
pub(crate) fn claim_unique(path: PathBuf, taken: &mut HashSet<PathBuf>) -> PathBuf {
    if taken.insert(path.clone()) {
        return path;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 2_usize;
    loop {
        let candidate = path.with_file_name(format!("{stem}_{n}{extension}"));
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_path_uses_stem_and_format() {
        let paths = Paths::new("/tmp/cache", "/tmp/presets");
        assert_eq!(
            paths.cache_output_path(Path::new("/music/My Song.mp3"), OutputFormat::Aac),
            PathBuf::from("/tmp/cache/My Song_processed.aac")
        );
        assert_eq!(
            paths.cache_output_path(Path::new("take.2.flac"), OutputFormat::Wav),
            PathBuf::from("/tmp/cache/take.2_processed.wav")
        );
    }

    #[test]
    fn claimed_names_get_a_counter() {
        let mut taken = HashSet::new();
        let path = PathBuf::from("/c/song_processed.wav");
        assert_eq!(claim_unique(path.clone(), &mut taken), path);
        assert_eq!(
            claim_unique(path.clone(), &mut taken),
            PathBuf::from("/c/song_processed_2.wav")
        );
        assert_eq!(
            claim_unique(path, &mut taken),
            PathBuf::from("/c/song_processed_3.wav")
        );
    }

    #[test]
    fn clear_cache_keeps_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::under(dir.path());
        paths.prepare().unwrap();
        fs::write(paths.cache_dir.join("a_processed.wav"), b"x").unwrap();
        fs::create_dir(paths.cache_dir.join("nested")).unwrap();
        fs::write(paths.cache_dir.join("nested").join("b"), b"y").unwrap();

        assert_eq!(paths.clear_cache().unwrap(), 2);
        assert!(paths.cache_dir.is_dir());
        assert_eq!(fs::read_dir(&paths.cache_dir).unwrap().count(), 0);
    }

    #[test]
    fn clearing_a_missing_cache_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::under(&dir.path().join("never-created"));
        assert_eq!(paths.clear_cache().unwrap(), 0);
    }
}
