/// Core traits for the loudness normalizer
use crate::error::Result;
use crate::types::{AudioBuffer, OutputFormat};
use std::path::Path;

/// Audio decoder trait
///
/// Implementers decode a whole audio file into an in-memory `AudioBuffer`.
pub trait AudioDecoder: Send + Sync {
    /// Decode an audio file from the given path
    ///
    /// # Errors
    /// Returns `NormalizerError::Decode` if the container or codec is
    /// unrecognized or the stream is corrupt, and `FileNotFound` if the path
    /// does not exist
    fn decode(&self, path: &Path) -> Result<AudioBuffer>;

    /// Check if the decoder is expected to handle the given file
    fn supports_format(&self, path: &Path) -> bool;
}

/// Audio encoder trait
///
/// Implementers write an `AudioBuffer` to disk in one output format,
/// replacing any file already at `path`.
pub trait AudioEncoder: Send + Sync {
    /// Encode `buffer` into `path`
    ///
    /// # Errors
    /// Returns `NormalizerError::Encode` if the format cannot be produced or
    /// the file cannot be written
    fn encode(&self, buffer: &AudioBuffer, path: &Path) -> Result<()>;

    /// The format this encoder produces
    fn format(&self) -> OutputFormat;
}
