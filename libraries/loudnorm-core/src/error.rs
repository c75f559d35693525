/// Core error types for the loudness normalizer
use thiserror::Error;

/// Result type alias using `NormalizerError`
pub type Result<T> = std::result::Result<T, NormalizerError>;

/// Core error type
///
/// Every library crate converts its own error enum into one of these
/// variants, so a per-file failure can be reported as a single string.
#[derive(Error, Debug)]
pub enum NormalizerError {
    /// Input could not be read or decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Output could not be encoded or written
    #[error("Encode error: {0}")]
    Encode(String),

    /// Loudness measurement precondition violated
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// Parameter outside its domain
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// Referenced upload is missing
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Named preset does not exist
    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl NormalizerError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an encode error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a measurement error
    pub fn measurement(msg: impl Into<String>) -> Self {
        Self::Measurement(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a file not found error
    pub fn file_not_found(name: impl Into<String>) -> Self {
        Self::FileNotFound(name.into())
    }
}
