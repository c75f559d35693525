/// Audio-specific errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Encoding error
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),

    /// WAV writer error
    #[error("WAV error: {0}")]
    Wav(String),

    /// ffmpeg could not be run or failed
    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        Self::Wav(err.to_string())
    }
}

impl From<AudioError> for loudnorm_core::NormalizerError {
    fn from(err: AudioError) -> Self {
        use loudnorm_core::NormalizerError;
        match err {
            AudioError::FileNotFound(path) => NormalizerError::FileNotFound(path),
            AudioError::Io(e) => NormalizerError::Io(e),
            AudioError::UnsupportedFormat(_)
            | AudioError::DecodeError(_)
            | AudioError::Symphonia(_) => NormalizerError::decode(err.to_string()),
            AudioError::EncodeError(_) | AudioError::Wav(_) | AudioError::Ffmpeg(_) => {
                NormalizerError::encode(err.to_string())
            }
        }
    }
}
