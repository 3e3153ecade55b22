//! Engine error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No output device available")]
    DeviceNotFound,

    #[error("Failed to build output stream: {0}")]
    StreamBuildFailed(String),

    #[error("Failed to start output stream: {0}")]
    StreamStartFailed(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid clip placement: {0}")]
    InvalidPlacement(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
