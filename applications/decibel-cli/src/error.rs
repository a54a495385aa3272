/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Measurement error: {0}")]
    Meter(#[from] decibel_core::MeterError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported audio: {0}")]
    UnsupportedAudio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}
