//! Error types for the measurement engine

use crate::types::MeasurementState;
use thiserror::Error;

/// Result type alias using `MeterError`
pub type Result<T> = std::result::Result<T, MeterError>;

/// Errors reported by the measurement engine
///
/// Numeric degeneracies (empty history, zero duration) are never errors;
/// they produce defined fallback values instead.
#[derive(Error, Debug)]
pub enum MeterError {
    /// Lifecycle operation not valid in the current state
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: MeasurementState,
    },

    /// The audio capture collaborator failed
    #[error("Capture error: {0}")]
    Capture(String),

    /// Sample rate outside the supported range
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Configuration value rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unrecognized frequency weighting name
    #[error("Unknown frequency weighting: {0}")]
    UnknownFrequencyWeighting(String),

    /// Unrecognized time weighting name
    #[error("Unknown time weighting: {0}")]
    UnknownTimeWeighting(String),

    /// Unrecognized noise standard name
    #[error("Unknown noise standard: {0}")]
    UnknownNoiseStandard(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
