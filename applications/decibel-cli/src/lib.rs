//! Decibel CLI Library
//!
//! Offline sound level analysis: replays WAV recordings through a
//! measurement session and exports the report.
//!
//! This library exposes the core components for testing purposes.

pub mod analyze;
pub mod config;
pub mod error;
pub mod wav;

// Re-export commonly used types for convenience
pub use analyze::analyze_samples;
pub use config::{load_config, ConfigOverrides};
pub use error::{CliError, Result};
pub use wav::{read_mono, MonoRecording};
