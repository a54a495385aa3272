//! Decibel Core
//!
//! Platform-agnostic measurement types and error handling for the Decibel
//! sound-level meter and noise dosimeter.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Settings**: `FrequencyWeighting`, `TimeWeighting`, `NoiseStandard`
//! - **Records**: `MeasurementRecord`, one per processed audio block
//! - **Bundles**: `DecibelStatistics`, `NoiseDoseData`, `PermissibleExposureTable`,
//!   `MeterSnapshot` - all serializable to JSON with stable field names
//! - **Error Handling**: Unified `MeterError` and `Result` types
//!
//! The signal processing lives in `decibel-dsp` and the stateful measurement
//! session in `decibel-meter`.
//!
//! # Example
//!
//! ```rust
//! use decibel_core::types::{FrequencyWeighting, NoiseStandard, TimeWeighting};
//!
//! let weighting: FrequencyWeighting = "A".parse().unwrap();
//! assert_eq!(weighting, FrequencyWeighting::A);
//!
//! let profile = NoiseStandard::Niosh.profile();
//! assert_eq!(profile.exchange_rate_db, 3.0);
//! assert_eq!(TimeWeighting::Fast.time_constant_secs(), 0.125);
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{MeterError, Result};
