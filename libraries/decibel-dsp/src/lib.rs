//! Signal processing for the Decibel sound-level meter
//!
//! This crate provides:
//! - Frequency weighting curves (A, B, C, Z, ITU-R 468)
//! - Time weighting ballistics (Fast, Slow, Impulse) per IEC 61672-1
//! - Block level calculation (RMS -> dB SPL -> weighted -> calibrated)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────────┐
//! │ PCM Block   │ ──► │  RMS / dB    │ ──► │ Frequency Weight  │
//! └─────────────┘     └──────────────┘     └───────────────────┘
//!                                                   │
//!                                                   ▼
//! ┌───────────────────┐     ┌────────────────┐     ┌──────────────┐
//! │ MeasurementRecord │ ◄── │ Calibrate/Clamp│ ◄── │ Time Weight  │
//! └───────────────────┘     └────────────────┘     └──────────────┘
//! ```
//!
//! The live pipeline applies frequency weighting as a scalar broadband
//! compensation (see [`frequency::scalar_compensation_db`]); the analytic
//! curves are available for per-frequency queries.
//!
//! # Example
//!
//! ```rust
//! use decibel_dsp::{LevelCalculator, LevelSettings};
//! use decibel_core::types::FrequencyWeighting;
//! use chrono::Utc;
//!
//! let mut calculator = LevelCalculator::new();
//! let settings = LevelSettings::default().with_frequency_weighting(FrequencyWeighting::C);
//!
//! let block = vec![0.1_f32; 2048];
//! let record = calculator.process(&block, &settings, Utc::now());
//! assert!(record.calibrated_decibel <= decibel_dsp::MAX_DECIBEL_LIMIT);
//! ```

#![deny(unsafe_code)]

pub mod frequency;
pub mod level;
pub mod spectrum;
pub mod time_weighting;

pub use frequency::{scalar_compensation_db, weight, weighting_db};
pub use level::{LevelCalculator, LevelSettings};
pub use spectrum::PlaceholderSpectrum;
pub use time_weighting::TimeWeightingFilter;

/// Reference sound pressure (20 µPa)
pub const REFERENCE_PRESSURE: f64 = 20e-6;

/// Added before every logarithm so silence maps to a finite level
pub const LOG_EPSILON: f64 = 1e-10;

/// Lowest reported level in dB
pub const MIN_DECIBEL_LIMIT: f64 = -20.0;

/// Highest reported level in dB
pub const MAX_DECIBEL_LIMIT: f64 = 140.0;

/// Clamp a level into the reportable range
///
/// NaN (from corrupt input samples) maps to the floor.
#[inline]
pub fn clamp_decibel(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_DECIBEL_LIMIT;
    }
    value.clamp(MIN_DECIBEL_LIMIT, MAX_DECIBEL_LIMIT)
}
