/// Per-block measurement record
use super::{FrequencyWeighting, TimeWeighting};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of magnitude bins carried by every record
pub const SPECTRUM_BANDS: usize = 32;

/// Immutable result of processing one audio block
///
/// `calibrated_decibel` is derived from the time weighting that was active
/// when the record was built; changing the weighting later does not touch
/// stored records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Capture instant of the block
    pub timestamp: DateTime<Utc>,

    /// Unweighted instantaneous level (dB SPL, clamped)
    pub raw_decibel: f64,

    /// Raw level plus the frequency weighting compensation
    pub frequency_weighted_decibel: f64,

    /// Frequency weighted level through the Fast filter
    pub fast_decibel: f64,

    /// Frequency weighted level through the Slow filter
    pub slow_decibel: f64,

    /// Active time weighting output plus calibration offset, clamped
    pub calibrated_decibel: f64,

    pub frequency_weighting: FrequencyWeighting,

    pub time_weighting: TimeWeighting,

    /// Placeholder magnitudes, not a physical spectrum
    pub frequency_spectrum: [f64; SPECTRUM_BANDS],
}

impl MeasurementRecord {
    /// Seconds elapsed between `origin` and this record (negative if earlier)
    pub fn seconds_since(&self, origin: DateTime<Utc>) -> f64 {
        (self.timestamp - origin)
            .num_microseconds()
            .map_or(0.0, |us| us as f64 / 1_000_000.0)
    }
}
