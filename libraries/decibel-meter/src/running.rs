//! Running extremes of one meter

use decibel_core::types::MeterReading;
use serde::{Deserialize, Serialize};

/// Current, min, max and peak since the last start or reset
///
/// `None` means no block has been processed. `min`/`max` follow the
/// calibrated (time weighted) stream, `peak` the raw instantaneous stream
/// plus calibration. All three only ever widen until reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStatistics {
    pub current: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub peak: Option<f64>,
}

impl RunningStatistics {
    /// Fold one block into the running values
    pub fn update(&mut self, calibrated_db: f64, peak_candidate_db: f64) {
        self.current = Some(calibrated_db);
        self.min = Some(self.min.map_or(calibrated_db, |min| min.min(calibrated_db)));
        self.max = Some(self.max.map_or(calibrated_db, |max| max.max(calibrated_db)));
        self.peak = Some(
            self.peak
                .map_or(peak_candidate_db, |peak| peak.max(peak_candidate_db)),
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Live reading with the given LEQ
    pub fn reading(&self, leq: f64) -> MeterReading {
        MeterReading {
            current: self.current,
            min: self.min,
            max: self.max,
            peak: self.peak,
            leq,
        }
    }
}
