/// Statistics bundle
use serde::{Deserialize, Serialize};

/// Statistical summary of one meter
///
/// `min`, `max` and `peak` come from the running extremes of the session, not
/// from the (trimmed) history, so they stay `None` until the first block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecibelStatistics {
    /// Number of records the history-derived fields were computed from
    pub count: usize,

    /// Seconds between the first and last record of the history snapshot
    pub duration_seconds: f64,

    /// Most recent calibrated level
    pub current: Option<f64>,

    /// Arithmetic mean of calibrated levels
    pub avg: f64,

    pub min: Option<f64>,

    pub max: Option<f64>,

    pub peak: Option<f64>,

    /// Equivalent continuous level
    pub leq: f64,

    /// Level exceeded 10% of the time (90th percentile)
    pub l10: f64,

    /// Median level
    pub l50: f64,

    /// Level exceeded 90% of the time (10th percentile)
    pub l90: f64,

    /// Sample standard deviation
    pub standard_deviation: f64,
}

impl DecibelStatistics {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
