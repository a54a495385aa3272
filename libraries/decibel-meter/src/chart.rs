//! Chart data builders
//!
//! Shapes history snapshots for plotting. Consumers only ever see copies.

use chrono::{DateTime, Utc};
use decibel_core::types::MeasurementRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of a level-over-time chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Seconds from the chart origin
    pub seconds_from_start: f64,
    pub decibel: f64,
}

/// Number of records that fell into one integer dB bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelHistogramBin {
    pub level_db: i32,
    pub count: usize,
}

/// Calibrated levels over time, relative to `origin`
///
/// Without an origin the first record is time zero.
pub fn time_series(records: &[MeasurementRecord], origin: Option<DateTime<Utc>>) -> Vec<ChartPoint> {
    let Some(origin) = origin.or_else(|| records.first().map(|r| r.timestamp)) else {
        return Vec::new();
    };

    records
        .iter()
        .map(|record| ChartPoint {
            seconds_from_start: record.seconds_since(origin),
            decibel: record.calibrated_decibel,
        })
        .collect()
}

/// Distribution of calibrated levels in 1 dB bins, ascending
pub fn level_histogram(records: &[MeasurementRecord]) -> Vec<LevelHistogramBin> {
    let mut bins: BTreeMap<i32, usize> = BTreeMap::new();
    for record in records {
        *bins
            .entry(record.calibrated_decibel.round() as i32)
            .or_insert(0) += 1;
    }
    bins.into_iter()
        .map(|(level_db, count)| LevelHistogramBin { level_db, count })
        .collect()
}
