//! Level duration accumulator
//!
//! Exposure time per rounded integer level. This is the record the
//! permissible exposure table is built from, so it is never trimmed along
//! with the history; only a session reset clears it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative exposure seconds keyed by `round(level)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelDurationAccumulator {
    durations: BTreeMap<i32, f64>,
}

impl LevelDurationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket a level is counted in
    pub fn bucket(level_db: f64) -> i32 {
        level_db.round() as i32
    }

    /// Add `seconds` of exposure at `level_db`
    pub fn add(&mut self, level_db: f64, seconds: f64) {
        if !level_db.is_finite() || seconds <= 0.0 {
            return;
        }
        *self.durations.entry(Self::bucket(level_db)).or_insert(0.0) += seconds;
    }

    /// Seconds accumulated in one bucket
    pub fn seconds_at(&self, bucket: i32) -> f64 {
        self.durations.get(&bucket).copied().unwrap_or(0.0)
    }

    /// Total exposure time across all buckets
    pub fn total_seconds(&self) -> f64 {
        self.durations.values().sum()
    }

    /// Buckets in ascending level order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.durations.iter().map(|(&level, &seconds)| (level, seconds))
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn clear(&mut self) {
        self.durations.clear();
    }
}
