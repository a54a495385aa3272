//! Measurement history
//!
//! Bounded sequence of per-block records for one meter. When full, the
//! oldest half is evicted in one batch rather than one record per append.

use crate::statistics;
use chrono::{DateTime, Utc};
use decibel_core::types::MeasurementRecord;
use std::collections::VecDeque;

/// Default number of records kept per meter
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Bounded record history with batch eviction
///
/// Not synchronized by itself: the session guards it together with the
/// level duration accumulator so an append and its eviction are observed
/// as one step.
#[derive(Debug, Clone)]
pub struct MeasurementHistory {
    /// Records, oldest at the front
    records: VecDeque<MeasurementRecord>,

    capacity: usize,

    /// Records evicted since creation or the last clear
    evicted: u64,

    /// Sum of linear energies of `records`, for LEQ without a copy
    energy_sum: f64,
}

impl MeasurementHistory {
    /// Create a history holding at most `capacity` records (minimum 2)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
            energy_sum: 0.0,
        }
    }

    /// Append a record
    ///
    /// If the history is full, the oldest `capacity / 2` records are dropped
    /// first. Returns the number of records evicted.
    pub fn append(&mut self, record: MeasurementRecord) -> usize {
        let mut evicted = 0;
        if self.records.len() >= self.capacity {
            evicted = self.capacity / 2;
            self.records.drain(..evicted);
            self.evicted += evicted as u64;
            // Recomputed rather than subtracted so rounding does not drift
            self.energy_sum = self
                .records
                .iter()
                .map(|r| statistics::energy(r.calibrated_decibel))
                .sum();
        }
        self.energy_sum += statistics::energy(record.calibrated_decibel);
        self.records.push_back(record);
        evicted
    }

    /// Copy of every record, oldest first
    pub fn snapshot(&self) -> Vec<MeasurementRecord> {
        self.records.iter().cloned().collect()
    }

    /// Copy of the records captured at or after `since`, in append order
    ///
    /// Timestamps come from the caller's clock and may step backwards, so
    /// every record is checked.
    pub fn since(&self, since: DateTime<Utc>) -> Vec<MeasurementRecord> {
        self.records
            .iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect()
    }

    /// Equivalent continuous level of the calibrated values, 0.0 when empty
    pub fn leq(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        10.0 * (self.energy_sum / self.records.len() as f64).log10()
    }

    /// Calibrated levels, oldest first
    pub fn calibrated_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.calibrated_decibel).collect()
    }

    pub fn latest(&self) -> Option<&MeasurementRecord> {
        self.records.back()
    }

    pub fn first(&self) -> Option<&MeasurementRecord> {
        self.records.front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.evicted = 0;
        self.energy_sum = 0.0;
    }
}

impl Default for MeasurementHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
