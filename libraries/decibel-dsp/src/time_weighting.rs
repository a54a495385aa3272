//! Time weighting ballistics (IEC 61672-1)
//!
//! Each weighting is a single-pole exponential smoother driven by the real
//! time elapsed between updates:
//!
//! ```text
//! alpha    = 1 - exp(-dt / tau)
//! filtered = previous + alpha * (current - previous)
//! ```
//!
//! Fast uses tau = 125 ms, Slow tau = 1 s. Impulse picks tau = 35 ms while
//! the level rises and tau = 1.5 s while it falls.
//!
//! The three weightings keep separate state so the pipeline can run Fast and
//! Slow on every block and still switch the active weighting without a cold
//! start.

use chrono::{DateTime, Utc};
use decibel_core::types::TimeWeighting;

/// Single exponential smoother state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ExponentialState {
    previous: Option<f64>,
    last_update: Option<DateTime<Utc>>,
}

impl ExponentialState {
    fn update(&mut self, current: f64, now: DateTime<Utc>, rise_secs: f64, fall_secs: f64) -> f64 {
        let (Some(previous), Some(last_update)) = (self.previous, self.last_update) else {
            // First sample seeds the filter
            self.previous = Some(current);
            self.last_update = Some(now);
            return current;
        };

        let dt = elapsed_secs(last_update, now);
        if dt <= 0.0 {
            return previous;
        }

        let time_constant = if current > previous {
            rise_secs
        } else {
            fall_secs
        };
        let alpha = 1.0 - (-dt / time_constant).exp();
        let filtered = previous + alpha * (current - previous);

        self.previous = Some(filtered);
        self.last_update = Some(now);
        filtered
    }
}

/// Seconds from `from` to `to`; saturates instead of overflowing
fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    delta
        .num_microseconds()
        .map_or_else(|| delta.num_seconds() as f64, |us| us as f64 / 1_000_000.0)
}

/// Fast, Slow and Impulse filters with independent state
#[derive(Debug, Clone, Default)]
pub struct TimeWeightingFilter {
    fast: ExponentialState,
    slow: ExponentialState,
    impulse: ExponentialState,
}

impl TimeWeightingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 125 ms exponential response
    pub fn apply_fast_weighting(&mut self, value: f64, now: DateTime<Utc>) -> f64 {
        let tau = TimeWeighting::Fast.time_constant_secs();
        self.fast.update(value, now, tau, tau)
    }

    /// 1 s exponential response
    pub fn apply_slow_weighting(&mut self, value: f64, now: DateTime<Utc>) -> f64 {
        let tau = TimeWeighting::Slow.time_constant_secs();
        self.slow.update(value, now, tau, tau)
    }

    /// 35 ms attack, 1.5 s release
    pub fn apply_impulse_weighting(&mut self, value: f64, now: DateTime<Utc>) -> f64 {
        self.impulse.update(
            value,
            now,
            TimeWeighting::Impulse.time_constant_secs(),
            TimeWeighting::Impulse.release_time_constant_secs(),
        )
    }

    /// Dispatch to the filter of `kind`
    pub fn apply_weighting(&mut self, kind: TimeWeighting, value: f64, now: DateTime<Utc>) -> f64 {
        match kind {
            TimeWeighting::Fast => self.apply_fast_weighting(value, now),
            TimeWeighting::Slow => self.apply_slow_weighting(value, now),
            TimeWeighting::Impulse => self.apply_impulse_weighting(value, now),
        }
    }

    /// Last output of the filter for `kind`, `None` before its first update
    pub fn previous_value(&self, kind: TimeWeighting) -> Option<f64> {
        match kind {
            TimeWeighting::Fast => self.fast.previous,
            TimeWeighting::Slow => self.slow.previous,
            TimeWeighting::Impulse => self.impulse.previous,
        }
    }

    /// Forget all filter history
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
