//! Statistics over history snapshots
//!
//! Pure functions over copied history. MIN/MAX/PEAK are not recomputed
//! here: they come from [`RunningStatistics`] because history eviction must
//! not erase the all-time extremes.
//!
//! Percentile naming follows acoustics convention: L10 is the level
//! exceeded 10% of the time, which is the 90th percentile.

use crate::running::RunningStatistics;
use decibel_core::types::{DecibelStatistics, MeasurementRecord};

/// Linear energy of a level, `10^(v/10)`
pub fn energy(level_db: f64) -> f64 {
    10.0_f64.powf(level_db / 10.0)
}

/// Equivalent continuous level: `10·log10(mean(10^(v/10)))`
///
/// Returns 0.0 for an empty input.
pub fn leq(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: f64 = values.iter().map(|v| energy(*v)).sum();
    10.0 * (total / values.len() as f64).log10()
}

/// Nearest-rank percentile of ascending `sorted_values`
///
/// Index is `ceil(n·p/100) − 1`, clamped into range. Returns 0.0 for an
/// empty input.
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return 0.0;
    }
    let rank = (n as f64 * p / 100.0).ceil() as i64 - 1;
    let index = rank.clamp(0, n as i64 - 1) as usize;
    sorted_values[index]
}

/// Arithmetic mean, 0.0 for an empty input
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator), 0.0 below two values
pub fn standard_deviation(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Ascending copy of `values`
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Full statistics bundle of a history snapshot
pub fn compute(records: &[MeasurementRecord], running: &RunningStatistics) -> DecibelStatistics {
    let values: Vec<f64> = records.iter().map(|r| r.calibrated_decibel).collect();
    let sorted_values = sorted(&values);
    let avg = mean(&values);

    let duration_seconds = match (records.first(), records.last()) {
        (Some(first), Some(last)) => last.seconds_since(first.timestamp),
        _ => 0.0,
    };

    DecibelStatistics {
        count: values.len(),
        duration_seconds,
        current: running.current,
        avg,
        min: running.min,
        max: running.max,
        peak: running.peak,
        leq: leq(&values),
        l10: percentile(&sorted_values, 90.0),
        l50: percentile(&sorted_values, 50.0),
        l90: percentile(&sorted_values, 10.0),
        standard_deviation: standard_deviation(&values, avg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use decibel_core::types::{FrequencyWeighting, TimeWeighting, SPECTRUM_BANDS};

    fn records(levels: &[f64]) -> Vec<MeasurementRecord> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| MeasurementRecord {
                timestamp: start + Duration::milliseconds(500 * i as i64),
                raw_decibel: level,
                frequency_weighted_decibel: level,
                fast_decibel: level,
                slow_decibel: level,
                calibrated_decibel: level,
                frequency_weighting: FrequencyWeighting::A,
                time_weighting: TimeWeighting::Fast,
                frequency_spectrum: [0.0; SPECTRUM_BANDS],
            })
            .collect()
    }

    #[test]
    fn leq_of_identical_values() {
        assert!((leq(&[72.5; 7]) - 72.5).abs() < 1e-9);
        assert!((leq(&[-20.0]) - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn leq_is_energy_weighted() {
        // 80 and 90 dB: energy mean is dominated by the louder value
        let value = leq(&[80.0, 90.0]);
        assert!((value - 87.4036).abs() < 1e-3, "got {value}");
    }

    #[test]
    fn leq_of_empty_is_zero() {
        assert_eq!(leq(&[]), 0.0);
    }

    #[test]
    fn percentile_nearest_rank() {
        let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&sorted, 50.0), 30.0);
        assert_eq!(percentile(&sorted, 90.0), 50.0);
        assert_eq!(percentile(&sorted, 10.0), 10.0);
        assert_eq!(percentile(&sorted, 0.0), 10.0);
        assert_eq!(percentile(&sorted, 100.0), 50.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn standard_deviation_uses_sample_denominator() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = standard_deviation(&values, mean(&values));
        assert!((sd - 2.138_089_935).abs() < 1e-6, "got {sd}");
        assert_eq!(standard_deviation(&[42.0], 42.0), 0.0);
    }

    #[test]
    fn bundle_uses_inverted_percentile_names() {
        let levels: Vec<f64> = (1..=10).map(|i| 50.0 + i as f64).collect();
        let stats = compute(&records(&levels), &RunningStatistics::default());

        assert_eq!(stats.count, 10);
        assert_eq!(stats.l10, 59.0);
        assert_eq!(stats.l50, 55.0);
        assert_eq!(stats.l90, 51.0);
        assert!((stats.avg - 55.5).abs() < 1e-9);
        assert!((stats.duration_seconds - 4.5).abs() < 1e-9);
    }

    #[test]
    fn bundle_extremes_come_from_running_statistics() {
        let mut running = RunningStatistics::default();
        running.update(40.0, 95.0);
        running.update(70.0, 75.0);

        let stats = compute(&records(&[60.0, 61.0]), &running);
        assert_eq!(stats.min, Some(40.0));
        assert_eq!(stats.max, Some(70.0));
        assert_eq!(stats.peak, Some(95.0));
        assert_eq!(stats.current, Some(70.0));
    }

    #[test]
    fn empty_bundle_is_defined() {
        let stats = compute(&[], &RunningStatistics::default());
        assert!(stats.is_empty());
        assert_eq!(stats.leq, 0.0);
        assert_eq!(stats.duration_seconds, 0.0);
        assert_eq!(stats.standard_deviation, 0.0);
        assert_eq!(stats.min, None);
    }
}
