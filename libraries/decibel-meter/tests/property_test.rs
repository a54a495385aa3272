//! Property-based tests for statistics, dose and session accounting
//!
//! Uses proptest to verify invariants across many random inputs.

use chrono::{Duration, TimeZone, Utc};
use decibel_core::types::{MeterKind, NoiseStandard};
use decibel_meter::dose;
use decibel_meter::statistics::{leq, percentile, sorted};
use decibel_meter::{
    LevelDurationAccumulator, ManualClock, MeasurementHistory, MeasurementSession, MeterConfig,
};
use proptest::prelude::*;
use std::sync::Arc;

// ===== Helpers =====

fn arbitrary_standard() -> impl Strategy<Value = NoiseStandard> {
    prop::sample::select(NoiseStandard::all().to_vec())
}

fn arbitrary_level() -> impl Strategy<Value = f64> {
    -20.0f64..140.0
}

// ===== Property Tests =====

proptest! {
    /// Property: LEQ of identical values is that value
    #[test]
    fn leq_of_identical_values_is_the_value(level in arbitrary_level(), count in 1usize..200) {
        let values = vec![level; count];
        prop_assert!((leq(&values) - level).abs() < 1e-9);
    }

    /// Property: LEQ lies between min and max
    #[test]
    fn leq_is_bounded_by_extremes(values in prop::collection::vec(arbitrary_level(), 1..100)) {
        let value = leq(&values);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(value >= min - 1e-9 && value <= max + 1e-9);
    }

    /// Property: the 50th percentile of an odd-length list is the middle element
    #[test]
    fn median_of_odd_length_is_middle(
        values in prop::collection::vec(arbitrary_level(), 0..50)
            .prop_map(|mut v| { if v.len() % 2 == 0 { v.push(60.0); } v })
    ) {
        let sorted_values = sorted(&values);
        let middle = sorted_values[sorted_values.len() / 2];
        prop_assert_eq!(percentile(&sorted_values, 50.0), middle);
    }

    /// Property: percentiles are monotonic in p
    #[test]
    fn percentiles_are_ordered(values in prop::collection::vec(arbitrary_level(), 1..100)) {
        let sorted_values = sorted(&values);
        let l90 = percentile(&sorted_values, 10.0);
        let l50 = percentile(&sorted_values, 50.0);
        let l10 = percentile(&sorted_values, 90.0);
        prop_assert!(l90 <= l50 && l50 <= l10);
    }

    /// Property: raising TWA by one exchange rate doubles the dose
    #[test]
    fn dose_doubles_per_exchange_rate(standard in arbitrary_standard(), twa in 40.0f64..120.0) {
        let profile = standard.profile();
        let base = dose::dose(twa, &profile);
        let louder = dose::dose(twa + profile.exchange_rate_db, &profile);
        prop_assert!((louder / base - 2.0).abs() < 1e-9);
    }

    /// Property: TWA equals LEQ within a shift and exceeds it beyond
    #[test]
    fn twa_normalization(level in arbitrary_level(), hours in 0.0f64..24.0) {
        let twa = dose::twa(level, hours);
        if hours <= 8.0 {
            prop_assert_eq!(twa, level);
        } else {
            prop_assert!(twa > level);
        }
    }

    /// Property: the exposure table classifies every bucket at or above the criterion once
    #[test]
    fn exposure_table_classifies_each_bucket_once(
        standard in arbitrary_standard(),
        entries in prop::collection::vec((60.0f64..135.0, 0.1f64..600.0), 1..40)
    ) {
        let profile = standard.profile();
        let mut accumulator = LevelDurationAccumulator::new();
        for (level, seconds) in &entries {
            accumulator.add(*level, *seconds);
        }

        let eligible: f64 = accumulator
            .iter()
            .filter(|(bucket, _)| f64::from(*bucket) >= profile.criterion_level_db)
            .map(|(_, seconds)| seconds)
            .sum();
        let table = dose::permissible_exposure_table(&profile, &accumulator);
        let classified: f64 = table.durations.iter().map(|r| r.accumulated_duration_seconds).sum();

        prop_assert!((classified - eligible).abs() < 1e-6);
        prop_assert!(table.total_dose >= 0.0);
    }

    /// Property: a full history drops to half capacity plus one on the next append
    #[test]
    fn history_never_exceeds_capacity(half in 1usize..100, extra in 1usize..300) {
        let capacity = half * 2;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut history = MeasurementHistory::new(capacity);
        let record = |i: usize| decibel_core::types::MeasurementRecord {
            timestamp: start + Duration::milliseconds(i as i64),
            raw_decibel: 50.0,
            frequency_weighted_decibel: 50.0,
            fast_decibel: 50.0,
            slow_decibel: 50.0,
            calibrated_decibel: 50.0,
            frequency_weighting: Default::default(),
            time_weighting: Default::default(),
            frequency_spectrum: [0.0; decibel_core::types::SPECTRUM_BANDS],
        };

        for i in 0..capacity {
            history.append(record(i));
        }
        prop_assert_eq!(history.len(), capacity);
        history.append(record(capacity));
        prop_assert_eq!(history.len(), half + 1);

        for i in 0..extra {
            history.append(record(capacity + 1 + i));
            prop_assert!(history.len() <= capacity);
        }
    }

    /// Property: accumulated exposure equals processed blocks times block duration
    #[test]
    fn accumulated_exposure_matches_blocks(
        amplitudes in prop::collection::vec(0.0f32..1.0, 1..60),
        block_size in 64usize..4096
    ) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let config = MeterConfig { history_capacity: 16, ..MeterConfig::default() };
        let session = MeasurementSession::new(config).unwrap().with_clock(clock.clone());
        session.start().unwrap();

        for amplitude in &amplitudes {
            session.process_block(&vec![*amplitude; block_size]);
            clock.advance(Duration::milliseconds(20));
        }

        let expected = amplitudes.len() as f64 * block_size as f64 / 44_100.0;
        prop_assert!((session.level_durations().total_seconds() - expected).abs() < 1e-9);
        prop_assert!(session.history(MeterKind::Dosimeter).len() <= 16);
    }

    /// Property: running extremes bracket every recorded level
    #[test]
    fn running_extremes_bracket_history(amplitudes in prop::collection::vec(0.0f32..1.0, 1..40)) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let session = MeasurementSession::new(MeterConfig::default()).unwrap().with_clock(clock.clone());
        session.start().unwrap();

        for amplitude in &amplitudes {
            session.process_block(&vec![*amplitude; 1024]);
            clock.advance(Duration::milliseconds(23));
        }

        let reading = session.reading(MeterKind::Primary);
        let (min, max) = (reading.min.unwrap(), reading.max.unwrap());
        for record in session.history(MeterKind::Primary) {
            prop_assert!(record.calibrated_decibel >= min && record.calibrated_decibel <= max);
            prop_assert!((-20.0..=140.0).contains(&record.calibrated_decibel));
        }
        prop_assert!(reading.peak.unwrap() >= -20.0);
    }
}
