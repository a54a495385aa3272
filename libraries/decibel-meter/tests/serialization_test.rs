//! JSON export of statistics, dose and exposure bundles
//!
//! Export collaborators receive these as JSON and must read back exactly
//! what the session computed.

use chrono::{Duration, TimeZone, Utc};
use decibel_core::types::{
    DecibelStatistics, MeterKind, NoiseDoseData, NoiseStandard, PermissibleExposureTable,
};
use decibel_meter::{LevelDurationAccumulator, ManualClock, MeasurementSession, MeterConfig};
use std::sync::Arc;

// ===== Test Helpers =====

/// Session with a few minutes of varied, calibrated input
fn measured_session(standard: NoiseStandard) -> MeasurementSession {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 12, 14, 30, 0).unwrap(),
    ));
    let session = MeasurementSession::new(MeterConfig::default())
        .unwrap()
        .with_clock(clock.clone())
        .with_spectrum_seed(42);
    session.set_noise_standard(standard);
    session.set_calibration_offset_db(28.0).unwrap();
    session.start().unwrap();

    for i in 0..300 {
        let amplitude = 0.02 + 0.03 * ((i % 17) as f32 / 17.0);
        session.process_block(&vec![amplitude; 2048]);
        clock.advance(Duration::microseconds(46_440));
    }
    session
}

// ===== Round Trips =====

#[test]
fn statistics_round_trip() {
    let session = measured_session(NoiseStandard::Niosh);

    for meter in [MeterKind::Primary, MeterKind::Dosimeter] {
        let stats = session.statistics(meter);
        let json = serde_json::to_string(&stats).unwrap();
        let restored: DecibelStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, stats);
    }
}

#[test]
fn empty_statistics_round_trip() {
    let session = MeasurementSession::new(MeterConfig::default()).unwrap();
    let stats = session.statistics(MeterKind::Primary);

    let json = serde_json::to_string(&stats).unwrap();
    assert!(json.contains("\"min\":null"));
    let restored: DecibelStatistics = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, stats);
}

#[test]
fn dose_round_trip_for_every_standard() {
    for standard in NoiseStandard::all() {
        let dose = measured_session(standard).noise_dose();
        let json = serde_json::to_string(&dose).unwrap();
        let restored: NoiseDoseData = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, dose);
        assert_eq!(restored.standard, standard);
    }
}

#[test]
fn exposure_table_round_trip() {
    let table = measured_session(NoiseStandard::Osha).permissible_exposure_table();
    let json = serde_json::to_string_pretty(&table).unwrap();
    let restored: PermissibleExposureTable = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, table);
}

#[test]
fn level_durations_serialize_as_level_map() {
    let mut accumulator = LevelDurationAccumulator::new();
    accumulator.add(85.4, 2.0);
    accumulator.add(84.6, 1.5);
    accumulator.add(90.0, 0.25);

    let json = serde_json::to_string(&accumulator).unwrap();
    assert_eq!(json, r#"{"85":3.5,"90":0.25}"#);

    let restored: LevelDurationAccumulator = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, accumulator);
}

#[test]
fn dose_json_uses_snake_case_fields() {
    let dose = measured_session(NoiseStandard::Gbz).noise_dose();
    let value = serde_json::to_value(&dose).unwrap();

    assert_eq!(value["standard"], "gbz");
    assert!(value["dose_percentage"].is_number());
    assert!(value.get("predicted_time_to_full_dose").is_some());
    assert!(value["risk_level"].is_string());
}
