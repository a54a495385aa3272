//! Noise dose engine
//!
//! # Formulas
//!
//! - TWA = LEQ for up to 8 hours, otherwise `LEQ + 10·log10(hours / 8)`
//! - Dose = `100 · 2^((TWA − criterion) / exchange rate)` percent
//! - Dose rate = dose / hours (0 when no time has elapsed)
//! - Time to full dose = `(100 − dose) / rate` hours, none when already at
//!   100% or when the rate is not positive
//!
//! # Permissible exposure table
//!
//! Rows start at the criterion level and step by the exchange rate up to
//! [`EXPOSURE_TABLE_CEILING_DB`]. Each accumulator bucket is classified into
//! exactly one row, the highest row level not above the bucket. Buckets
//! below the first row are left out. The table's `total_dose` is its own
//! metric and is not expected to equal the TWA-based dose.

use crate::accumulator::LevelDurationAccumulator;
use decibel_core::types::{
    NoiseDoseData, NoiseStandardProfile, PermissibleExposureDuration, PermissibleExposureTable,
    RiskLevel,
};

/// Highest level listed in the permissible exposure table
pub const EXPOSURE_TABLE_CEILING_DB: f64 = 115.0;

/// Reference shift length
pub const REFERENCE_DURATION_HOURS: f64 = 8.0;

/// 8-hour normalized time-weighted average
pub fn twa(leq: f64, duration_hours: f64) -> f64 {
    if duration_hours <= REFERENCE_DURATION_HOURS {
        leq
    } else {
        leq + 10.0 * (duration_hours / REFERENCE_DURATION_HOURS).log10()
    }
}

/// Dose percentage of a TWA under `profile`
pub fn dose(twa: f64, profile: &NoiseStandardProfile) -> f64 {
    100.0 * 2.0_f64.powf((twa - profile.criterion_level_db) / profile.exchange_rate_db)
}

/// Dose percent per hour
pub fn dose_rate(dose: f64, duration_hours: f64) -> f64 {
    if duration_hours <= 0.0 {
        return 0.0;
    }
    dose / duration_hours
}

/// Hours until 100% dose at `dose_rate`
pub fn predicted_time_to_full_dose(dose: f64, dose_rate: f64) -> Option<f64> {
    if dose_rate <= 0.0 || dose >= 100.0 {
        return None;
    }
    Some((100.0 - dose) / dose_rate)
}

/// Remaining allowed exposure time in hours
///
/// Defined identically to [`predicted_time_to_full_dose`]; both are
/// reported as separate fields.
pub fn remaining_allowed_time(dose: f64, dose_rate: f64) -> Option<f64> {
    predicted_time_to_full_dose(dose, dose_rate)
}

pub fn risk_level(dose: f64) -> RiskLevel {
    RiskLevel::from_dose(dose)
}

/// Full dose bundle
///
/// `peak` is the all-time dosimeter peak, if any block has been processed.
pub fn noise_dose_data(
    leq: f64,
    duration_hours: f64,
    peak: Option<f64>,
    profile: &NoiseStandardProfile,
) -> NoiseDoseData {
    let twa = twa(leq, duration_hours);
    let dose_percentage = dose(twa, profile);
    let dose_rate = dose_rate(dose_percentage, duration_hours);

    NoiseDoseData {
        standard: profile.standard,
        leq,
        duration_hours,
        twa,
        dose_percentage,
        dose_rate,
        predicted_time_to_full_dose: predicted_time_to_full_dose(dose_percentage, dose_rate),
        remaining_allowed_time: remaining_allowed_time(dose_percentage, dose_rate),
        risk_level: risk_level(dose_percentage),
        exceeds_action_level: twa >= profile.action_level_db,
        exceeds_twa_limit: twa > profile.twa_limit_db,
        peak_exceeds_limit: peak.is_some_and(|p| p >= profile.peak_limit_db),
    }
}

/// Row levels of the permissible exposure table
pub fn exposure_levels(profile: &NoiseStandardProfile) -> Vec<f64> {
    if profile.exchange_rate_db <= 0.0 {
        return vec![profile.criterion_level_db];
    }
    (0_u32..)
        .map(|step| profile.criterion_level_db + f64::from(step) * profile.exchange_rate_db)
        .take_while(|level| *level <= EXPOSURE_TABLE_CEILING_DB + 1e-9)
        .collect()
}

/// Permissible daily exposure at `level_db`, in seconds
pub fn allowed_duration_seconds(level_db: f64, profile: &NoiseStandardProfile) -> f64 {
    REFERENCE_DURATION_HOURS
        * 2.0_f64.powf((profile.criterion_level_db - level_db) / profile.exchange_rate_db)
        * 3600.0
}

/// Index of the row a bucket belongs to, `None` below the first row
fn classify(bucket_db: f64, levels: &[f64]) -> Option<usize> {
    levels.iter().rposition(|level| *level <= bucket_db)
}

/// Permissible exposure table of `accumulator` under `profile`
pub fn permissible_exposure_table(
    profile: &NoiseStandardProfile,
    accumulator: &LevelDurationAccumulator,
) -> PermissibleExposureTable {
    let levels = exposure_levels(profile);
    let mut accumulated = vec![0.0; levels.len()];

    for (bucket, seconds) in accumulator.iter() {
        if let Some(row) = classify(f64::from(bucket), &levels) {
            accumulated[row] += seconds;
        }
    }

    let durations: Vec<PermissibleExposureDuration> = levels
        .iter()
        .zip(accumulated)
        .map(|(&sound_level, accumulated_duration_seconds)| {
            let allowed_duration_seconds = allowed_duration_seconds(sound_level, profile);
            PermissibleExposureDuration {
                sound_level,
                allowed_duration_seconds,
                accumulated_duration_seconds,
                current_level_dose: accumulated_duration_seconds / allowed_duration_seconds
                    * 100.0,
            }
        })
        .collect();

    let total_dose = durations.iter().map(|row| row.current_level_dose).sum();

    PermissibleExposureTable {
        standard: profile.standard,
        criterion_level_db: profile.criterion_level_db,
        exchange_rate_db: profile.exchange_rate_db,
        ceiling_level_db: EXPOSURE_TABLE_CEILING_DB,
        durations,
        total_dose,
    }
}
