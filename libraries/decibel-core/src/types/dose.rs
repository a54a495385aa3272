/// Noise dose bundles
use super::NoiseStandard;
use serde::{Deserialize, Serialize};

/// Hearing risk classification of a dose percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Below 50%
    Safe,
    /// 50% up to 100%
    Acceptable,
    /// 100% up to 200%
    Exceeding,
    /// 200% and above
    Dangerous,
}

impl RiskLevel {
    /// Classify a dose percentage
    ///
    /// Boundaries belong to the higher class: exactly 100% is `Exceeding`.
    #[must_use]
    pub fn from_dose(dose_percentage: f64) -> Self {
        if dose_percentage >= 200.0 {
            Self::Dangerous
        } else if dose_percentage >= 100.0 {
            Self::Exceeding
        } else if dose_percentage >= 50.0 {
            Self::Acceptable
        } else {
            Self::Safe
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Acceptable => "acceptable",
            Self::Exceeding => "exceeding",
            Self::Dangerous => "dangerous",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dose metrics derived from the dosimeter LEQ and elapsed duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseDoseData {
    pub standard: NoiseStandard,

    /// LEQ of the dosimeter history
    pub leq: f64,

    /// Elapsed measurement time in hours
    pub duration_hours: f64,

    /// 8-hour normalized time-weighted average
    pub twa: f64,

    /// Percent of the permissible daily exposure
    pub dose_percentage: f64,

    /// Percent per hour
    pub dose_rate: f64,

    /// Hours until 100% dose at the current rate
    pub predicted_time_to_full_dose: Option<f64>,

    /// Same value as `predicted_time_to_full_dose`, kept as a separate field
    pub remaining_allowed_time: Option<f64>,

    pub risk_level: RiskLevel,

    pub exceeds_action_level: bool,

    pub exceeds_twa_limit: bool,

    /// All-time dosimeter peak reached the standard's peak ceiling
    pub peak_exceeds_limit: bool,
}

/// One row of the permissible exposure duration table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissibleExposureDuration {
    /// Sound level of this row (dB)
    pub sound_level: f64,

    /// Permissible daily duration at this level
    pub allowed_duration_seconds: f64,

    /// Exposure time classified into this row
    pub accumulated_duration_seconds: f64,

    /// `accumulated / allowed * 100`
    pub current_level_dose: f64,
}

impl PermissibleExposureDuration {
    /// Row exceeds its own allowance
    pub fn is_exceeding(&self) -> bool {
        self.accumulated_duration_seconds > self.allowed_duration_seconds
    }
}

/// Permissible exposure duration table for a standard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissibleExposureTable {
    pub standard: NoiseStandard,
    pub criterion_level_db: f64,
    pub exchange_rate_db: f64,
    pub ceiling_level_db: f64,
    pub durations: Vec<PermissibleExposureDuration>,
    /// Sum of every row's `current_level_dose`
    pub total_dose: f64,
}

impl PermissibleExposureTable {
    /// Rows whose accumulated time exceeds the allowance
    pub fn exceeding_levels(&self) -> impl Iterator<Item = &PermissibleExposureDuration> {
        self.durations.iter().filter(|row| row.is_exceeding())
    }
}
