/// Occupational noise exposure standards
use crate::error::MeterError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Criterion level shared by every supported standard (100% dose reference)
pub const CRITERION_LEVEL_DB: f64 = 85.0;

/// Peak limit shared by every supported standard
pub const PEAK_LIMIT_DB: f64 = 140.0;

/// Supported noise exposure standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseStandard {
    /// US OSHA 29 CFR 1910.95 (5 dB exchange rate)
    Osha,
    /// US NIOSH REL (3 dB exchange rate)
    #[default]
    Niosh,
    /// China GBZ 2.2 (3 dB exchange rate)
    Gbz,
    /// EU Directive 2003/10/EC (3 dB exchange rate)
    Eu,
}

/// Immutable limits of a noise standard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseStandardProfile {
    pub standard: NoiseStandard,
    /// Permissible 8-hour TWA
    pub twa_limit_db: f64,
    /// Level increase that halves the permissible duration
    pub exchange_rate_db: f64,
    /// Level producing 100% dose over 8 hours
    pub criterion_level_db: f64,
    /// Level at which a hearing conservation program is required
    pub action_level_db: f64,
    /// Instantaneous peak ceiling
    pub peak_limit_db: f64,
}

impl NoiseStandard {
    pub fn all() -> [Self; 4] {
        [Self::Osha, Self::Niosh, Self::Gbz, Self::Eu]
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Osha => "osha",
            Self::Niosh => "niosh",
            Self::Gbz => "gbz",
            Self::Eu => "eu",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Osha => "OSHA 29 CFR 1910.95",
            Self::Niosh => "NIOSH Recommended Exposure Limit",
            Self::Gbz => "GBZ 2.2-2007",
            Self::Eu => "EU Directive 2003/10/EC",
        }
    }

    /// Limits of this standard
    #[must_use]
    pub fn profile(&self) -> NoiseStandardProfile {
        let (twa_limit_db, exchange_rate_db, action_level_db) = match self {
            Self::Osha => (90.0, 5.0, 85.0),
            Self::Niosh => (85.0, 3.0, 85.0),
            Self::Gbz => (85.0, 3.0, 80.0),
            Self::Eu => (87.0, 3.0, 80.0),
        };

        NoiseStandardProfile {
            standard: *self,
            twa_limit_db,
            exchange_rate_db,
            criterion_level_db: CRITERION_LEVEL_DB,
            action_level_db,
            peak_limit_db: PEAK_LIMIT_DB,
        }
    }
}

impl FromStr for NoiseStandard {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "osha" => Ok(Self::Osha),
            "niosh" => Ok(Self::Niosh),
            "gbz" => Ok(Self::Gbz),
            "eu" => Ok(Self::Eu),
            _ => Err(MeterError::UnknownNoiseStandard(s.to_string())),
        }
    }
}

impl std::fmt::Display for NoiseStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for NoiseStandardProfile {
    fn default() -> Self {
        NoiseStandard::default().profile()
    }
}
