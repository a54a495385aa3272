/// Frequency and time weighting selections
use crate::error::MeterError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Frequency weighting curve (IEC 61672-1, ITU-R BS.468-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrequencyWeighting {
    /// A-weighting, approximates the 40-phon equal-loudness contour
    #[default]
    #[serde(rename = "A")]
    A,
    /// B-weighting, approximates the 70-phon contour
    #[serde(rename = "B")]
    B,
    /// C-weighting, nearly flat, used for peak and high-level measurement
    #[serde(rename = "C")]
    C,
    /// Z-weighting (zero), flat response
    #[serde(rename = "Z")]
    Z,
    /// ITU-R 468 noise weighting
    #[serde(rename = "ITU-R 468")]
    ItuR468,
}

impl FrequencyWeighting {
    /// All supported curves, in display order
    pub fn all() -> [Self; 5] {
        [Self::A, Self::B, Self::C, Self::Z, Self::ItuR468]
    }

    /// Short name, identical to the JSON representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::Z => "Z",
            Self::ItuR468 => "ITU-R 468",
        }
    }

    /// Human readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::A => "A-weighting (IEC 61672-1), environmental and occupational noise",
            Self::B => "B-weighting (IEC 61672-1), medium-level sounds",
            Self::C => "C-weighting (IEC 61672-1), high-level and peak measurement",
            Self::Z => "Z-weighting (IEC 61672-1), unweighted",
            Self::ItuR468 => "ITU-R 468 noise weighting, broadcast noise measurement",
        }
    }
}

impl FromStr for FrequencyWeighting {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "dba" => Ok(Self::A),
            "b" | "dbb" => Ok(Self::B),
            "c" | "dbc" => Ok(Self::C),
            "z" | "dbz" | "flat" => Ok(Self::Z),
            "itu-r 468" | "itu-r468" | "itu" | "468" => Ok(Self::ItuR468),
            _ => Err(MeterError::UnknownFrequencyWeighting(s.to_string())),
        }
    }
}

impl std::fmt::Display for FrequencyWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Meter ballistics (IEC 61672-1 time weighting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWeighting {
    /// 125 ms exponential response
    #[default]
    Fast,
    /// 1 s exponential response
    Slow,
    /// 35 ms attack, 1.5 s release
    Impulse,
}

impl TimeWeighting {
    pub fn all() -> [Self; 3] {
        [Self::Fast, Self::Slow, Self::Impulse]
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Slow => "slow",
            Self::Impulse => "impulse",
        }
    }

    /// Time constant for a rising level, in seconds
    #[must_use]
    pub fn time_constant_secs(&self) -> f64 {
        match self {
            Self::Fast => 0.125,
            Self::Slow => 1.0,
            Self::Impulse => 0.035,
        }
    }

    /// Time constant for a falling level, in seconds
    ///
    /// Only Impulse is asymmetric.
    #[must_use]
    pub fn release_time_constant_secs(&self) -> f64 {
        match self {
            Self::Impulse => 1.5,
            other => other.time_constant_secs(),
        }
    }
}

impl FromStr for TimeWeighting {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "f" => Ok(Self::Fast),
            "slow" | "s" => Ok(Self::Slow),
            "impulse" | "i" => Ok(Self::Impulse),
            _ => Err(MeterError::UnknownTimeWeighting(s.to_string())),
        }
    }
}

impl std::fmt::Display for TimeWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
