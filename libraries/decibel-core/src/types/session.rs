/// Session state and published snapshots
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a measurement session
///
/// `Error` is terminal until the session is reset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MeasurementState {
    #[default]
    Idle,
    Measuring,
    Paused,
    Error { message: String },
}

impl MeasurementState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Measuring => "measuring",
            Self::Paused => "paused",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Measuring | Self::Paused)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl std::fmt::Display for MeasurementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error { message } => write!(f, "error ({})", message),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// The two independent meters of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterKind {
    /// User-selectable frequency weighting
    Primary,
    /// Fixed A-weighting, feeds the dose calculation
    Dosimeter,
}

impl MeterKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Dosimeter => "dosimeter",
        }
    }
}

impl std::fmt::Display for MeterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Live values of one meter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeterReading {
    pub current: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub peak: Option<f64>,
    pub leq: f64,
}

/// Snapshot published to subscribers after each processed block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    /// Monotonic block counter since the last reset
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub primary: MeterReading,
    pub dosimeter: MeterReading,
}

impl MeterSnapshot {
    pub fn reading(&self, meter: MeterKind) -> &MeterReading {
        match meter {
            MeterKind::Primary => &self.primary,
            MeterKind::Dosimeter => &self.dosimeter,
        }
    }
}
