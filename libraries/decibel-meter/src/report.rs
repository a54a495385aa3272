//! Measurement report for export collaborators

use crate::accumulator::LevelDurationAccumulator;
use crate::config::SessionSettings;
use chrono::{DateTime, Utc};
use decibel_core::types::{
    DecibelStatistics, MeasurementState, NoiseDoseData, PermissibleExposureTable,
};
use decibel_core::Result;
use serde::{Deserialize, Serialize};

/// Everything an export or report consumer needs, as one JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReport {
    pub generated_at: DateTime<Utc>,
    pub state: MeasurementState,
    pub started_at: Option<DateTime<Utc>>,
    pub measurement_duration_seconds: f64,
    pub settings: SessionSettings,
    pub primary: DecibelStatistics,
    pub dosimeter: DecibelStatistics,
    pub noise_dose: NoiseDoseData,
    pub exposure_table: PermissibleExposureTable,
    pub level_durations: LevelDurationAccumulator,
}

impl MeasurementReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
