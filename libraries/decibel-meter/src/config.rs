/// Meter configuration
use decibel_core::types::{FrequencyWeighting, NoiseStandard, TimeWeighting};
use decibel_core::{MeterError, Result};
use serde::{Deserialize, Serialize};

/// Static configuration of a measurement session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MeterConfig {
    /// Capture sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Samples per delivered block (default: 2048)
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Records kept per meter before batch eviction (default: 500)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Initial weighting of the primary meter (default: A)
    #[serde(default)]
    pub frequency_weighting: FrequencyWeighting,

    /// Initial time weighting of both meters (default: Fast)
    #[serde(default)]
    pub time_weighting: TimeWeighting,

    /// Initial calibration offset in dB (default: 0.0)
    #[serde(default)]
    pub calibration_offset_db: f64,

    /// Initial noise standard (default: NIOSH)
    #[serde(default)]
    pub noise_standard: NoiseStandard,

    /// Minimum time between published snapshots, 0 publishes every block
    #[serde(default)]
    pub publish_interval_ms: u64,

    /// Buffered snapshots per subscriber (default: 64)
    #[serde(default = "default_snapshot_channel_capacity")]
    pub snapshot_channel_capacity: usize,
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_block_size() -> usize {
    2048
}

fn default_history_capacity() -> usize {
    crate::history::DEFAULT_HISTORY_CAPACITY
}

fn default_snapshot_channel_capacity() -> usize {
    64
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            block_size: default_block_size(),
            history_capacity: default_history_capacity(),
            frequency_weighting: FrequencyWeighting::default(),
            time_weighting: TimeWeighting::default(),
            calibration_offset_db: 0.0,
            noise_standard: NoiseStandard::default(),
            publish_interval_ms: 0,
            snapshot_channel_capacity: default_snapshot_channel_capacity(),
        }
    }
}

impl MeterConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(8000..=384_000).contains(&self.sample_rate) {
            return Err(MeterError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 {
            return Err(MeterError::InvalidConfig(
                "block_size must be greater than zero".to_string(),
            ));
        }
        if self.history_capacity < 2 {
            return Err(MeterError::InvalidConfig(format!(
                "history_capacity must be at least 2, got {}",
                self.history_capacity
            )));
        }
        if self.snapshot_channel_capacity == 0 {
            return Err(MeterError::InvalidConfig(
                "snapshot_channel_capacity must be greater than zero".to_string(),
            ));
        }
        if !self.calibration_offset_db.is_finite() {
            return Err(MeterError::InvalidConfig(
                "calibration_offset_db must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Duration of a nominal block in seconds
    pub fn block_duration_secs(&self) -> f64 {
        self.block_size as f64 / f64::from(self.sample_rate)
    }

    /// Settings a new session starts with
    pub fn initial_settings(&self) -> SessionSettings {
        SessionSettings {
            frequency_weighting: self.frequency_weighting,
            time_weighting: self.time_weighting,
            calibration_offset_db: self.calibration_offset_db,
            noise_standard: self.noise_standard,
        }
    }
}

/// Settings adjustable while measuring, effective on the next block
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Primary meter weighting; the dosimeter is always A-weighted
    pub frequency_weighting: FrequencyWeighting,
    pub time_weighting: TimeWeighting,
    pub calibration_offset_db: f64,
    pub noise_standard: NoiseStandard,
}
