/// Meter configuration loading
use crate::error::Result;
use decibel_core::types::{FrequencyWeighting, NoiseStandard, TimeWeighting};
use decibel_meter::MeterConfig;
use std::path::Path;

/// Values given on the command line, applied after file and environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub block_size: Option<usize>,
    pub frequency_weighting: Option<FrequencyWeighting>,
    pub time_weighting: Option<TimeWeighting>,
    pub calibration_offset_db: Option<f64>,
    pub noise_standard: Option<NoiseStandard>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut MeterConfig) {
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(weighting) = self.frequency_weighting {
            config.frequency_weighting = weighting;
        }
        if let Some(weighting) = self.time_weighting {
            config.time_weighting = weighting;
        }
        if let Some(offset) = self.calibration_offset_db {
            config.calibration_offset_db = offset;
        }
        if let Some(standard) = self.noise_standard {
            config.noise_standard = standard;
        }
    }
}

/// Load configuration from an optional TOML file and the environment
///
/// Precedence, lowest first: defaults, `path`, `DECIBEL_*` environment
/// variables (e.g. `DECIBEL_HISTORY_CAPACITY=1000`), `overrides`.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<MeterConfig> {
    let mut settings = config::Config::builder();

    if let Some(path) = path {
        settings = settings.add_source(config::File::from(path).required(true));
    }

    // Override with environment variables (prefixed with DECIBEL_)
    settings = settings.add_source(config::Environment::with_prefix("DECIBEL").try_parsing(true));

    let mut config: MeterConfig = settings.build()?.try_deserialize()?;
    overrides.apply(&mut config);
    config.validate()?;

    tracing::debug!("Loaded meter configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_values_are_loaded() {
        let file = write_config(
            r#"
            sample_rate = 48000
            block_size = 1024
            frequency_weighting = "C"
            time_weighting = "slow"
            calibration_offset_db = -3.5
            noise_standard = "osha"
            "#,
        );

        let config = load_config(Some(file.path()), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.block_size, 1024);
        assert_eq!(config.frequency_weighting, FrequencyWeighting::C);
        assert_eq!(config.time_weighting, TimeWeighting::Slow);
        assert_eq!(config.calibration_offset_db, -3.5);
        assert_eq!(config.noise_standard, NoiseStandard::Osha);
        // Not in the file
        assert_eq!(config.history_capacity, 500);
    }

    #[test]
    fn overrides_win_over_file() {
        let file = write_config("noise_standard = \"osha\"\nblock_size = 1024\n");
        let overrides = ConfigOverrides {
            noise_standard: Some(NoiseStandard::Eu),
            calibration_offset_db: Some(12.0),
            ..ConfigOverrides::default()
        };

        let config = load_config(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.noise_standard, NoiseStandard::Eu);
        assert_eq!(config.calibration_offset_db, 12.0);
        assert_eq!(config.block_size, 1024);
    }

    #[test]
    fn invalid_file_values_are_rejected() {
        let file = write_config("history_capacity = 1\n");
        assert!(load_config(Some(file.path()), &ConfigOverrides::default()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = Path::new("/nonexistent/decibel.toml");
        assert!(load_config(Some(path), &ConfigOverrides::default()).is_err());
    }
}
