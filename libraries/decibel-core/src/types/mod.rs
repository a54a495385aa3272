mod dose;
mod record;
mod session;
mod standard;
mod statistics;
mod weighting;

pub use dose::{NoiseDoseData, PermissibleExposureDuration, PermissibleExposureTable, RiskLevel};
pub use record::{MeasurementRecord, SPECTRUM_BANDS};
pub use session::{MeasurementState, MeterKind, MeterReading, MeterSnapshot};
pub use standard::{NoiseStandard, NoiseStandardProfile};
pub use statistics::DecibelStatistics;
pub use weighting::{FrequencyWeighting, TimeWeighting};
