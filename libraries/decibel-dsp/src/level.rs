//! Block level calculation
//!
//! Turns one block of PCM samples into a [`MeasurementRecord`]:
//!
//! 1. `rms = sqrt(mean(sample²))`
//! 2. `raw = 20·log10(rms / 20 µPa + ε)`, clamped to the reportable range
//! 3. `weighted = raw + scalar compensation of the frequency weighting`
//! 4. Fast, Slow and Impulse filters all see `weighted`
//! 5. `calibrated = active filter output + calibration offset`, clamped

use crate::{
    clamp_decibel, frequency::scalar_compensation_db, spectrum::PlaceholderSpectrum,
    time_weighting::TimeWeightingFilter, LOG_EPSILON, REFERENCE_PRESSURE,
};
use chrono::{DateTime, Utc};
use decibel_core::types::{FrequencyWeighting, MeasurementRecord, TimeWeighting};

/// Settings consulted for every block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelSettings {
    pub frequency_weighting: FrequencyWeighting,
    pub time_weighting: TimeWeighting,
    pub calibration_offset_db: f64,
}

impl LevelSettings {
    #[must_use]
    pub fn with_frequency_weighting(mut self, weighting: FrequencyWeighting) -> Self {
        self.frequency_weighting = weighting;
        self
    }

    #[must_use]
    pub fn with_time_weighting(mut self, weighting: TimeWeighting) -> Self {
        self.time_weighting = weighting;
        self
    }

    #[must_use]
    pub fn with_calibration_offset(mut self, offset_db: f64) -> Self {
        self.calibration_offset_db = offset_db;
        self
    }
}

/// Root mean square of a block; an empty block is silent
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_of_squares: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_of_squares / samples.len() as f64).sqrt()
}

/// Unclamped sound pressure level of an RMS amplitude
pub fn spl_decibel(rms: f64) -> f64 {
    20.0 * (rms / REFERENCE_PRESSURE + LOG_EPSILON).log10()
}

/// Stateful per-meter level calculator
///
/// Each meter owns one calculator so filter state is never shared between
/// meters.
#[derive(Debug, Clone, Default)]
pub struct LevelCalculator {
    filter: TimeWeightingFilter,
    spectrum: PlaceholderSpectrum,
}

impl LevelCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator with a reproducible placeholder spectrum
    pub fn with_spectrum_seed(seed: u64) -> Self {
        Self {
            filter: TimeWeightingFilter::new(),
            spectrum: PlaceholderSpectrum::with_seed(seed),
        }
    }

    /// Process one block captured at `timestamp`
    pub fn process(
        &mut self,
        samples: &[f32],
        settings: &LevelSettings,
        timestamp: DateTime<Utc>,
    ) -> MeasurementRecord {
        let raw_decibel = clamp_decibel(spl_decibel(rms(samples)));
        let frequency_weighted_decibel =
            raw_decibel + scalar_compensation_db(settings.frequency_weighting);

        let fast_decibel = self
            .filter
            .apply_fast_weighting(frequency_weighted_decibel, timestamp);
        let slow_decibel = self
            .filter
            .apply_slow_weighting(frequency_weighted_decibel, timestamp);
        let impulse_decibel = self
            .filter
            .apply_impulse_weighting(frequency_weighted_decibel, timestamp);

        let time_weighted = match settings.time_weighting {
            TimeWeighting::Fast => fast_decibel,
            TimeWeighting::Slow => slow_decibel,
            TimeWeighting::Impulse => impulse_decibel,
        };
        let calibrated_decibel = clamp_decibel(time_weighted + settings.calibration_offset_db);

        MeasurementRecord {
            timestamp,
            raw_decibel,
            frequency_weighted_decibel,
            fast_decibel,
            slow_decibel,
            calibrated_decibel,
            frequency_weighting: settings.frequency_weighting,
            time_weighting: settings.time_weighting,
            frequency_spectrum: self.spectrum.magnitudes(),
        }
    }

    /// Regenerate the placeholder spectrum on the next block
    pub fn invalidate_spectrum_cache(&mut self) {
        self.spectrum.invalidate();
    }

    /// Clear filter history and the spectrum cache
    pub fn reset(&mut self) {
        self.filter.reset();
        self.spectrum.invalidate();
    }

    pub fn filter(&self) -> &TimeWeightingFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_DECIBEL_LIMIT, MIN_DECIBEL_LIMIT};
    use chrono::{Duration, TimeZone};

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    /// Constant block with an RMS of `amplitude`
    fn block(amplitude: f32) -> Vec<f32> {
        vec![amplitude; 2048]
    }

    #[test]
    fn rms_of_constant_block() {
        assert!((rms(&block(0.5)) - 0.5).abs() < 1e-7);
        assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-12);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn spl_of_reference_multiples() {
        // 0.02 / 20 µPa = 1000 -> 60 dB
        assert!((spl_decibel(0.02) - 60.0).abs() < 1e-6);
        assert!((spl_decibel(0.0) - (-200.0)).abs() < 1e-9);
    }

    #[test]
    fn silence_clamps_to_floor() {
        let mut calculator = LevelCalculator::new();
        let record = calculator.process(&block(0.0), &LevelSettings::default(), t(0));
        assert_eq!(record.raw_decibel, MIN_DECIBEL_LIMIT);
        assert_eq!(record.calibrated_decibel, MIN_DECIBEL_LIMIT);
    }

    #[test]
    fn weighting_and_offset_are_applied() {
        let mut calculator = LevelCalculator::new();
        let settings = LevelSettings::default()
            .with_frequency_weighting(FrequencyWeighting::A)
            .with_calibration_offset(5.0);

        let record = calculator.process(&block(0.02), &settings, t(0));
        assert!((record.raw_decibel - 60.0).abs() < 1e-4);
        assert!((record.frequency_weighted_decibel - 58.0).abs() < 1e-4);
        assert!((record.calibrated_decibel - 63.0).abs() < 1e-4);
        assert_eq!(record.frequency_weighting, FrequencyWeighting::A);
    }

    #[test]
    fn calibrated_value_clamps_to_ceiling() {
        let mut calculator = LevelCalculator::new();
        let settings = LevelSettings::default().with_calibration_offset(80.0);
        let record = calculator.process(&block(1.0), &settings, t(0));
        assert_eq!(record.calibrated_decibel, MAX_DECIBEL_LIMIT);
    }

    #[test]
    fn fast_and_slow_tracked_regardless_of_active() {
        let mut calculator = LevelCalculator::new();
        let settings = LevelSettings::default().with_time_weighting(TimeWeighting::Impulse);

        calculator.process(&block(0.002), &settings, t(0));
        let record = calculator.process(&block(0.2), &settings, t(46));

        assert!(record.fast_decibel > record.slow_decibel);
        assert_eq!(
            calculator.filter().previous_value(TimeWeighting::Fast),
            Some(record.fast_decibel)
        );
        assert_eq!(
            calculator.filter().previous_value(TimeWeighting::Impulse),
            Some(record.calibrated_decibel)
        );
    }

    #[test]
    fn switching_weighting_continues_from_tracked_state() {
        let mut calculator = LevelCalculator::new();
        let fast = LevelSettings::default();
        let slow = fast.with_time_weighting(TimeWeighting::Slow);

        calculator.process(&block(0.002), &fast, t(0));
        let before = calculator.process(&block(0.2), &fast, t(46));
        let after = calculator.process(&block(0.2), &slow, t(92));

        // Slow has been tracking all along, so it is still well below the step
        assert!(after.calibrated_decibel < before.fast_decibel);
        assert_eq!(after.calibrated_decibel, after.slow_decibel);
        assert_eq!(after.time_weighting, TimeWeighting::Slow);
    }

    #[test]
    fn spectrum_is_stable_until_invalidated() {
        let mut calculator = LevelCalculator::with_spectrum_seed(3);
        let settings = LevelSettings::default();
        let first = calculator.process(&block(0.1), &settings, t(0));
        let second = calculator.process(&block(0.3), &settings, t(46));
        assert_eq!(first.frequency_spectrum, second.frequency_spectrum);

        calculator.invalidate_spectrum_cache();
        let third = calculator.process(&block(0.3), &settings, t(92));
        assert_ne!(first.frequency_spectrum, third.frequency_spectrum);
    }
}
