//! Placeholder spectrum
//!
//! The meter does not run an FFT. Records still carry a fixed-length
//! magnitude array so chart consumers keep a stable shape. The magnitudes
//! are pseudo-random values in `[0, 1)`, generated once and reused until
//! the cache is invalidated. They do not describe the signal.

use decibel_core::types::SPECTRUM_BANDS;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::trace;

/// Cached, non-physical spectrum magnitudes
#[derive(Debug, Clone)]
pub struct PlaceholderSpectrum {
    rng: StdRng,
    cached: Option<[f64; SPECTRUM_BANDS]>,
}

impl PlaceholderSpectrum {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            cached: None,
        }
    }

    /// Deterministic magnitudes for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cached: None,
        }
    }

    /// Current magnitudes, generating them on first use
    pub fn magnitudes(&mut self) -> [f64; SPECTRUM_BANDS] {
        if let Some(cached) = self.cached {
            return cached;
        }

        let mut magnitudes = [0.0; SPECTRUM_BANDS];
        for magnitude in &mut magnitudes {
            *magnitude = self.rng.gen::<f64>();
        }
        trace!("Generated placeholder spectrum ({} bands)", SPECTRUM_BANDS);

        self.cached = Some(magnitudes);
        magnitudes
    }

    /// Force the next call to [`magnitudes`](Self::magnitudes) to regenerate
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

impl Default for PlaceholderSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitudes_are_cached() {
        let mut spectrum = PlaceholderSpectrum::with_seed(7);
        let first = spectrum.magnitudes();
        let second = spectrum.magnitudes();
        assert_eq!(first, second);
    }

    #[test]
    fn magnitudes_are_unit_range() {
        let mut spectrum = PlaceholderSpectrum::new();
        let magnitudes = spectrum.magnitudes();
        assert_eq!(magnitudes.len(), SPECTRUM_BANDS);
        assert!(magnitudes.iter().all(|m| (0.0..1.0).contains(m)));
    }

    #[test]
    fn invalidate_regenerates() {
        let mut spectrum = PlaceholderSpectrum::with_seed(7);
        let first = spectrum.magnitudes();
        spectrum.invalidate();
        let second = spectrum.magnitudes();
        assert_ne!(first, second);
    }
}
