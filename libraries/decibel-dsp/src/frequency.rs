//! Frequency weighting curves
//!
//! Analytic A, B and C curves from IEC 61672-1 (pole frequencies 20.6 Hz,
//! 107.7 Hz, 158.5 Hz, 737.9 Hz and 12194.2 Hz), flat Z-weighting and a
//! piecewise-constant approximation of ITU-R 468.
//!
//! # Broadband compensation
//!
//! The level pipeline does not decompose the signal into frequencies. It
//! applies [`scalar_compensation_db`], one fixed offset per curve, to the
//! broadband level. This is a simplification and not a physically accurate
//! weighting of the live signal.

use crate::LOG_EPSILON;
use decibel_core::types::FrequencyWeighting;

const F1: f64 = 20.6;
const F2: f64 = 107.7;
const F3: f64 = 737.9;
const F4: f64 = 12194.2;
const F5: f64 = 158.5;

/// Normalization offsets so each curve reads 0 dB at 1 kHz
const A1000_DB: f64 = 2.0;
const B1000_DB: f64 = 0.17;
const C1000_DB: f64 = 0.06;

/// ITU-R 468 band lower edges (Hz) and their offsets (dB)
///
/// A frequency takes the offset of the highest edge not above it; anything
/// below the first edge uses the first offset.
const ITU_R_468_BANDS: [(f64, f64); 11] = [
    (10.0, -40.0),
    (31.5, -29.9),
    (63.0, -23.9),
    (125.0, -17.9),
    (250.0, -11.8),
    (500.0, -5.8),
    (1000.0, 0.0),
    (2000.0, 5.6),
    (4000.0, 10.5),
    (8000.0, 11.4),
    (16000.0, -11.7),
];

#[inline]
fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

fn a_weight(f: f64) -> f64 {
    let f2 = f * f;
    let numerator = F4 * F4 * f2 * f2;
    let denominator = (f2 + F1 * F1)
        * ((f2 + F2 * F2) * (f2 + F3 * F3)).sqrt()
        * (f2 + F4 * F4);
    numerator / denominator * db_to_gain(A1000_DB)
}

fn b_weight(f: f64) -> f64 {
    let f2 = f * f;
    let numerator = F4 * F4 * f2 * f;
    let denominator = (f2 + F1 * F1) * (f2 + F5 * F5).sqrt() * (f2 + F4 * F4);
    numerator / denominator * db_to_gain(B1000_DB)
}

fn c_weight(f: f64) -> f64 {
    let f2 = f * f;
    let numerator = F4 * F4 * f2;
    let denominator = (f2 + F1 * F1) * (f2 + F4 * F4);
    numerator / denominator * db_to_gain(C1000_DB)
}

fn itu_r_468_db(f: f64) -> f64 {
    ITU_R_468_BANDS
        .iter()
        .rev()
        .find(|(edge, _)| f >= *edge)
        .map_or(ITU_R_468_BANDS[0].1, |(_, db)| *db)
}

/// Linear gain of `curve` at `frequency_hz`
///
/// Non-positive frequencies have zero gain on the analytic curves.
pub fn weight(curve: FrequencyWeighting, frequency_hz: f64) -> f64 {
    match curve {
        FrequencyWeighting::Z => 1.0,
        FrequencyWeighting::ItuR468 => db_to_gain(itu_r_468_db(frequency_hz)),
        _ if frequency_hz <= 0.0 || frequency_hz.is_nan() => 0.0,
        FrequencyWeighting::A => a_weight(frequency_hz),
        FrequencyWeighting::B => b_weight(frequency_hz),
        FrequencyWeighting::C => c_weight(frequency_hz),
    }
}

/// Gain of `curve` at `frequency_hz` in dB
pub fn weighting_db(curve: FrequencyWeighting, frequency_hz: f64) -> f64 {
    20.0 * (weight(curve, frequency_hz) + LOG_EPSILON).log10()
}

/// Fixed broadband compensation applied by the level pipeline
pub fn scalar_compensation_db(curve: FrequencyWeighting) -> f64 {
    match curve {
        FrequencyWeighting::A => -2.0,
        FrequencyWeighting::B => -1.0,
        FrequencyWeighting::C | FrequencyWeighting::Z => 0.0,
        FrequencyWeighting::ItuR468 => -1.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {:.3} dB, got {:.3} dB",
            expected,
            actual
        );
    }

    #[test]
    fn curves_are_normalized_at_1khz() {
        for curve in [
            FrequencyWeighting::A,
            FrequencyWeighting::B,
            FrequencyWeighting::C,
            FrequencyWeighting::Z,
            FrequencyWeighting::ItuR468,
        ] {
            assert_close(weighting_db(curve, 1000.0), 0.0, 0.1);
        }
    }

    #[test]
    fn a_weighting_matches_iec_table() {
        // IEC 61672-1 Table 3 nominal values
        assert_close(weighting_db(FrequencyWeighting::A, 100.0), -19.1, 0.2);
        assert_close(weighting_db(FrequencyWeighting::A, 31.5), -39.4, 0.2);
        assert_close(weighting_db(FrequencyWeighting::A, 4000.0), 1.0, 0.2);
        assert_close(weighting_db(FrequencyWeighting::A, 10000.0), -2.5, 0.2);
    }

    #[test]
    fn c_weighting_matches_iec_table() {
        assert_close(weighting_db(FrequencyWeighting::C, 31.5), -3.0, 0.2);
        assert_close(weighting_db(FrequencyWeighting::C, 8000.0), -3.0, 0.2);
    }

    #[test]
    fn b_weighting_sits_between_a_and_c() {
        let a = weighting_db(FrequencyWeighting::A, 63.0);
        let b = weighting_db(FrequencyWeighting::B, 63.0);
        let c = weighting_db(FrequencyWeighting::C, 63.0);
        assert!(a < b && b < c, "A={a:.1} B={b:.1} C={c:.1}");
    }

    #[test]
    fn z_weighting_is_flat() {
        for f in [1.0, 20.0, 1000.0, 20000.0] {
            assert_eq!(weight(FrequencyWeighting::Z, f), 1.0);
        }
    }

    #[test]
    fn itu_table_is_piecewise_constant() {
        assert_close(weighting_db(FrequencyWeighting::ItuR468, 5.0), -40.0, 1e-6);
        assert_close(weighting_db(FrequencyWeighting::ItuR468, 63.0), -23.9, 1e-6);
        assert_close(weighting_db(FrequencyWeighting::ItuR468, 100.0), -23.9, 1e-6);
        assert_close(weighting_db(FrequencyWeighting::ItuR468, 6300.0), 10.5, 1e-6);
        assert_close(weighting_db(FrequencyWeighting::ItuR468, 20000.0), -11.7, 1e-6);
    }

    #[test]
    fn zero_frequency_stays_finite() {
        let db = weighting_db(FrequencyWeighting::A, 0.0);
        assert!(db.is_finite());
        assert_close(db, -200.0, 1e-6);
    }

    #[test]
    fn scalar_compensation_values() {
        assert_eq!(scalar_compensation_db(FrequencyWeighting::A), -2.0);
        assert_eq!(scalar_compensation_db(FrequencyWeighting::B), -1.0);
        assert_eq!(scalar_compensation_db(FrequencyWeighting::C), 0.0);
        assert_eq!(scalar_compensation_db(FrequencyWeighting::Z), 0.0);
        assert_eq!(scalar_compensation_db(FrequencyWeighting::ItuR468), -1.5);
    }
}
