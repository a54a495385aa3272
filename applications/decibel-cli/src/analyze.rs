/// Offline replay of a recording through a measurement session
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use decibel_meter::{ManualClock, MeasurementReport, MeasurementSession, MeterConfig};
use std::sync::Arc;
use tracing::{debug, info};

/// Timestamp of the sample at `position`, relative to `start`
fn sample_time(start: DateTime<Utc>, position: usize, sample_rate: u32) -> DateTime<Utc> {
    let micros = position as u128 * 1_000_000 / u128::from(sample_rate);
    start + Duration::microseconds(i64::try_from(micros).unwrap_or(i64::MAX))
}

/// Feed `samples` block by block and return the final report
///
/// Block timestamps come from sample positions, so the measured duration is
/// the recording length regardless of how fast the replay runs. The last
/// block may be shorter than `config.block_size`.
pub fn analyze_samples(
    samples: &[f32],
    config: MeterConfig,
    start: DateTime<Utc>,
) -> Result<MeasurementReport> {
    let sample_rate = config.sample_rate;
    let block_size = config.block_size;

    let clock = Arc::new(ManualClock::new(start));
    let session = MeasurementSession::new(config)?.with_clock(clock.clone());
    session.start()?;

    let mut processed = 0_usize;
    for (index, block) in samples.chunks(block_size).enumerate() {
        let timestamp = sample_time(start, index * block_size, sample_rate);
        clock.set(timestamp);
        if session.process_block_at(block, timestamp).is_some() {
            processed += 1;
        }
    }
    clock.set(sample_time(start, samples.len(), sample_rate));
    debug!("Replayed {} blocks of {} samples", processed, block_size);

    let report = session.stop()?;
    info!(
        "Analyzed {:.1}s: LEQ {:.1} dB(A), dose {:.1}% ({})",
        report.measurement_duration_seconds,
        report.dosimeter.leq,
        report.noise_dose.dose_percentage,
        report.noise_dose.standard
    );
    Ok(report)
}
