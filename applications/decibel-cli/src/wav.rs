//! WAV input
//!
//! Reads PCM or float WAV files with hound and mixes all channels down to
//! one mono stream in `[-1.0, 1.0]`.

use crate::error::{CliError, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::{debug, info};

/// Mono samples with their source sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct MonoRecording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source file
    pub channels: u16,
}

impl MonoRecording {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Read `path` and mix it down to mono
pub fn read_mono(path: &Path) -> Result<MonoRecording> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    debug!(
        "{}: {} Hz, {} channel(s), {} bit {:?}",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    if spec.channels == 0 {
        return Err(CliError::UnsupportedAudio("file has no channels".to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<Vec<f32>, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(CliError::UnsupportedAudio(format!(
                    "{} bit integer samples",
                    spec.bits_per_sample
                )));
            }
            let full_scale = (1_u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / full_scale))
                .collect::<std::result::Result<Vec<f32>, _>>()?
        }
    };

    let samples = mix_to_mono(&interleaved, spec.channels);
    info!(
        "Read {} ({:.1}s at {} Hz)",
        path.display(),
        samples.len() as f64 / f64::from(spec.sample_rate),
        spec.sample_rate
    );

    Ok(MonoRecording {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Average interleaved frames into one channel
///
/// A trailing partial frame is dropped.
pub fn mix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
