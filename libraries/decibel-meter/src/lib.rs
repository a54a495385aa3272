//! Decibel - Measurement Session
//!
//! Platform-agnostic measurement engine for the Decibel sound-level meter
//! and noise dosimeter.
//!
//! This crate provides:
//! - Session lifecycle (idle, measuring, paused, error)
//! - Two meters per session: primary (selectable weighting) and dosimeter (A)
//! - Bounded history with batch eviction
//! - Statistics (LEQ, L10/L50/L90, min/max/peak, standard deviation)
//! - Noise dose, TWA and permissible exposure tables (OSHA, NIOSH, GBZ, EU)
//! - Snapshot fan-out to any number of subscribers
//!
//! # Architecture
//!
//! `decibel-meter` owns no audio hardware. The platform capture layer
//! implements [`CaptureControl`] and feeds PCM blocks into
//! [`MeasurementSession::process_block`] from one producer thread. UI,
//! export and alerting code read from other threads.
//!
//! # Example: Measuring
//!
//! ```rust
//! use decibel_meter::{MeasurementSession, MeterConfig};
//! use decibel_core::types::{MeterKind, NoiseStandard};
//!
//! let session = MeasurementSession::new(MeterConfig::default()).unwrap();
//! session.set_noise_standard(NoiseStandard::Osha);
//! session.start().unwrap();
//!
//! let snapshots = session.subscribe();
//! for _ in 0..10 {
//!     session.process_block(&vec![0.02_f32; 2048]);
//! }
//! assert_eq!(snapshots.try_iter().count(), 10);
//!
//! let dose = session.noise_dose();
//! println!("TWA {:.1} dB, dose {:.1}%", dose.twa, dose.dose_percentage);
//!
//! let report = session.stop().unwrap();
//! assert_eq!(report.dosimeter.count, 10);
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use decibel_meter::{CaptureControl, MeasurementSession, MeterConfig, Result};
//! use std::sync::Arc;
//!
//! struct Microphone;
//!
//! impl CaptureControl for Microphone {
//!     fn request_start(&self) -> Result<()> {
//!         // Open the input device
//!         Ok(())
//!     }
//!     fn request_stop(&self) {}
//!     fn request_pause(&self) {}
//!     fn request_resume(&self) {}
//! }
//!
//! let session = MeasurementSession::new(MeterConfig::default())
//!     .unwrap()
//!     .with_capture(Arc::new(Microphone));
//! session.start().unwrap();
//! ```

#![deny(unsafe_code)]

mod accumulator;
mod capture;
pub mod chart;
mod clock;
mod config;
pub mod dose;
mod history;
mod publisher;
mod report;
mod running;
mod session;
pub mod statistics;

// Public exports
pub use accumulator::LevelDurationAccumulator;
pub use capture::{CaptureControl, NoopCapture};
pub use chart::{ChartPoint, LevelHistogramBin};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MeterConfig, SessionSettings};
pub use decibel_core::{MeterError, Result};
pub use history::{MeasurementHistory, DEFAULT_HISTORY_CAPACITY};
pub use publisher::SnapshotPublisher;
pub use report::MeasurementReport;
pub use running::RunningStatistics;
pub use session::MeasurementSession;
