//! Measurement session - core orchestration
//!
//! Owns both meters (primary and dosimeter), routes every captured block
//! through the level pipeline, keeps history and exposure accounting, and
//! answers read-side queries.
//!
//! # Locking
//!
//! - `store` is the single serialization point for histories, running
//!   statistics and the level duration accumulator. A block's append,
//!   eviction and accumulation happen under one acquisition.
//! - Readers copy what they need out of `store` and compute afterwards.
//! - `pipeline` is only touched by the producer (and by reset). The block
//!   path holds it from filter update to store append, so a reset waits for
//!   an in-flight block or makes it stale.
//! - `reset` bumps the store generation. A block that observed an older
//!   generation when it passed the measuring check is discarded.
//! - Lock order is lifecycle, then pipeline, then store, then
//!   publisher/settings.

use crate::accumulator::LevelDurationAccumulator;
use crate::capture::{CaptureControl, NoopCapture};
use crate::chart::{self, ChartPoint, LevelHistogramBin};
use crate::clock::{Clock, SystemClock};
use crate::config::{MeterConfig, SessionSettings};
use crate::dose;
use crate::history::MeasurementHistory;
use crate::publisher::SnapshotPublisher;
use crate::report::MeasurementReport;
use crate::running::RunningStatistics;
use crate::statistics;
use chrono::{DateTime, Duration, Utc};
use crossbeam_channel::Receiver;
use decibel_core::types::{
    DecibelStatistics, FrequencyWeighting, MeasurementRecord, MeasurementState, MeterKind,
    MeterReading, MeterSnapshot, NoiseDoseData, NoiseStandard, NoiseStandardProfile,
    PermissibleExposureTable, TimeWeighting,
};
use decibel_core::{MeterError, Result};
use decibel_dsp::{clamp_decibel, LevelCalculator, LevelSettings};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, trace, warn};

/// Lock a mutex, recovering the data if a panicking thread poisoned it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Seconds in a chrono duration, with microsecond resolution
pub(crate) fn duration_secs(duration: Duration) -> f64 {
    duration
        .num_microseconds()
        .map_or_else(|| duration.num_seconds() as f64, |us| us as f64 / 1_000_000.0)
}

#[derive(Debug)]
struct Lifecycle {
    state: MeasurementState,
    started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    paused_total: Duration,
    stopped_at: Option<DateTime<Utc>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: MeasurementState::Idle,
            started_at: None,
            paused_at: None,
            paused_total: Duration::zero(),
            stopped_at: None,
        }
    }
}

impl Lifecycle {
    /// Time spent measuring up to `now`, paused intervals excluded
    fn measured(&self, now: DateTime<Utc>) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::zero();
        };
        let end = self.stopped_at.or(self.paused_at).unwrap_or(now);
        (end - started_at - self.paused_total).max(Duration::zero())
    }

    /// Close an open pause interval at `now`
    fn fold_pause(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total = self.paused_total + (now - paused_at).max(Duration::zero());
        }
    }

    /// Freeze the measured duration at `now`
    fn finish(&mut self, now: DateTime<Utc>) {
        self.fold_pause(now);
        self.stopped_at = Some(now);
    }

    fn rejected(&self, action: &'static str) -> MeterError {
        warn!("Rejected {} while {}", action, self.state);
        MeterError::InvalidTransition {
            action,
            state: self.state.clone(),
        }
    }
}

/// Level calculators, one per meter, each with its own filter state
#[derive(Debug)]
struct Pipeline {
    primary: LevelCalculator,
    dosimeter: LevelCalculator,
}

impl Pipeline {
    fn new() -> Self {
        Self {
            primary: LevelCalculator::new(),
            dosimeter: LevelCalculator::new(),
        }
    }

    fn seeded(seed: u64) -> Self {
        Self {
            primary: LevelCalculator::with_spectrum_seed(seed),
            dosimeter: LevelCalculator::with_spectrum_seed(seed.wrapping_add(1)),
        }
    }

    fn reset(&mut self) {
        self.primary.reset();
        self.dosimeter.reset();
    }
}

#[derive(Debug)]
struct MeterData {
    history: MeasurementHistory,
    running: RunningStatistics,
}

impl MeterData {
    fn new(capacity: usize) -> Self {
        Self {
            history: MeasurementHistory::new(capacity),
            running: RunningStatistics::default(),
        }
    }

    /// Fold a record into running statistics and history
    ///
    /// Returns the number of history records evicted.
    fn record(&mut self, record: MeasurementRecord, calibration_offset_db: f64) -> usize {
        let peak_candidate = clamp_decibel(record.raw_decibel + calibration_offset_db);
        self.running.update(record.calibrated_decibel, peak_candidate);
        self.history.append(record)
    }

    fn reading(&self) -> MeterReading {
        self.running.reading(self.history.leq())
    }

    fn clear(&mut self) {
        self.history.clear();
        self.running.reset();
    }
}

#[derive(Debug)]
struct MeterStore {
    primary: MeterData,
    dosimeter: MeterData,
    level_durations: LevelDurationAccumulator,
    blocks_processed: u64,
    /// Bumped by every reset
    generation: u64,
}

impl MeterStore {
    fn new(capacity: usize) -> Self {
        Self {
            primary: MeterData::new(capacity),
            dosimeter: MeterData::new(capacity),
            level_durations: LevelDurationAccumulator::new(),
            blocks_processed: 0,
            generation: 0,
        }
    }

    fn meter(&self, meter: MeterKind) -> &MeterData {
        match meter {
            MeterKind::Primary => &self.primary,
            MeterKind::Dosimeter => &self.dosimeter,
        }
    }

    fn clear(&mut self) {
        self.primary.clear();
        self.dosimeter.clear();
        self.level_durations.clear();
        self.blocks_processed = 0;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// A sound level measurement session
///
/// Safe to share between the capture thread (calling
/// [`process_block`](Self::process_block)) and any number of reader threads.
///
/// # Example
///
/// ```rust
/// use decibel_meter::{MeasurementSession, MeterConfig};
/// use decibel_core::types::{MeterKind, TimeWeighting};
///
/// let session = MeasurementSession::new(MeterConfig::default()).unwrap();
/// session.set_time_weighting(TimeWeighting::Slow);
/// session.start().unwrap();
///
/// let block = vec![0.05_f32; 2048];
/// let snapshot = session.process_block(&block).unwrap();
/// assert!(snapshot.primary.current.is_some());
///
/// let stats = session.statistics(MeterKind::Primary);
/// assert_eq!(stats.count, 1);
/// ```
pub struct MeasurementSession {
    config: MeterConfig,
    settings: Mutex<SessionSettings>,
    lifecycle: Mutex<Lifecycle>,
    pipeline: Mutex<Pipeline>,
    store: Mutex<MeterStore>,
    publisher: Mutex<SnapshotPublisher>,
    capture: Arc<dyn CaptureControl>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MeasurementSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementSession")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("settings", &self.settings())
            .finish_non_exhaustive()
    }
}

impl MeasurementSession {
    /// Create an idle session
    pub fn new(config: MeterConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            settings: Mutex::new(config.initial_settings()),
            lifecycle: Mutex::new(Lifecycle::default()),
            pipeline: Mutex::new(Pipeline::new()),
            store: Mutex::new(MeterStore::new(config.history_capacity)),
            publisher: Mutex::new(SnapshotPublisher::new(
                config.snapshot_channel_capacity,
                config.publish_interval_ms,
            )),
            capture: Arc::new(NoopCapture),
            clock: Arc::new(SystemClock),
            config,
        })
    }

    /// Use `capture` for start/stop/pause/resume signals
    #[must_use]
    pub fn with_capture(mut self, capture: Arc<dyn CaptureControl>) -> Self {
        self.capture = capture;
        self
    }

    /// Use `clock` for block timestamps and elapsed time
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Make the placeholder spectrum reproducible
    #[must_use]
    pub fn with_spectrum_seed(mut self, seed: u64) -> Self {
        *self
            .pipeline
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = Pipeline::seeded(seed);
        self
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    // ===== Lifecycle =====

    pub fn state(&self) -> MeasurementState {
        lock(&self.lifecycle).state.clone()
    }

    pub fn is_measuring(&self) -> bool {
        lock(&self.lifecycle).state == MeasurementState::Measuring
    }

    /// Start measuring
    ///
    /// No-op while already measuring. Rejected while paused (resume or stop
    /// first) and in the error state (reset first). A capture start failure
    /// moves the session into `Error`.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = lock(&self.lifecycle);
        match lifecycle.state {
            MeasurementState::Measuring => {
                debug!("start() ignored: already measuring");
                return Ok(());
            }
            MeasurementState::Idle => {}
            _ => return Err(lifecycle.rejected("start")),
        }

        if let Err(err) = self.capture.request_start() {
            error!("Audio capture failed to start: {}", err);
            lifecycle.state = MeasurementState::Error {
                message: err.to_string(),
            };
            return Err(err);
        }

        let now = self.clock.now();
        {
            let mut store = lock(&self.store);
            store.primary.running.reset();
            store.dosimeter.running.reset();
        }

        *lifecycle = Lifecycle {
            state: MeasurementState::Measuring,
            started_at: Some(now),
            ..Lifecycle::default()
        };
        info!("Measurement started at {}", now);
        Ok(())
    }

    /// Suspend block processing, keeping all accumulated state
    pub fn pause(&self) -> Result<()> {
        let mut lifecycle = lock(&self.lifecycle);
        if lifecycle.state != MeasurementState::Measuring {
            return Err(lifecycle.rejected("pause"));
        }

        self.capture.request_pause();
        lifecycle.paused_at = Some(self.clock.now());
        lifecycle.state = MeasurementState::Paused;
        info!("Measurement paused");
        Ok(())
    }

    /// Continue after a pause without touching the start time
    pub fn resume(&self) -> Result<()> {
        let mut lifecycle = lock(&self.lifecycle);
        if lifecycle.state != MeasurementState::Paused {
            return Err(lifecycle.rejected("resume"));
        }

        self.capture.request_resume();
        let now = self.clock.now();
        lifecycle.fold_pause(now);
        lifecycle.state = MeasurementState::Measuring;
        info!("Measurement resumed");
        Ok(())
    }

    /// Stop measuring and return the final report
    ///
    /// History is kept; use [`reset`](Self::reset) to clear it.
    pub fn stop(&self) -> Result<MeasurementReport> {
        let mut lifecycle = lock(&self.lifecycle);
        if !lifecycle.state.is_active() {
            return Err(lifecycle.rejected("stop"));
        }

        self.capture.request_stop();
        let now = self.clock.now();
        lifecycle.finish(now);
        lifecycle.state = MeasurementState::Idle;
        info!(
            "Measurement stopped after {:.1}s",
            duration_secs(lifecycle.measured(now))
        );

        // Built before the lifecycle lock is released so a concurrent reset
        // cannot empty it
        Ok(self.build_report(&lifecycle, now))
    }

    /// Stop if active and return to a clean idle session
    ///
    /// Clears histories, the level duration accumulator, running statistics
    /// and filter state, and sets the calibration offset back to 0 dB.
    pub fn reset(&self) {
        let mut lifecycle = lock(&self.lifecycle);
        if lifecycle.state.is_active() {
            self.capture.request_stop();
        }
        *lifecycle = Lifecycle::default();

        {
            let mut pipeline = lock(&self.pipeline);
            let mut store = lock(&self.store);
            pipeline.reset();
            store.clear();
        }
        lock(&self.publisher).reset();
        lock(&self.settings).calibration_offset_db = 0.0;
        info!("Measurement session reset");
    }

    /// Called by the capture layer when it can no longer deliver audio
    ///
    /// Moves an active session into `Error`; the session stays there until
    /// reset.
    pub fn report_capture_failure(&self, message: impl Into<String>) {
        let message = message.into();
        let mut lifecycle = lock(&self.lifecycle);
        if !lifecycle.state.is_active() {
            warn!(
                "Ignoring capture failure while {}: {}",
                lifecycle.state, message
            );
            return;
        }

        self.capture.request_stop();
        lifecycle.finish(self.clock.now());
        error!("Audio capture failed: {}", message);
        lifecycle.state = MeasurementState::Error { message };
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        lock(&self.lifecycle).started_at
    }

    /// Time spent measuring since start, paused intervals excluded
    pub fn measurement_duration(&self) -> Duration {
        let now = self.clock.now();
        lock(&self.lifecycle).measured(now)
    }

    pub fn measurement_duration_hours(&self) -> f64 {
        duration_secs(self.measurement_duration()) / 3600.0
    }

    // ===== Block processing =====

    /// Process one captured block, timestamped with the session clock
    ///
    /// Returns the published snapshot, or `None` when the block was ignored
    /// (not measuring, or empty).
    pub fn process_block(&self, samples: &[f32]) -> Option<MeterSnapshot> {
        self.process_block_at(samples, self.clock.now())
    }

    /// Process one block captured at `timestamp`
    pub fn process_block_at(
        &self,
        samples: &[f32],
        timestamp: DateTime<Utc>,
    ) -> Option<MeterSnapshot> {
        if samples.is_empty() {
            debug!("Ignoring empty block");
            return None;
        }
        let generation = self.admit_block()?;
        self.process_admitted(samples, timestamp, generation)
    }

    /// Store generation if a block may be processed now
    fn admit_block(&self) -> Option<u64> {
        let lifecycle = lock(&self.lifecycle);
        if lifecycle.state != MeasurementState::Measuring {
            trace!("Ignoring block while not measuring");
            return None;
        }
        Some(lock(&self.store).generation)
    }

    fn process_admitted(
        &self,
        samples: &[f32],
        timestamp: DateTime<Utc>,
        generation: u64,
    ) -> Option<MeterSnapshot> {
        let settings = self.settings();
        let primary_settings = LevelSettings {
            frequency_weighting: settings.frequency_weighting,
            time_weighting: settings.time_weighting,
            calibration_offset_db: settings.calibration_offset_db,
        };
        let dosimeter_settings = primary_settings.with_frequency_weighting(FrequencyWeighting::A);

        let block_secs = samples.len() as f64 / f64::from(self.config.sample_rate);

        let mut pipeline = lock(&self.pipeline);
        if lock(&self.store).generation != generation {
            debug!("Discarding block started before a reset");
            return None;
        }
        let primary = pipeline
            .primary
            .process(samples, &primary_settings, timestamp);
        let dosimeter = pipeline
            .dosimeter
            .process(samples, &dosimeter_settings, timestamp);

        let snapshot = {
            let mut store = lock(&self.store);
            drop(pipeline);
            store
                .level_durations
                .add(dosimeter.calibrated_decibel, block_secs);
            let evicted = store.primary.record(primary, settings.calibration_offset_db);
            store
                .dosimeter
                .record(dosimeter, settings.calibration_offset_db);
            store.blocks_processed += 1;

            if evicted > 0 {
                debug!("History trimmed: {} oldest records evicted per meter", evicted);
            }

            MeterSnapshot {
                sequence: store.blocks_processed,
                timestamp,
                primary: store.primary.reading(),
                dosimeter: store.dosimeter.reading(),
            }
        };

        lock(&self.publisher).publish(&snapshot);
        Some(snapshot)
    }

    /// Receive a snapshot after every processed block (subject to throttling)
    pub fn subscribe(&self) -> Receiver<MeterSnapshot> {
        lock(&self.publisher).subscribe()
    }

    /// Regenerate the placeholder spectrum of both meters on the next block
    pub fn invalidate_spectrum_cache(&self) {
        let mut pipeline = lock(&self.pipeline);
        pipeline.primary.invalidate_spectrum_cache();
        pipeline.dosimeter.invalidate_spectrum_cache();
    }

    // ===== Configuration =====

    pub fn settings(&self) -> SessionSettings {
        *lock(&self.settings)
    }

    /// Weighting of the primary meter; the dosimeter stays A-weighted
    pub fn set_frequency_weighting(&self, weighting: FrequencyWeighting) {
        lock(&self.settings).frequency_weighting = weighting;
        info!("Frequency weighting set to {}", weighting);
    }

    pub fn set_time_weighting(&self, weighting: TimeWeighting) {
        lock(&self.settings).time_weighting = weighting;
        info!("Time weighting set to {}", weighting);
    }

    pub fn set_calibration_offset_db(&self, offset_db: f64) -> Result<()> {
        if !offset_db.is_finite() {
            return Err(MeterError::InvalidConfig(format!(
                "calibration offset must be finite, got {}",
                offset_db
            )));
        }
        lock(&self.settings).calibration_offset_db = offset_db;
        info!("Calibration offset set to {:+.1} dB", offset_db);
        Ok(())
    }

    /// Swap the noise standard; measurement data is kept
    pub fn set_noise_standard(&self, standard: NoiseStandard) {
        lock(&self.settings).noise_standard = standard;
        info!("Noise standard set to {}", standard.description());
    }

    pub fn noise_standard_profile(&self) -> NoiseStandardProfile {
        self.settings().noise_standard.profile()
    }

    // ===== Queries =====

    /// Current, min, max, peak and LEQ of one meter
    pub fn reading(&self, meter: MeterKind) -> MeterReading {
        lock(&self.store).meter(meter).reading()
    }

    /// Copy of a meter's history, oldest first
    pub fn history(&self, meter: MeterKind) -> Vec<MeasurementRecord> {
        lock(&self.store).meter(meter).history.snapshot()
    }

    /// Copy of a meter's records captured at or after `since`
    pub fn history_since(&self, meter: MeterKind, since: DateTime<Utc>) -> Vec<MeasurementRecord> {
        lock(&self.store).meter(meter).history.since(since)
    }

    /// Drop both histories, keeping running extremes and exposure time
    pub fn clear_history(&self) {
        let mut store = lock(&self.store);
        store.primary.history.clear();
        store.dosimeter.history.clear();
        debug!("Histories cleared");
    }

    pub fn blocks_processed(&self) -> u64 {
        lock(&self.store).blocks_processed
    }

    pub fn statistics(&self, meter: MeterKind) -> DecibelStatistics {
        let (records, running) = {
            let store = lock(&self.store);
            let data = store.meter(meter);
            (data.history.snapshot(), data.running)
        };
        statistics::compute(&records, &running)
    }

    /// Dose metrics from the dosimeter LEQ and the measured duration
    pub fn noise_dose(&self) -> NoiseDoseData {
        let (leq, peak) = {
            let store = lock(&self.store);
            (store.dosimeter.history.leq(), store.dosimeter.running.peak)
        };
        let hours = self.measurement_duration_hours();
        dose::noise_dose_data(
            leq,
            hours,
            peak,
            &self.noise_standard_profile(),
        )
    }

    pub fn permissible_exposure_table(&self) -> PermissibleExposureTable {
        let level_durations = self.level_durations();
        dose::permissible_exposure_table(&self.noise_standard_profile(), &level_durations)
    }

    /// Copy of the exposure time per rounded level
    pub fn level_durations(&self) -> LevelDurationAccumulator {
        lock(&self.store).level_durations.clone()
    }

    /// Calibrated levels over time, relative to the measurement start
    pub fn chart_series(
        &self,
        meter: MeterKind,
        since: Option<DateTime<Utc>>,
    ) -> Vec<ChartPoint> {
        let records = match since {
            Some(since) => self.history_since(meter, since),
            None => self.history(meter),
        };
        chart::time_series(&records, self.started_at())
    }

    pub fn level_histogram(&self, meter: MeterKind) -> Vec<LevelHistogramBin> {
        chart::level_histogram(&self.history(meter))
    }

    /// Everything known about the session, for export
    pub fn report(&self) -> MeasurementReport {
        let generated_at = self.clock.now();
        let lifecycle = lock(&self.lifecycle);
        self.build_report(&lifecycle, generated_at)
    }

    /// Report for the given lifecycle; the caller holds the lifecycle lock
    fn build_report(
        &self,
        lifecycle: &Lifecycle,
        generated_at: DateTime<Utc>,
    ) -> MeasurementReport {
        let state = lifecycle.state.clone();
        let started_at = lifecycle.started_at;
        let measured = lifecycle.measured(generated_at);
        let settings = self.settings();

        let (primary_records, primary_running, dosimeter_records, dosimeter_running, level_durations) = {
            let store = lock(&self.store);
            (
                store.primary.history.snapshot(),
                store.primary.running,
                store.dosimeter.history.snapshot(),
                store.dosimeter.running,
                store.level_durations.clone(),
            )
        };

        let profile = settings.noise_standard.profile();
        let measurement_duration_seconds = duration_secs(measured);
        let dosimeter = statistics::compute(&dosimeter_records, &dosimeter_running);
        let noise_dose = dose::noise_dose_data(
            dosimeter.leq,
            measurement_duration_seconds / 3600.0,
            dosimeter_running.peak,
            &profile,
        );

        MeasurementReport {
            generated_at,
            state,
            started_at,
            measurement_duration_seconds,
            settings,
            primary: statistics::compute(&primary_records, &primary_running),
            dosimeter,
            noise_dose,
            exposure_table: dose::permissible_exposure_table(&profile, &level_durations),
            level_durations,
        }
    }
}
