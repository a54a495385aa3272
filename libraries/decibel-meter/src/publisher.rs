//! Snapshot fan-out
//!
//! The capture thread must never block on a slow consumer, so every
//! subscriber gets a bounded channel and snapshots are offered with
//! `try_send`. Full channels drop the snapshot; disconnected receivers are
//! pruned.

use chrono::{DateTime, Duration, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use decibel_core::types::MeterSnapshot;
use tracing::{debug, trace};

/// Longest accepted throttle window (one day)
const MAX_INTERVAL_MS: u64 = 86_400_000;

#[derive(Debug)]
pub struct SnapshotPublisher {
    subscribers: Vec<Sender<MeterSnapshot>>,
    channel_capacity: usize,
    min_interval: Duration,
    last_published: Option<DateTime<Utc>>,
}

impl SnapshotPublisher {
    pub fn new(channel_capacity: usize, min_interval_ms: u64) -> Self {
        Self {
            subscribers: Vec::new(),
            channel_capacity: channel_capacity.max(1),
            min_interval: Duration::milliseconds(min_interval_ms.min(MAX_INTERVAL_MS) as i64),
            last_published: None,
        }
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Receiver<MeterSnapshot> {
        let (tx, rx) = bounded(self.channel_capacity);
        self.subscribers.push(tx);
        debug!("Snapshot subscriber added ({} total)", self.subscribers.len());
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Offer a snapshot to every subscriber
    ///
    /// Returns `false` when the snapshot was throttled.
    pub fn publish(&mut self, snapshot: &MeterSnapshot) -> bool {
        if let Some(last) = self.last_published {
            let since_last = snapshot.timestamp - last;
            if since_last >= Duration::zero() && since_last < self.min_interval {
                trace!("Snapshot {} throttled", snapshot.sequence);
                return false;
            }
        }
        self.last_published = Some(snapshot.timestamp);

        self.subscribers.retain(|tx| match tx.try_send(snapshot.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("Subscriber full, dropping snapshot {}", snapshot.sequence);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Snapshot subscriber disconnected");
                false
            }
        });
        true
    }

    /// Forget the throttle window
    pub fn reset(&mut self) {
        self.last_published = None;
    }
}
