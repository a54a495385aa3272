//! Audio capture collaborator interface
//!
//! The session does not own any audio hardware. It tells the platform
//! capture layer when to start, pause, resume and stop delivering blocks,
//! and the capture layer calls [`MeasurementSession::process_block`]
//! from a single producer thread.
//!
//! [`MeasurementSession::process_block`]: crate::MeasurementSession::process_block

use decibel_core::Result;

/// Control signals sent to the platform capture layer
///
/// Implementations must not call back into the session from inside these
/// methods; the session holds its lifecycle lock while signalling.
pub trait CaptureControl: Send + Sync {
    /// Start the hardware tap
    ///
    /// An error moves the session into the `Error` state.
    fn request_start(&self) -> Result<()>;

    /// Stop delivering blocks and release the hardware
    fn request_stop(&self);

    /// Suspend block delivery, keeping the hardware configured
    fn request_pause(&self);

    /// Resume block delivery after a pause
    fn request_resume(&self);
}

/// Capture control that does nothing
///
/// For sessions fed directly (file replay, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCapture;

impl CaptureControl for NoopCapture {
    fn request_start(&self) -> Result<()> {
        Ok(())
    }

    fn request_stop(&self) {}

    fn request_pause(&self) {}

    fn request_resume(&self) {}
}
