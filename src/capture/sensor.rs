//! Boundary to the physical depth/color sensor SDK.
//!
//! Implementations own the device session. The pipeline only ever talks to
//! the [`DepthSensor`] trait, so tests and hardware-free builds can swap in
//! their own sources.

use thiserror::Error;

use crate::geometry::Intrinsics;

use super::frame::RawFrame;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("no depth camera device found")]
    DeviceNotFound,

    /// Transient: the SDK delivered an incomplete or unaligned pair.
    /// The camera adapter skips these and waits for the next pair.
    #[error("frame pair failed alignment")]
    Misaligned,

    #[error("sensor stream failed: {0}")]
    Stream(String),

    #[error("sensor session is closed")]
    Closed,
}

/// A synchronized depth+color source.
///
/// `wait_for_frames` blocks until the next pair is available; the SDK is
/// expected to deliver both planes resampled onto the same pixel grid.
/// Exactly one thread of control owns a sensor at a time.
pub trait DepthSensor: Send {
    /// Block until the next synchronized frame pair arrives.
    fn wait_for_frames(&mut self) -> Result<RawFrame, SensorError>;

    /// Calibration of the depth stream, fixed for the session.
    fn intrinsics(&self) -> &Intrinsics;

    /// Raw-sensor-unit to meters conversion factor, fixed for the session.
    fn depth_scale(&self) -> f32;

    /// Release the device session. Idempotent.
    fn close(&mut self);
}
