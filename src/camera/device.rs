//! Capture device abstraction.
//!
//! A backend knows how to open a device by index. The device it returns is
//! created on the capture thread and never leaves it, so it does not have to
//! be `Send` (nokhwa's `Camera` isn't).

use super::types::{CameraError, Frame};

/// An open (or half-open) camera handle.
pub trait CaptureDevice {
    /// Whether the device is ready to deliver frames.
    fn is_opened(&self) -> bool;

    /// Generic open without a device index.
    ///
    /// Called once when the handle reports not-open after construction.
    fn open(&mut self) -> Result<(), CameraError>;

    /// Grab one frame. `None` means the device produced nothing usable.
    fn read(&mut self) -> Option<Frame>;
}

/// Factory for capture devices, moved onto the capture thread.
pub trait DeviceBackend: Send + 'static {
    type Device: CaptureDevice;

    /// Acquire the device with the given index.
    fn open(&self, device_id: u32) -> Result<Self::Device, CameraError>;
}
