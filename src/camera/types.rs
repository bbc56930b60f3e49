//! Camera types and data structures.

use std::fmt;
use std::time::{Duration, Instant};

use crate::snapshot::SnapshotPolicy;

/// Rate at which the capture thread asks the device for new frames.
pub const CAPTURE_HZ: f64 = 30.0;

/// Delay between two capture attempts (~33ms at 30 Hz).
pub fn capture_interval() -> Duration {
    Duration::from_secs_f64(1.0 / CAPTURE_HZ)
}

/// Pixel format of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
}

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Build an RGB frame stamped with the current time.
    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        }
    }

    /// Get the number of bytes per pixel (3 for RGB).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb => 3,
        }
    }

    /// Number of bytes a frame of this size and format must carry.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel()
    }

    /// True when the buffer holds exactly one full image.
    pub fn is_complete(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == self.expected_len()
    }
}

/// Settings for a [`FrameGrabber`](super::FrameGrabber).
#[derive(Debug, Clone, Default)]
pub struct GrabberSettings {
    /// Camera device index, interpreted by the backend
    pub device_id: u32,
    /// Where and how often `read()` leaves a debug copy of the frame
    pub snapshot: SnapshotPolicy,
}

impl GrabberSettings {
    pub fn new(device_id: u32) -> Self {
        Self {
            device_id,
            ..Self::default()
        }
    }

    pub fn with_snapshot(mut self, snapshot: SnapshotPolicy) -> Self {
        self.snapshot = snapshot;
        self
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// The capture library could not acquire the device
    OpenFailed(String),
    /// Capture thread could not be started or died during setup
    CaptureThreadFailed(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::CaptureThreadFailed(msg) => {
                write!(f, "Capture thread failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for CameraError {}
