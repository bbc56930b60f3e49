//! Background webcam frame grabbing.
//!
//! This module provides a still-camera style API over a polled webcam:
//! - [`FrameGrabber`] owns the capture thread and serves the latest frame
//! - [`DeviceBackend`] / [`CaptureDevice`] abstract the capture library
//! - [`TestPatternBackend`] and [`ScriptedBackend`] stand in for hardware

mod capture_loop;
mod device;
pub mod fake;
mod grabber;
#[cfg(feature = "native")]
mod native;
mod pattern;
mod slot;
mod types;

pub use device::{CaptureDevice, DeviceBackend};
pub use fake::{OpenBehavior, ScriptedBackend};
pub use grabber::FrameGrabber;
#[cfg(feature = "native")]
pub use native::NokhwaBackend;
pub use pattern::TestPatternBackend;
pub use slot::FrameSlot;
pub use types::{capture_interval, CameraError, Frame, FrameFormat, GrabberSettings, CAPTURE_HZ};
