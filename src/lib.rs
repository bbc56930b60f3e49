//! frame-grabber library crate.
//!
//! Background-threaded webcam capture with a "read the latest frame" API.

pub mod camera;
pub mod cli;
pub mod config;
pub mod snapshot;

pub use camera::{CameraError, Frame, FrameGrabber, GrabberSettings};
pub use snapshot::SnapshotPolicy;
