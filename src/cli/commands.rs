//! Subcommand handlers for snapshot and watch.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::enums::Backend;
use crate::camera::{CameraError, FrameGrabber, GrabberSettings, TestPatternBackend};
use crate::config::ConfigError;
use crate::snapshot::{write_image, SnapshotError};

/// Global flag set by the Ctrl+C handler.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}

/// Errors surfaced by the command-line front end.
#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Camera(CameraError),
    Snapshot(SnapshotError),
    /// Backend not compiled into this binary
    BackendUnavailable(Backend),
    /// No frame arrived within the requested time
    Timeout(Duration),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{}", e),
            CliError::Camera(e) => write!(f, "{}", e),
            CliError::Snapshot(e) => write!(f, "{}", e),
            CliError::BackendUnavailable(backend) => write!(
                f,
                "Backend {:?} is not available in this build. Rebuild with --features native or use --backend test-pattern",
                backend
            ),
            CliError::Timeout(d) => write!(f, "No frame received within {} ms", d.as_millis()),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Camera(e) => Some(e),
            CliError::Snapshot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err)
    }
}

impl From<CameraError> for CliError {
    fn from(err: CameraError) -> Self {
        CliError::Camera(err)
    }
}

impl From<SnapshotError> for CliError {
    fn from(err: SnapshotError) -> Self {
        CliError::Snapshot(err)
    }
}

/// Open a grabber on the chosen backend.
pub fn open_grabber(backend: Backend, settings: GrabberSettings) -> Result<FrameGrabber, CliError> {
    let grabber = match backend {
        Backend::TestPattern => {
            FrameGrabber::with_backend(TestPatternBackend::default(), settings)?
        }
        #[cfg(feature = "native")]
        Backend::Native => FrameGrabber::with_backend(crate::camera::NokhwaBackend, settings)?,
        #[cfg(not(feature = "native"))]
        Backend::Native => return Err(CliError::BackendUnavailable(backend)),
    };

    log::info!("Camera {} ready ({:?} backend)", grabber.device_id(), backend);
    Ok(grabber)
}

/// Read one frame and save it to `output`.
///
/// Without a timeout this waits as long as the camera takes.
pub fn run_snapshot(
    grabber: &FrameGrabber,
    output: &Path,
    timeout: Option<Duration>,
) -> Result<(), CliError> {
    let frame = match timeout {
        Some(t) => grabber.read_timeout(t).ok_or(CliError::Timeout(t))?,
        None => grabber.read(),
    };

    write_image(output, &frame)?;
    println!(
        "Saved {}x{} frame to {}",
        frame.width,
        frame.height,
        output.display()
    );
    Ok(())
}

/// Read a frame every `interval` until Ctrl+C, logging what arrives.
pub fn run_watch(grabber: &FrameGrabber, interval: Duration) -> Result<(), CliError> {
    let mut count: u64 = 0;

    while !ctrlc_received() {
        match grabber.read_timeout(interval) {
            Some(frame) => {
                count += 1;
                log::info!(
                    "Frame {}: {}x{}, {:?} old",
                    count,
                    frame.width,
                    frame.height,
                    frame.timestamp.elapsed()
                );
                std::thread::sleep(interval);
            }
            None => log::warn!("No frame within {:?}", interval),
        }
    }

    println!("Read {} frame(s)", count);
    Ok(())
}
