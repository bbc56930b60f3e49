//! Debug snapshots of the most recently read frame.
//!
//! Every `read()` on a grabber may leave a copy of the returned frame on
//! disk. The write is a diagnostic side effect: it can be disabled, rate
//! limited, and its failures are logged instead of returned.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::camera::Frame;

/// Where and how often snapshots are written.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPolicy {
    /// Destination file; the format follows the extension. `None` disables snapshots.
    pub path: Option<PathBuf>,
    /// Skip writes that come sooner than this after the previous one
    pub min_interval: Option<Duration>,
}

impl SnapshotPolicy {
    /// No snapshots at all.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Write every read frame to `path`.
    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            min_interval: None,
        }
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }
}

/// Errors from writing a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// Frame buffer doesn't match its dimensions
    InvalidFrame { expected: usize, actual: usize },
    /// Could not create the destination directory
    Io(std::io::Error),
    /// Image encoding or file write failed
    Encode(image::ImageError),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::InvalidFrame { expected, actual } => write!(
                f,
                "Frame buffer has {} bytes, expected {}",
                actual, expected
            ),
            SnapshotError::Io(e) => write!(f, "Snapshot I/O error: {}", e),
            SnapshotError::Encode(e) => write!(f, "Failed to encode snapshot: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e) => Some(e),
            SnapshotError::Encode(e) => Some(e),
            SnapshotError::InvalidFrame { .. } => None,
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::Io(err)
    }
}

impl From<image::ImageError> for SnapshotError {
    fn from(err: image::ImageError) -> Self {
        SnapshotError::Encode(err)
    }
}

/// Encode `frame` and write it to `path`, replacing any existing file.
///
/// Missing parent directories are created. The image format is picked from
/// the file extension (`.png`, `.jpg`, ...).
pub fn write_image(path: &Path, frame: &Frame) -> Result<(), SnapshotError> {
    if !frame.is_complete() {
        return Err(SnapshotError::InvalidFrame {
            expected: frame.expected_len(),
            actual: frame.data.len(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    image::save_buffer(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

/// Applies a [`SnapshotPolicy`] to a stream of read frames.
#[derive(Debug)]
pub struct SnapshotWriter {
    policy: SnapshotPolicy,
    last_write: Mutex<Option<Instant>>,
}

impl SnapshotWriter {
    pub fn new(policy: SnapshotPolicy) -> Self {
        Self {
            policy,
            last_write: Mutex::new(None),
        }
    }

    /// Write `frame` if the policy allows it. Returns whether a file was written.
    ///
    /// Failures are logged and swallowed. Only successful writes start a new
    /// `min_interval` window, so a failed attempt doesn't hold back the next.
    pub fn maybe_write(&self, frame: &Frame) -> bool {
        let Some(path) = self.policy.path.as_deref() else {
            return false;
        };

        // Held across the write so concurrent readers don't race on the file
        let mut last = self
            .last_write
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let (Some(min), Some(prev)) = (self.policy.min_interval, *last) {
            if prev.elapsed() < min {
                return false;
            }
        }

        match write_image(path, frame) {
            Ok(()) => {
                *last = Some(Instant::now());
                log::trace!("Wrote snapshot to {}", path.display());
                true
            }
            Err(e) => {
                log::warn!("Could not write snapshot to {}: {}", path.display(), e);
                false
            }
        }
    }
}
