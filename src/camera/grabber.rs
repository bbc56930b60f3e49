//! Frame grabber handle and public API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::capture_loop::run_capture_loop;
use super::device::DeviceBackend;
use super::slot::FrameSlot;
use super::types::{CameraError, Frame, GrabberSettings};
use crate::snapshot::SnapshotWriter;

/// Still-camera style access to a webcam.
///
/// A background thread polls the device at [`CAPTURE_HZ`](super::CAPTURE_HZ)
/// and keeps only the newest frame, so the OS and driver buffers never hand
/// out stale images. [`read`](Self::read) returns that newest frame.
///
/// `read()` has no timeout. If the camera stops delivering frames (for
/// example because it was unplugged) the call blocks until a frame shows up
/// again, possibly forever. Use [`read_timeout`](Self::read_timeout) when
/// that is not acceptable.
///
/// The capture loop has no explicit cancel; dropping the grabber raises a
/// stop flag so the loop exits after its current poll.
pub struct FrameGrabber {
    /// Latest captured frame (shared with capture thread)
    slot: Arc<FrameSlot>,
    /// Capture thread handle, kept for a future explicit shutdown
    capture_thread: JoinHandle<()>,
    /// Raised on drop so the capture loop exits
    stop_signal: Arc<AtomicBool>,
    snapshots: SnapshotWriter,
    settings: GrabberSettings,
}

impl std::fmt::Debug for FrameGrabber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGrabber")
            .field("settings", &self.settings)
            .field("is_capturing", &self.is_capturing())
            .finish_non_exhaustive()
    }
}

impl FrameGrabber {
    /// Open camera `device_id` with the platform camera backend.
    ///
    /// Snapshots are disabled; use [`with_backend`](Self::with_backend) to
    /// configure them.
    #[cfg(feature = "native")]
    pub fn new(device_id: u32) -> Result<Self, CameraError> {
        Self::with_backend(
            super::native::NokhwaBackend,
            GrabberSettings::new(device_id),
        )
    }

    /// Without the `native` feature there is no platform camera to open.
    #[cfg(not(feature = "native"))]
    pub fn new(device_id: u32) -> Result<Self, CameraError> {
        Err(CameraError::OpenFailed(format!(
            "device {}: built without native camera support",
            device_id
        )))
    }

    /// Open a camera through `backend` and start the capture thread.
    ///
    /// The device is acquired on the capture thread. This call waits for
    /// that to finish and fails with [`CameraError::OpenFailed`] if the
    /// device could not be acquired; in that case the thread has already
    /// exited and nothing keeps polling.
    pub fn with_backend<B: DeviceBackend>(
        backend: B,
        settings: GrabberSettings,
    ) -> Result<Self, CameraError> {
        let slot = Arc::new(FrameSlot::new());
        let stop_signal = Arc::new(AtomicBool::new(false));

        // Channel to receive the open result from the thread
        let (info_tx, info_rx) = mpsc::channel::<Result<(), CameraError>>();

        let capture_thread = {
            let slot = Arc::clone(&slot);
            let stop = Arc::clone(&stop_signal);
            let device_id = settings.device_id;
            thread::Builder::new()
                .name(format!("frame-grabber-{}", device_id))
                .spawn(move || run_capture_loop(backend, device_id, slot, stop, info_tx))
                .map_err(|e| CameraError::CaptureThreadFailed(e.to_string()))?
        };

        match info_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                slot,
                capture_thread,
                stop_signal,
                snapshots: SnapshotWriter::new(settings.snapshot.clone()),
                settings,
            }),
            Ok(Err(e)) => {
                let _ = capture_thread.join();
                Err(e)
            }
            Err(_) => {
                // Thread died before reporting (backend panicked)
                let _ = capture_thread.join();
                Err(CameraError::CaptureThreadFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Return the most recent frame, waiting for one if none is available.
    ///
    /// Blocks without a timeout while the device produces nothing. The
    /// returned frame is also written to the configured snapshot path; a
    /// failed write is logged and does not affect the result.
    pub fn read(&self) -> Arc<Frame> {
        let frame = self.slot.wait();
        self.snapshots.maybe_write(&frame);
        frame
    }

    /// Like [`read`](Self::read) but gives up after `timeout`.
    pub fn read_timeout(&self, timeout: Duration) -> Option<Arc<Frame>> {
        let frame = self.slot.wait_timeout(timeout)?;
        self.snapshots.maybe_write(&frame);
        Some(frame)
    }

    /// Current frame without waiting and without writing a snapshot.
    pub fn try_read(&self) -> Option<Arc<Frame>> {
        self.slot.latest()
    }

    pub fn device_id(&self) -> u32 {
        self.settings.device_id
    }

    pub fn settings(&self) -> &GrabberSettings {
        &self.settings
    }

    /// Check if the capture thread is still alive.
    pub fn is_capturing(&self) -> bool {
        !self.capture_thread.is_finished()
    }
}

impl Drop for FrameGrabber {
    // Signal only; joining could stall on a slow device read.
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::fake::{OpenBehavior, ScriptedBackend};

    #[test]
    fn test_open_failure_returns_open_failed() {
        let backend = ScriptedBackend::new(OpenBehavior::Unavailable, vec![]);
        let polls = backend.poll_counter();

        match FrameGrabber::with_backend(backend, GrabberSettings::new(7)) {
            Err(CameraError::OpenFailed(msg)) => assert!(msg.contains('7')),
            other => panic!("Expected OpenFailed, got {:?}", other),
        }
        assert_eq!(polls.load(Ordering::SeqCst), 0);
    }

    #[cfg(not(feature = "native"))]
    #[test]
    fn test_new_without_native_backend_fails() {
        assert!(matches!(
            FrameGrabber::new(0),
            Err(CameraError::OpenFailed(_))
        ));
    }

    #[test]
    fn test_read_returns_captured_frame() {
        let backend = ScriptedBackend::new(
            OpenBehavior::Opened,
            vec![Some(Frame::rgb(1, 1, vec![10, 20, 30]))],
        );
        let grabber = FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap();

        let frame = grabber.read();
        assert_eq!(frame.data, vec![10, 20, 30]);
        assert!(grabber.is_capturing());
    }

    #[test]
    fn test_read_timeout_on_silent_device() {
        let grabber =
            FrameGrabber::with_backend(ScriptedBackend::never_ready(), GrabberSettings::new(0))
                .unwrap();

        assert!(grabber.read_timeout(Duration::from_millis(150)).is_none());
        assert!(grabber.try_read().is_none());
    }

    #[test]
    fn test_read_timeout_max_duration_returns_frame() {
        let backend = ScriptedBackend::new(
            OpenBehavior::Opened,
            vec![Some(Frame::rgb(1, 1, vec![4, 5, 6]))],
        );
        let grabber = FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap();

        let frame = grabber.read_timeout(Duration::MAX).unwrap();
        assert_eq!(frame.data, vec![4, 5, 6]);
    }

    #[test]
    fn test_settings_are_kept() {
        let grabber =
            FrameGrabber::with_backend(ScriptedBackend::never_ready(), GrabberSettings::new(3))
                .unwrap();
        assert_eq!(grabber.device_id(), 3);
        assert!(!grabber.settings().snapshot.is_enabled());
    }

    #[test]
    fn test_drop_stops_capture_thread() {
        let backend = ScriptedBackend::never_ready();
        let polls = backend.poll_counter();
        let grabber = FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap();
        drop(grabber);

        // Let the loop notice the stop flag
        thread::sleep(Duration::from_millis(150));
        let after_stop = polls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(150));
        assert_eq!(polls.load(Ordering::SeqCst), after_stop);
    }
}
