//! Shared latest-frame slot.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::types::Frame;

/// Single-frame mailbox between the capture thread and readers.
///
/// Frames are held behind an `Arc`, so every critical section is a pointer
/// swap or clone. Readers waiting on an empty slot park on the condvar and
/// are woken by the next `publish`.
#[derive(Debug, Default)]
pub struct FrameSlot {
    frame: Mutex<Option<Arc<Frame>>>,
    ready: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot contents with a new frame and wake all waiters.
    pub fn publish(&self, frame: Frame) {
        let frame = Arc::new(frame);
        *self.lock() = Some(frame);
        self.ready.notify_all();
    }

    /// Mark the slot empty.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// Current frame, if any, without blocking.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.lock().clone()
    }

    /// Block until the slot holds a frame. There is no timeout.
    pub fn wait(&self) -> Arc<Frame> {
        let mut guard = self.lock();
        loop {
            if let Some(frame) = guard.as_ref() {
                return Arc::clone(frame);
            }
            guard = self
                .ready
                .wait(guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    ///
    /// A timeout too large to represent as a deadline (e.g. `Duration::MAX`)
    /// waits without limit.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Arc<Frame>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait());
        };
        let mut guard = self.lock();
        loop {
            if let Some(frame) = guard.as_ref() {
                return Some(Arc::clone(frame));
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            if remaining.is_zero() {
                return None;
            }
            let (next, _) = self
                .ready
                .wait_timeout(guard, remaining)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard = next;
        }
    }

    // A panicking writer can't leave a half-written Option behind, so a
    // poisoned lock still holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, Option<Arc<Frame>>> {
        self.frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
