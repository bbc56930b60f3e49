//! Scripted capture backend.
//!
//! Plays back a fixed list of per-poll results so the capture loop and the
//! grabber can be driven deterministically without hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::device::{CaptureDevice, DeviceBackend};
use super::types::{CameraError, Frame};

/// How the scripted device behaves when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenBehavior {
    /// Open on the first try
    Opened,
    /// Report closed until the generic open is called
    NeedsGenericOpen,
    /// The library refuses to acquire the device
    Unavailable,
}

/// Backend whose device replays `script`, one entry per poll.
///
/// Once the script is used up the last entry repeats (or the whole script
/// starts over when [`cycling`](Self::cycling) is set). An empty script
/// never yields a frame.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    open: OpenBehavior,
    script: Vec<Option<Frame>>,
    cycle: bool,
    polls: Arc<AtomicUsize>,
    generic_opens: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new(open: OpenBehavior, script: Vec<Option<Frame>>) -> Self {
        Self {
            open,
            script,
            cycle: false,
            polls: Arc::new(AtomicUsize::new(0)),
            generic_opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A device that opens but never produces a frame.
    pub fn never_ready() -> Self {
        Self::new(OpenBehavior::Opened, Vec::new())
    }

    /// Restart the script from the top instead of repeating the last entry.
    pub fn cycling(mut self) -> Self {
        self.cycle = true;
        self
    }

    /// Number of reads the device has served so far.
    pub fn poll_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.polls)
    }

    /// Number of times the generic open fallback ran.
    pub fn generic_open_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.generic_opens)
    }
}

impl DeviceBackend for ScriptedBackend {
    type Device = ScriptedDevice;

    fn open(&self, device_id: u32) -> Result<Self::Device, CameraError> {
        if self.open == OpenBehavior::Unavailable {
            return Err(CameraError::OpenFailed(format!(
                "scripted device {} is unavailable",
                device_id
            )));
        }

        Ok(ScriptedDevice {
            opened: self.open == OpenBehavior::Opened,
            pending: self.script.iter().cloned().collect(),
            script: self.script.clone(),
            cycle: self.cycle,
            last: None,
            polls: Arc::clone(&self.polls),
            generic_opens: Arc::clone(&self.generic_opens),
        })
    }
}

/// Device handed out by [`ScriptedBackend`].
#[derive(Debug)]
pub struct ScriptedDevice {
    opened: bool,
    pending: VecDeque<Option<Frame>>,
    script: Vec<Option<Frame>>,
    cycle: bool,
    last: Option<Frame>,
    polls: Arc<AtomicUsize>,
    generic_opens: Arc<AtomicUsize>,
}

impl CaptureDevice for ScriptedDevice {
    fn is_opened(&self) -> bool {
        self.opened
    }

    fn open(&mut self) -> Result<(), CameraError> {
        self.generic_opens.fetch_add(1, Ordering::SeqCst);
        self.opened = true;
        Ok(())
    }

    fn read(&mut self) -> Option<Frame> {
        if self.pending.is_empty() && self.cycle {
            self.pending = self.script.iter().cloned().collect();
        }

        let result = match self.pending.pop_front() {
            Some(entry) => {
                self.last = entry.clone();
                entry
            }
            None => self.last.clone(),
        };

        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.opened {
            result
        } else {
            None
        }
    }
}
