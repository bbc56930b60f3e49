//! Synthetic test-pattern camera.

use super::device::{CaptureDevice, DeviceBackend};
use super::types::{CameraError, Frame};

/// Backend producing a diagonal gradient that shifts one step per frame.
#[derive(Debug, Clone, Copy)]
pub struct TestPatternBackend {
    pub width: u32,
    pub height: u32,
}

impl Default for TestPatternBackend {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl DeviceBackend for TestPatternBackend {
    type Device = TestPatternDevice;

    fn open(&self, _device_id: u32) -> Result<Self::Device, CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::OpenFailed(format!(
                "invalid test pattern size {}x{}",
                self.width, self.height
            )));
        }
        Ok(TestPatternDevice {
            width: self.width,
            height: self.height,
            tick: 0,
        })
    }
}

#[derive(Debug)]
pub struct TestPatternDevice {
    width: u32,
    height: u32,
    tick: u32,
}

impl CaptureDevice for TestPatternDevice {
    fn is_opened(&self) -> bool {
        true
    }

    fn open(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    fn read(&mut self) -> Option<Frame> {
        let (w, h) = (self.width as usize, self.height as usize);
        let shift = self.tick as usize;
        let mut data = Vec::with_capacity(w * h * 3);

        for y in 0..h {
            for x in 0..w {
                data.push(((x + shift) * 255 / w.max(1)) as u8);
                data.push(((y + shift) * 255 / h.max(1)) as u8);
                data.push(((x + y + shift) % 256) as u8);
            }
        }

        self.tick = self.tick.wrapping_add(1);
        Some(Frame::rgb(self.width, self.height, data))
    }
}
