//! Webcam access through nokhwa.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use super::device::{CaptureDevice, DeviceBackend};
use super::types::{CameraError, Frame};

/// Opens system cameras by index via the platform's native API.
#[derive(Debug, Clone, Copy, Default)]
pub struct NokhwaBackend;

impl DeviceBackend for NokhwaBackend {
    type Device = NokhwaDevice;

    fn open(&self, device_id: u32) -> Result<Self::Device, CameraError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let camera = Camera::new(CameraIndex::Index(device_id), requested)
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        log::info!("Opened camera {}: {}", device_id, camera.info().human_name());
        Ok(NokhwaDevice { camera })
    }
}

pub struct NokhwaDevice {
    camera: Camera,
}

impl CaptureDevice for NokhwaDevice {
    fn is_opened(&self) -> bool {
        self.camera.is_stream_open()
    }

    fn open(&mut self) -> Result<(), CameraError> {
        self.camera
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))
    }

    fn read(&mut self) -> Option<Frame> {
        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                log::trace!("Camera frame error: {}", e);
                return None;
            }
        };

        // Handles MJPEG, YUYV, NV12 and friends
        let decoded = buffer.decode_image::<RgbFormat>().ok()?;
        let resolution = buffer.resolution();
        Some(Frame::rgb(
            resolution.width(),
            resolution.height(),
            decoded.into_raw(),
        ))
    }
}
