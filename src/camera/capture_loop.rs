//! Background capture thread implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use super::device::{CaptureDevice, DeviceBackend};
use super::slot::FrameSlot;
use super::types::{capture_interval, CameraError};

/// Run the capture loop in a background thread.
///
/// The device is opened here rather than by the caller so that it never
/// crosses threads. The open result is reported once on `info_tx`; after a
/// successful open the loop polls until `stop` is raised.
pub fn run_capture_loop<B: DeviceBackend>(
    backend: B,
    device_id: u32,
    slot: Arc<FrameSlot>,
    stop: Arc<AtomicBool>,
    info_tx: Sender<Result<(), CameraError>>,
) {
    let mut device = match open_device(&backend, device_id) {
        Ok(device) => device,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if info_tx.send(Ok(())).is_err() {
        // Constructor went away before setup finished
        return;
    }
    drop(info_tx);

    log::info!("Capture loop started for device {}", device_id);

    let interval = capture_interval();
    let mut failures: u64 = 0;

    while !stop.load(Ordering::Relaxed) {
        match device.read() {
            Some(frame) if frame.is_complete() => {
                if failures > 0 {
                    log::debug!(
                        "Device {} recovered after {} failed read(s)",
                        device_id,
                        failures
                    );
                    failures = 0;
                }
                slot.publish(frame);
            }
            Some(frame) => {
                log::trace!(
                    "Dropping incomplete {}x{} frame ({} bytes)",
                    frame.width,
                    frame.height,
                    frame.data.len()
                );
                failures += 1;
                slot.clear();
            }
            None => {
                if failures == 0 {
                    log::debug!("Device {} returned no frame", device_id);
                }
                failures += 1;
                slot.clear();
            }
        }

        thread::sleep(interval);
    }

    log::info!("Capture loop for device {} stopped", device_id);
}

/// Open the device, falling back to a generic open if it reports closed.
fn open_device<B: DeviceBackend>(backend: &B, device_id: u32) -> Result<B::Device, CameraError> {
    let mut device = backend.open(device_id)?;

    if !device.is_opened() {
        log::debug!("Device {} not open, trying generic open", device_id);
        device.open()?;
        if !device.is_opened() {
            log::warn!(
                "Device {} still reports closed after open, polling anyway",
                device_id
            );
        }
    }

    Ok(device)
}
