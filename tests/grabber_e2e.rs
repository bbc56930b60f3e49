//! End-to-end tests for the frame grabber.
//!
//! These drive a real capture thread against scripted devices:
//! - read() returns the newest frame and leaves a debug snapshot
//! - read() keeps waiting while the device produces nothing
//! - concurrent readers only ever see whole frames
//! - open failures surface at construction

use frame_grabber::camera::{
    capture_interval, CameraError, Frame, FrameGrabber, GrabberSettings, OpenBehavior,
    ScriptedBackend,
};
use frame_grabber::snapshot::SnapshotPolicy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// 4x4 frame with every byte set to `value`.
fn uniform_frame(value: u8) -> Frame {
    Frame::rgb(4, 4, vec![value; 4 * 4 * 3])
}

fn wait_for_polls(polls: &AtomicUsize, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while polls.load(Ordering::SeqCst) < count {
        assert!(Instant::now() < deadline, "capture loop stalled");
        thread::sleep(Duration::from_millis(2));
    }
}

/// Device opens, three polls fail, the fourth yields F1.
#[test]
fn test_read_after_three_failures_returns_first_frame() {
    let dir = TempDir::new().unwrap();
    let recent = dir.path().join("recent.png");

    let f1 = uniform_frame(42);
    let backend = ScriptedBackend::new(
        OpenBehavior::Opened,
        vec![None, None, None, Some(f1.clone())],
    );
    let polls = backend.poll_counter();
    let settings = GrabberSettings::new(0).with_snapshot(SnapshotPolicy::to_path(&recent));
    let grabber = FrameGrabber::with_backend(backend, settings).expect("grabber should open");

    wait_for_polls(&polls, 4);
    let frame = grabber.read();
    assert_eq!(frame.data, f1.data);

    let saved = image::open(&recent).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (4, 4));
    assert_eq!(saved.into_raw(), f1.data);
}

#[test]
fn test_read_returns_most_recent_capture() {
    let script = (1..=5).map(|v| Some(uniform_frame(v))).collect();
    let backend = ScriptedBackend::new(OpenBehavior::Opened, script);
    let polls = backend.poll_counter();
    let grabber = FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap();

    // Past the end of the script the device keeps returning the last frame
    wait_for_polls(&polls, 6);
    assert_eq!(grabber.read().data[0], 5);
}

#[test]
fn test_read_blocks_while_device_never_delivers() {
    let grabber = Arc::new(
        FrameGrabber::with_backend(ScriptedBackend::never_ready(), GrabberSettings::default())
            .unwrap(),
    );

    let (tx, rx) = mpsc::channel();
    {
        let grabber = Arc::clone(&grabber);
        // Left blocked when the test ends
        thread::spawn(move || {
            let frame = grabber.read();
            let _ = tx.send(frame);
        });
    }

    let wait = capture_interval() * 10;
    assert!(rx.recv_timeout(wait).is_err(), "read() returned without a frame");
    assert!(grabber.read_timeout(capture_interval() * 3).is_none());
}

#[test]
fn test_blocked_read_wakes_when_frame_arrives() {
    // Roughly half a second of nothing, then a frame
    let mut script: Vec<Option<Frame>> = vec![None; 15];
    script.push(Some(uniform_frame(9)));
    let backend = ScriptedBackend::new(OpenBehavior::Opened, script);
    let grabber = FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap();

    let start = Instant::now();
    let frame = grabber.read();
    assert_eq!(frame.data[0], 9);
    assert!(start.elapsed() >= capture_interval() * 10);
}

#[test]
fn test_failed_capture_empties_slot_before_new_frame() {
    let mut script = vec![Some(uniform_frame(1))];
    script.extend(std::iter::repeat(None).take(30));
    script.push(Some(uniform_frame(2)));
    let backend = ScriptedBackend::new(OpenBehavior::Opened, script);
    let polls = backend.poll_counter();
    let grabber = FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap();

    // By the third poll the failure from poll two has cleared the slot
    wait_for_polls(&polls, 3);
    let during_outage = grabber.try_read();
    if polls.load(Ordering::SeqCst) < 30 {
        assert!(during_outage.is_none(), "stale frame visible after a failed capture");
    }

    // The next frame handed out is the new one, never the stale one
    let frame = grabber.read();
    assert_eq!(frame.data[0], 2);
}

#[test]
fn test_concurrent_readers_see_whole_frames() {
    let script = (0..10u8).map(|v| Some(uniform_frame(v * 20))).collect();
    let backend = ScriptedBackend::new(OpenBehavior::Opened, script).cycling();
    let grabber = Arc::new(FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap());

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let grabber = Arc::clone(&grabber);
            thread::spawn(move || {
                for _ in 0..25 {
                    let frame = grabber.read();
                    assert!(frame.is_complete());
                    let first = frame.data[0];
                    assert!(frame.data.iter().all(|&b| b == first), "torn frame");
                    thread::sleep(Duration::from_millis(3));
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().expect("reader panicked");
    }
}

#[test]
fn test_open_failure_starts_no_capture() {
    let backend = ScriptedBackend::new(OpenBehavior::Unavailable, vec![Some(uniform_frame(1))]);
    let polls = backend.poll_counter();

    let result = FrameGrabber::with_backend(backend, GrabberSettings::new(4));
    assert!(matches!(result, Err(CameraError::OpenFailed(_))));

    thread::sleep(capture_interval() * 3);
    assert_eq!(polls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_closed_device_uses_generic_open() {
    let backend = ScriptedBackend::new(
        OpenBehavior::NeedsGenericOpen,
        vec![Some(uniform_frame(77))],
    );
    let fallback = backend.generic_open_calls();
    let grabber = FrameGrabber::with_backend(backend, GrabberSettings::default()).unwrap();

    assert_eq!(grabber.read().data[0], 77);
    assert_eq!(fallback.load(Ordering::SeqCst), 1);
}

#[test]
fn test_snapshot_failure_does_not_fail_read() {
    let dir = TempDir::new().unwrap();
    let blocked = dir.path().join("blocked.png");
    std::fs::create_dir(&blocked).unwrap();

    let backend = ScriptedBackend::new(OpenBehavior::Opened, vec![Some(uniform_frame(5))]);
    let settings = GrabberSettings::new(0).with_snapshot(SnapshotPolicy::to_path(&blocked));
    let grabber = FrameGrabber::with_backend(backend, settings).unwrap();

    assert_eq!(grabber.read().data[0], 5);
    assert!(blocked.is_dir());
}
