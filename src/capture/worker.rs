use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::device::{DeviceError, VideoSource};
use super::pose::HandPoseModel;
use crate::state::events::GestureChange;
use crate::vision::{Gesture, classify};

/// Handle over one running capture thread.
///
/// The thread owns the camera and the pose model; the handle only carries
/// the stop flag and the join handle, so shutting a feed down is the only
/// way to get the device back to a releasable state.
pub struct CaptureWorker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl CaptureWorker {
    /// Start the capture thread for one player feed.
    ///
    /// Every processed frame updates `gesture_tx` and `frame_tx`; gesture
    /// transitions additionally go out on `events`. The senders are shared
    /// so a replacement worker keeps publishing to the same subscribers.
    pub fn spawn(
        player: u32,
        device: Box<dyn VideoSource>,
        model: Option<Box<dyn HandPoseModel>>,
        gesture_tx: Arc<watch::Sender<Gesture>>,
        frame_tx: Arc<watch::Sender<Option<Bytes>>>,
        events: broadcast::Sender<GestureChange>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(format!("capture-feed-{player}"))
            .spawn(move || {
                run_loop(
                    player,
                    device,
                    model,
                    gesture_tx,
                    frame_tx,
                    events,
                    interval,
                    thread_stop,
                );
            })?;

        Ok(Self { stop, handle })
    }

    /// Whether the capture thread is still running.
    ///
    /// A worker whose camera stream ended winds itself down, so a handle can
    /// outlive its thread.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Ask the thread to stop and wait until the device is released.
    pub fn stop_and_join(self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.handle.join().is_err() {
            warn!("capture thread panicked while stopping");
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_loop(
    player: u32,
    mut device: Box<dyn VideoSource>,
    mut model: Option<Box<dyn HandPoseModel>>,
    gesture_tx: Arc<watch::Sender<Gesture>>,
    frame_tx: Arc<watch::Sender<Option<Bytes>>>,
    events: broadcast::Sender<GestureChange>,
    interval: Duration,
    stop: Arc<AtomicBool>,
) {
    let mut last = Gesture::None;

    while !stop.load(Ordering::Relaxed) {
        let frame = match device.read_frame() {
            Ok(frame) => frame,
            Err(DeviceError::StreamEnded) => {
                warn!(player, "camera stream ended, stopping feed");
                break;
            }
            Err(err) => {
                warn!(player, "failed to read frame: {err}");
                thread::sleep(interval);
                continue;
            }
        };

        let frame = match frame.normalize() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(player, "dropping malformed frame: {err}");
                continue;
            }
        };

        let skeletons = model
            .as_mut()
            .map(|model| model.infer(&frame))
            .unwrap_or_default();
        let gesture = classify(skeletons.first());

        gesture_tx.send_replace(gesture);
        if gesture != last {
            let _ = events.send(GestureChange { player, gesture });
            last = gesture;
        }

        match frame.encode_jpeg() {
            Ok(jpeg) => {
                frame_tx.send_replace(Some(jpeg));
            }
            Err(err) => warn!(player, "failed to encode frame: {err}"),
        }

        thread::sleep(interval);
    }

    device.release();
    gesture_tx.send_replace(Gesture::None);
    frame_tx.send_replace(None);
    if last != Gesture::None {
        let _ = events.send(GestureChange {
            player,
            gesture: Gesture::None,
        });
    }
    info!(player, "capture feed stopped");
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::capture::frame::{FRAME_HEIGHT, FRAME_WIDTH, Frame};
    use crate::vision::HandSkeleton;
    use crate::vision::skeleton::{KEYPOINT_COUNT, Keypoint, landmarks};

    struct FakeDevice {
        frames: VecDeque<Frame>,
        released: Arc<AtomicBool>,
    }

    impl VideoSource for FakeDevice {
        fn read_frame(&mut self) -> Result<Frame, DeviceError> {
            self.frames.pop_front().ok_or(DeviceError::StreamEnded)
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::Relaxed);
        }
    }

    struct FakeModel {
        responses: VecDeque<Vec<HandSkeleton>>,
    }

    impl HandPoseModel for FakeModel {
        fn infer(&mut self, _frame: &Frame) -> Vec<HandSkeleton> {
            self.responses.pop_front().unwrap_or_default()
        }
    }

    fn blank_frame() -> Frame {
        Frame {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            rgb: vec![0; (FRAME_WIDTH * FRAME_HEIGHT * 3) as usize],
        }
    }

    fn fist_skeleton() -> HandSkeleton {
        let mut keypoints = [Keypoint::default(); KEYPOINT_COUNT];
        for knuckle in [
            landmarks::INDEX_FINGER_MCP,
            landmarks::MIDDLE_FINGER_MCP,
            landmarks::RING_FINGER_MCP,
            landmarks::PINKY_MCP,
        ] {
            keypoints[knuckle].y = 0.5;
        }
        for tip in [
            landmarks::INDEX_FINGER_TIP,
            landmarks::MIDDLE_FINGER_TIP,
            landmarks::RING_FINGER_TIP,
            landmarks::PINKY_TIP,
        ] {
            keypoints[tip].y = 0.7;
        }
        HandSkeleton { keypoints }
    }

    fn open_hand_skeleton() -> HandSkeleton {
        let mut skeleton = fist_skeleton();
        for tip in [
            landmarks::INDEX_FINGER_TIP,
            landmarks::MIDDLE_FINGER_TIP,
            landmarks::RING_FINGER_TIP,
            landmarks::PINKY_TIP,
        ] {
            skeleton.keypoints[tip].y = 0.3;
        }
        skeleton
    }

    /// Let the loop drain the fake device, then reap the finished thread.
    fn wait_and_join(worker: CaptureWorker, released: &AtomicBool) {
        while !released.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(1));
        }
        worker.stop_and_join();
    }

    #[test]
    fn worker_publishes_changes_only_and_releases_device() {
        let released = Arc::new(AtomicBool::new(false));
        let device = Box::new(FakeDevice {
            frames: VecDeque::from([blank_frame(), blank_frame(), blank_frame()]),
            released: Arc::clone(&released),
        });
        let model = Box::new(FakeModel {
            responses: VecDeque::from([
                vec![fist_skeleton()],
                vec![fist_skeleton()],
                vec![open_hand_skeleton()],
            ]),
        });

        let (gesture_tx, gesture_rx) = watch::channel(Gesture::None);
        let (frame_tx, frame_rx) = watch::channel(None);
        let (events, mut events_rx) = broadcast::channel(16);

        let worker = CaptureWorker::spawn(
            1,
            device,
            Some(model),
            Arc::new(gesture_tx),
            Arc::new(frame_tx),
            events,
            Duration::from_millis(1),
        )
        .unwrap();

        // The fourth read hits StreamEnded and the loop winds itself down.
        wait_and_join(worker, &released);

        assert_eq!(*gesture_rx.borrow(), Gesture::None);
        assert!(frame_rx.borrow().is_none());

        let mut seen = Vec::new();
        while let Ok(event) = events_rx.try_recv() {
            seen.push(event.gesture);
        }
        // Repeated fist frames collapse into one event; the trailing reset
        // comes from the shutdown path.
        assert_eq!(seen, vec![Gesture::Fist, Gesture::OpenHand, Gesture::None]);
    }

    #[test]
    fn worker_without_model_reports_no_gesture() {
        let released = Arc::new(AtomicBool::new(false));
        let device = Box::new(FakeDevice {
            frames: VecDeque::from([blank_frame()]),
            released: Arc::clone(&released),
        });

        let (gesture_tx, gesture_rx) = watch::channel(Gesture::None);
        let (frame_tx, _frame_rx) = watch::channel(None);
        let (events, mut events_rx) = broadcast::channel(16);

        let worker = CaptureWorker::spawn(
            2,
            device,
            None,
            Arc::new(gesture_tx),
            Arc::new(frame_tx),
            events,
            Duration::from_millis(1),
        )
        .unwrap();

        wait_and_join(worker, &released);

        assert_eq!(*gesture_rx.borrow(), Gesture::None);
        assert!(events_rx.try_recv().is_err());
    }
}
