use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use indexmap::IndexMap;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use super::events::{GestureChange, GestureHub};
use crate::capture::{CaptureBackend, CaptureWorker, DeviceError};
use crate::config::FeedSlot;
use crate::error::ServiceError;
use crate::vision::Gesture;

/// One player's camera feed: its channels plus the worker driving them.
///
/// The channels outlive any single worker, so streams opened by clients
/// survive a camera restart.
pub struct Feed {
    player: u32,
    device_index: u32,
    gesture_tx: Arc<watch::Sender<Gesture>>,
    frame_tx: Arc<watch::Sender<Option<Bytes>>>,
    worker: Mutex<Option<CaptureWorker>>,
}

impl Feed {
    fn new(slot: &FeedSlot) -> Self {
        let (gesture_tx, _) = watch::channel(Gesture::None);
        let (frame_tx, _) = watch::channel(None);
        Self {
            player: slot.player,
            device_index: slot.device_index,
            gesture_tx: Arc::new(gesture_tx),
            frame_tx: Arc::new(frame_tx),
            worker: Mutex::new(None),
        }
    }

    /// Player this feed belongs to.
    pub fn player(&self) -> u32 {
        self.player
    }

    /// The most recently classified gesture.
    pub fn current_gesture(&self) -> Gesture {
        *self.gesture_tx.borrow()
    }

    /// Subscribe to encoded frames. `None` means the feed is not producing.
    pub fn frames(&self) -> watch::Receiver<Option<Bytes>> {
        self.frame_tx.subscribe()
    }

    /// Whether a capture worker is currently running for this feed.
    pub async fn is_live(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .map(CaptureWorker::is_running)
            .unwrap_or(false)
    }
}

/// Owns every camera feed and the hub their gesture events fan out on.
pub struct FeedRegistry {
    feeds: IndexMap<u32, Arc<Feed>>,
    backend: Arc<dyn CaptureBackend>,
    hub: GestureHub,
    interval: Duration,
}

impl FeedRegistry {
    /// Build the registry for the configured feed slots. No cameras are
    /// opened until [`FeedRegistry::start_all`].
    pub fn new(
        slots: &[FeedSlot],
        backend: Arc<dyn CaptureBackend>,
        event_capacity: usize,
        interval: Duration,
    ) -> Self {
        let feeds = slots
            .iter()
            .map(|slot| (slot.player, Arc::new(Feed::new(slot))))
            .collect();
        Self {
            feeds,
            backend,
            hub: GestureHub::new(event_capacity),
            interval,
        }
    }

    /// Hub carrying gesture change events from every feed.
    pub fn hub(&self) -> &GestureHub {
        &self.hub
    }

    /// Look up the feed of a player.
    pub fn feed(&self, player: u32) -> Result<Arc<Feed>, ServiceError> {
        self.feeds
            .get(&player)
            .cloned()
            .ok_or(ServiceError::UnknownFeed(player))
    }

    /// Iterate all feeds in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Feed>> {
        self.feeds.values()
    }

    /// Start a worker for every feed that has none.
    ///
    /// A feed whose camera cannot be opened is left degraded rather than
    /// failing startup; it can be brought up later with a restart.
    pub async fn start_all(&self) {
        for feed in self.feeds.values() {
            let mut slot = feed.worker.lock().await;
            if slot.is_some() {
                continue;
            }
            match self.spawn_worker(feed) {
                Ok(worker) => {
                    *slot = Some(worker);
                    info!(player = feed.player, "capture feed started");
                }
                Err(err) => warn!(player = feed.player, "capture feed unavailable: {err}"),
            }
        }
    }

    /// Stop every running worker and wait for the cameras to be released.
    pub async fn stop_all(&self) {
        for feed in self.feeds.values() {
            let worker = feed.worker.lock().await.take();
            if let Some(worker) = worker {
                let player = feed.player;
                if tokio::task::spawn_blocking(move || worker.stop_and_join())
                    .await
                    .is_err()
                {
                    warn!(player, "capture worker panicked during shutdown");
                }
            }
        }
    }

    /// Tear down one feed's worker and bring up a fresh one.
    ///
    /// The old worker is fully joined before the camera is reopened, so the
    /// device is never held twice. Concurrent restarts of the same feed are
    /// serialized by the worker slot lock.
    pub async fn restart(&self, player: u32) -> Result<(), ServiceError> {
        let feed = self.feed(player)?;
        let mut slot = feed.worker.lock().await;

        if let Some(worker) = slot.take() {
            if tokio::task::spawn_blocking(move || worker.stop_and_join())
                .await
                .is_err()
            {
                warn!(player, "capture worker panicked during restart");
            }
        }

        *slot = Some(self.spawn_worker(&feed)?);
        info!(player, "capture feed restarted");
        Ok(())
    }

    fn spawn_worker(&self, feed: &Feed) -> Result<CaptureWorker, ServiceError> {
        let device = self.backend.open_camera(feed.device_index)?;
        let model = match self.backend.load_pose_model() {
            Ok(model) => Some(model),
            Err(err) => {
                warn!(player = feed.player, "running without pose model: {err}");
                None
            }
        };

        CaptureWorker::spawn(
            feed.player,
            device,
            model,
            Arc::clone(&feed.gesture_tx),
            Arc::clone(&feed.frame_tx),
            self.hub.sender(),
            self.interval,
        )
        .map_err(|source| ServiceError::Camera(DeviceError::Spawn(source)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::capture::{Frame, HandPoseModel, PoseError, VideoSource};

    /// Camera that produces read errors until released, keeping its worker
    /// alive without real frames.
    struct IdleCamera {
        released: Arc<AtomicBool>,
    }

    impl VideoSource for IdleCamera {
        fn read_frame(&mut self) -> Result<Frame, DeviceError> {
            Err(DeviceError::Read(std::io::Error::other("no frame")))
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        opened: AtomicUsize,
        fail_open: AtomicBool,
        cameras: std::sync::Mutex<Vec<Arc<AtomicBool>>>,
    }

    impl FakeBackend {
        fn released_flags(&self) -> Vec<bool> {
            self.cameras
                .lock()
                .unwrap()
                .iter()
                .map(|flag| flag.load(Ordering::SeqCst))
                .collect()
        }
    }

    impl CaptureBackend for FakeBackend {
        fn open_camera(&self, _device_index: u32) -> Result<Box<dyn VideoSource>, DeviceError> {
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(DeviceError::Spawn(std::io::Error::other("no device")));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            let released = Arc::new(AtomicBool::new(false));
            self.cameras.lock().unwrap().push(Arc::clone(&released));
            Ok(Box::new(IdleCamera { released }))
        }

        fn load_pose_model(&self) -> Result<Box<dyn HandPoseModel>, PoseError> {
            Err(PoseError::Spawn(std::io::Error::other("no model")))
        }
    }

    fn registry_with(backend: Arc<FakeBackend>) -> FeedRegistry {
        let slots = vec![FeedSlot {
            player: 1,
            device_index: 0,
        }];
        FeedRegistry::new(&slots, backend, 16, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn restart_releases_old_camera_and_opens_new() {
        let backend = Arc::new(FakeBackend::default());
        let registry = registry_with(Arc::clone(&backend));

        registry.start_all().await;
        assert!(registry.feed(1).unwrap().is_live().await);
        assert_eq!(backend.opened.load(Ordering::SeqCst), 1);

        registry.restart(1).await.unwrap();

        assert_eq!(backend.opened.load(Ordering::SeqCst), 2);
        assert_eq!(backend.released_flags(), vec![true, false]);
        assert!(registry.feed(1).unwrap().is_live().await);
    }

    #[tokio::test]
    async fn failed_open_leaves_feed_degraded_but_readable() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_open.store(true, Ordering::SeqCst);
        let registry = registry_with(Arc::clone(&backend));

        registry.start_all().await;

        let feed = registry.feed(1).unwrap();
        assert!(!feed.is_live().await);
        assert_eq!(feed.current_gesture(), Gesture::None);
        assert!(feed.frames().borrow().is_none());

        // A later restart can bring the feed up once the device works.
        backend.fail_open.store(false, Ordering::SeqCst);
        registry.restart(1).await.unwrap();
        assert!(registry.feed(1).unwrap().is_live().await);
    }

    #[tokio::test]
    async fn restart_of_unknown_feed_is_an_error() {
        let backend = Arc::new(FakeBackend::default());
        let registry = registry_with(backend);

        let err = registry.restart(99).await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownFeed(99)));
    }

    #[tokio::test]
    async fn stop_all_releases_every_camera() {
        let backend = Arc::new(FakeBackend::default());
        let registry = registry_with(Arc::clone(&backend));

        registry.start_all().await;
        registry.stop_all().await;

        assert_eq!(backend.released_flags(), vec![true]);
        assert!(!registry.feed(1).unwrap().is_live().await);
    }
}
