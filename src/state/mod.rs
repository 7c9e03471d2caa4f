pub mod events;
pub mod feeds;

use std::path::PathBuf;
use std::sync::Arc;

use crate::capture::CaptureBackend;
use crate::config::AppConfig;
use crate::dao::{LeaderboardStore, PatternStore};
use crate::songs::acquire::AcquisitionPipeline;
use crate::songs::analyze::AudioAnalyzer;
use crate::songs::provider::TrackProvider;

pub use self::events::{GestureChange, GestureHub};
pub use self::feeds::{Feed, FeedRegistry};

pub type SharedState = Arc<AppState>;

/// Capacity of the gesture event broadcast channel.
pub const EVENT_CAPACITY: usize = 16;

/// File the gesture charts are stored in, inside the media directory.
const PATTERNS_FILE: &str = "patterns.json";
/// File the leaderboard is stored in, inside the data directory.
const LEADERBOARD_FILE: &str = "leaderboard.json";

/// Central application state owning the camera feeds, the song pipeline and
/// the on-disk stores.
pub struct AppState {
    config: AppConfig,
    feeds: FeedRegistry,
    pipeline: AcquisitionPipeline,
    patterns: PatternStore,
    leaderboard: LeaderboardStore,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Cameras are not opened here; call [`FeedRegistry::start_all`] once the
    /// rest of startup has succeeded.
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn CaptureBackend>,
        provider: Box<dyn TrackProvider>,
        analyzer: Box<dyn AudioAnalyzer>,
    ) -> SharedState {
        let media_dir = PathBuf::from(&config.songs.media_dir);
        let data_dir = PathBuf::from(&config.songs.data_dir);

        let feeds = FeedRegistry::new(
            &config.capture.feeds,
            backend,
            EVENT_CAPACITY,
            config.capture.interval(),
        );
        let pipeline = AcquisitionPipeline::new(
            media_dir.clone(),
            config.songs.audio_format.clone(),
            provider,
            analyzer,
        );
        let patterns = PatternStore::new(media_dir.join(PATTERNS_FILE));
        let leaderboard = LeaderboardStore::new(data_dir.join(LEADERBOARD_FILE));

        Arc::new(Self {
            config,
            feeds,
            pipeline,
            patterns,
            leaderboard,
        })
    }

    /// Application configuration as loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of camera feeds.
    pub fn feeds(&self) -> &FeedRegistry {
        &self.feeds
    }

    /// Song acquisition pipeline.
    pub fn pipeline(&self) -> &AcquisitionPipeline {
        &self.pipeline
    }

    /// Store of generated gesture charts.
    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    /// Store of the top scores.
    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.leaderboard
    }
}
