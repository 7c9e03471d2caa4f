//! Application-level configuration loading: capture geometry, feed slots and
//! song pipeline settings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WAVEBEAT_BACK_CONFIG_PATH";

const DEFAULT_FRAME_WIDTH: u32 = 640;
const DEFAULT_FRAME_HEIGHT: u32 = 480;
const DEFAULT_FRAMERATE: u32 = 30;
const DEFAULT_INTERVAL_MS: u64 = 30;
const DEFAULT_PYTHON_BINARY: &str = "python3";
const DEFAULT_POSE_SCRIPT: &str = "scripts/hand_landmarks.py";
const DEFAULT_MEDIA_DIR: &str = "static/songs";
const DEFAULT_DATA_DIR: &str = "static";
const DEFAULT_PROVIDER_BINARY: &str = "yt-dlp";
const DEFAULT_SEARCH_LIMIT: usize = 5;
const DEFAULT_THROTTLE_MS: u64 = 1000;
const DEFAULT_AUDIO_FORMAT: &str = "mp3";
const DEFAULT_AUDIO_QUALITY: &str = "192K";
const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// ffmpeg binary used for both capture and audio decoding.
    pub ffmpeg_binary: String,
    /// Camera capture settings.
    pub capture: CaptureConfig,
    /// Song pipeline settings.
    pub songs: SongsConfig,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        feeds = app_config.capture.feeds.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: DEFAULT_FFMPEG_BINARY.to_owned(),
            capture: CaptureConfig::default(),
            songs: SongsConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
/// Camera and capture loop settings.
pub struct CaptureConfig {
    /// Player feeds to open at startup.
    pub feeds: Vec<FeedSlot>,
    /// Width frames are captured at.
    pub frame_width: u32,
    /// Height frames are captured at.
    pub frame_height: u32,
    /// Camera frame rate requested from the device.
    pub framerate: u32,
    /// Pause between capture loop iterations, in milliseconds.
    pub interval_ms: u64,
    /// Python interpreter running the pose sidecar.
    pub python_binary: String,
    /// Path of the pose sidecar script.
    pub pose_script: PathBuf,
}

impl CaptureConfig {
    /// Capture loop pause as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            feeds: vec![FeedSlot {
                player: 1,
                device_index: 0,
            }],
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            framerate: DEFAULT_FRAMERATE,
            interval_ms: DEFAULT_INTERVAL_MS,
            python_binary: DEFAULT_PYTHON_BINARY.to_owned(),
            pose_script: PathBuf::from(DEFAULT_POSE_SCRIPT),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// One player's camera assignment.
pub struct FeedSlot {
    /// Player number the feed belongs to.
    pub player: u32,
    /// V4L2 device index the camera lives at.
    #[serde(default)]
    pub device_index: u32,
}

#[derive(Debug, Clone)]
/// Song download and analysis settings.
pub struct SongsConfig {
    /// Directory downloaded audio and charts are stored in.
    pub media_dir: String,
    /// Directory the leaderboard is stored in.
    pub data_dir: String,
    /// Track provider binary.
    pub provider_binary: String,
    /// Maximum number of search results to return.
    pub search_limit: usize,
    /// Pause before each provider call, in milliseconds.
    pub throttle_ms: u64,
    /// Audio format downloads are transcoded to.
    pub audio_format: String,
    /// Audio quality passed to the provider.
    pub audio_quality: String,
}

impl SongsConfig {
    /// Provider call throttle as a [`Duration`].
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl Default for SongsConfig {
    fn default() -> Self {
        Self {
            media_dir: DEFAULT_MEDIA_DIR.to_owned(),
            data_dir: DEFAULT_DATA_DIR.to_owned(),
            provider_binary: DEFAULT_PROVIDER_BINARY.to_owned(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            throttle_ms: DEFAULT_THROTTLE_MS,
            audio_format: DEFAULT_AUDIO_FORMAT.to_owned(),
            audio_quality: DEFAULT_AUDIO_QUALITY.to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    ffmpeg_binary: Option<String>,
    capture: Option<RawCapture>,
    songs: Option<RawSongs>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            ffmpeg_binary: value
                .ffmpeg_binary
                .unwrap_or_else(|| DEFAULT_FFMPEG_BINARY.to_owned()),
            capture: value.capture.map(Into::into).unwrap_or_default(),
            songs: value.songs.map(Into::into).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the capture section.
struct RawCapture {
    feeds: Option<Vec<FeedSlot>>,
    frame_width: Option<u32>,
    frame_height: Option<u32>,
    framerate: Option<u32>,
    interval_ms: Option<u64>,
    python_binary: Option<String>,
    pose_script: Option<PathBuf>,
}

impl From<RawCapture> for CaptureConfig {
    fn from(value: RawCapture) -> Self {
        let defaults = CaptureConfig::default();
        Self {
            feeds: value.feeds.unwrap_or(defaults.feeds),
            frame_width: value.frame_width.unwrap_or(defaults.frame_width),
            frame_height: value.frame_height.unwrap_or(defaults.frame_height),
            framerate: value.framerate.unwrap_or(defaults.framerate),
            interval_ms: value.interval_ms.unwrap_or(defaults.interval_ms),
            python_binary: value.python_binary.unwrap_or(defaults.python_binary),
            pose_script: value.pose_script.unwrap_or(defaults.pose_script),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the songs section.
struct RawSongs {
    media_dir: Option<String>,
    data_dir: Option<String>,
    provider_binary: Option<String>,
    search_limit: Option<usize>,
    throttle_ms: Option<u64>,
    audio_format: Option<String>,
    audio_quality: Option<String>,
}

impl From<RawSongs> for SongsConfig {
    fn from(value: RawSongs) -> Self {
        let defaults = SongsConfig::default();
        Self {
            media_dir: value.media_dir.unwrap_or(defaults.media_dir),
            data_dir: value.data_dir.unwrap_or(defaults.data_dir),
            provider_binary: value.provider_binary.unwrap_or(defaults.provider_binary),
            search_limit: value.search_limit.unwrap_or(defaults.search_limit),
            throttle_ms: value.throttle_ms.unwrap_or(defaults.throttle_ms),
            audio_format: value.audio_format.unwrap_or(defaults.audio_format),
            audio_quality: value.audio_quality.unwrap_or(defaults.audio_quality),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
