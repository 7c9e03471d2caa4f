//! Camera capture: device access, pose inference and the per-feed worker loop.

pub mod device;
pub mod frame;
pub mod pose;
pub mod worker;

pub use self::device::{DeviceError, FfmpegCamera, VideoSource};
pub use self::frame::{FRAME_HEIGHT, FRAME_WIDTH, Frame, FrameError};
pub use self::pose::{HandPoseModel, LandmarkBridge, PoseError};
pub use self::worker::CaptureWorker;

use crate::config::CaptureConfig;

/// Factory for the capture-side resources a feed needs.
///
/// Feeds go through this trait instead of spawning processes themselves so
/// tests can substitute in-memory cameras and models.
pub trait CaptureBackend: Send + Sync {
    /// Open the camera at the given V4L2 device index.
    fn open_camera(&self, device_index: u32) -> Result<Box<dyn VideoSource>, DeviceError>;

    /// Load a fresh pose model instance.
    fn load_pose_model(&self) -> Result<Box<dyn HandPoseModel>, PoseError>;
}

/// Production backend wiring [`FfmpegCamera`] and [`LandmarkBridge`] together.
pub struct FfmpegBackend {
    ffmpeg: String,
    capture: CaptureConfig,
}

impl FfmpegBackend {
    /// Build a backend from the configured binaries and frame geometry.
    pub fn new(ffmpeg: String, capture: CaptureConfig) -> Self {
        Self { ffmpeg, capture }
    }
}

impl CaptureBackend for FfmpegBackend {
    fn open_camera(&self, device_index: u32) -> Result<Box<dyn VideoSource>, DeviceError> {
        let camera = FfmpegCamera::open(
            &self.ffmpeg,
            device_index,
            self.capture.frame_width,
            self.capture.frame_height,
            self.capture.framerate,
        )?;
        Ok(Box::new(camera))
    }

    fn load_pose_model(&self) -> Result<Box<dyn HandPoseModel>, PoseError> {
        let bridge = LandmarkBridge::spawn(&self.capture.python_binary, &self.capture.pose_script)?;
        Ok(Box::new(bridge))
    }
}
