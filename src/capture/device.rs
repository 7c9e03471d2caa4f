use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use thiserror::Error;

use super::frame::Frame;

/// Errors produced while opening or reading a camera.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The capture process could not be started.
    #[error("failed to spawn capture process")]
    Spawn(#[source] std::io::Error),
    /// The capture process exposed no stdout to read frames from.
    #[error("capture process has no stdout")]
    MissingStdout,
    /// The capture process stopped producing frames.
    #[error("camera stream ended")]
    StreamEnded,
    /// Reading raw frame bytes failed.
    #[error("failed to read frame from camera")]
    Read(#[source] std::io::Error),
}

/// A blocking source of raw frames.
///
/// Implementations are driven from a dedicated capture thread, so calls may
/// block for the duration of one frame.
pub trait VideoSource: Send {
    /// Read the next frame, blocking until one is available.
    fn read_frame(&mut self) -> Result<Frame, DeviceError>;

    /// Release the underlying device. Must be idempotent.
    fn release(&mut self);
}

/// Camera backed by an ffmpeg child process decoding a V4L2 device to raw
/// rgb24 on its stdout.
pub struct FfmpegCamera {
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    width: u32,
    height: u32,
}

impl FfmpegCamera {
    /// Spawn ffmpeg against `/dev/video{device_index}` and keep its stdout
    /// for frame reads.
    pub fn open(
        binary: &str,
        device_index: u32,
        width: u32,
        height: u32,
        framerate: u32,
    ) -> Result<Self, DeviceError> {
        let device = format!("/dev/video{device_index}");
        let mut child = Command::new(binary)
            .args(["-hide_banner", "-loglevel", "error"])
            .args(["-f", "v4l2"])
            .args(["-framerate", &framerate.to_string()])
            .args(["-video_size", &format!("{width}x{height}")])
            .args(["-i", &device])
            .args(["-f", "rawvideo"])
            .args(["-pix_fmt", "rgb24"])
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(DeviceError::Spawn)?;

        let stdout = child.stdout.take().ok_or(DeviceError::MissingStdout)?;

        Ok(Self {
            child: Some(child),
            stdout: Some(stdout),
            width,
            height,
        })
    }
}

impl VideoSource for FfmpegCamera {
    fn read_frame(&mut self) -> Result<Frame, DeviceError> {
        let stdout = self.stdout.as_mut().ok_or(DeviceError::StreamEnded)?;

        let mut rgb = vec![0u8; (self.width * self.height * 3) as usize];
        stdout.read_exact(&mut rgb).map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                DeviceError::StreamEnded
            } else {
                DeviceError::Read(err)
            }
        })?;

        Ok(Frame {
            width: self.width,
            height: self.height,
            rgb,
        })
    }

    fn release(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.release();
    }
}
