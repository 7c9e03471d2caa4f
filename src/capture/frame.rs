use bytes::Bytes;
use image::imageops::{self, FilterType};
use image::{ImageOutputFormat, RgbImage};
use thiserror::Error;

/// Width every frame is normalized to before classification and streaming.
pub const FRAME_WIDTH: u32 = 640;
/// Height every frame is normalized to before classification and streaming.
pub const FRAME_HEIGHT: u32 = 480;

const JPEG_QUALITY: u8 = 80;

/// Errors produced while shaping or encoding a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The raw buffer does not hold `width * height` RGB pixels.
    #[error("frame buffer does not match {width}x{height} rgb24 ({got} bytes)")]
    BufferSize {
        /// Declared frame width.
        width: u32,
        /// Declared frame height.
        height: u32,
        /// Actual buffer length in bytes.
        got: usize,
    },
    /// JPEG encoding failed.
    #[error("failed to encode frame as jpeg")]
    Encode(#[from] image::ImageError),
}

/// One raw RGB frame read from a camera, before mirroring and resizing.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Tightly packed rgb24 pixel data, row-major.
    pub rgb: Vec<u8>,
}

impl Frame {
    /// Mirror the frame horizontally and resize it to the canonical
    /// [`FRAME_WIDTH`] x [`FRAME_HEIGHT`] shape.
    ///
    /// Mirroring happens unconditionally so the player sees themselves the
    /// way a mirror would show them.
    pub fn normalize(self) -> Result<Frame, FrameError> {
        let Frame { width, height, rgb } = self;
        let got = rgb.len();
        let image = RgbImage::from_raw(width, height, rgb)
            .ok_or(FrameError::BufferSize { width, height, got })?;

        let mirrored = imageops::flip_horizontal(&image);
        let shaped = if mirrored.dimensions() == (FRAME_WIDTH, FRAME_HEIGHT) {
            mirrored
        } else {
            imageops::resize(&mirrored, FRAME_WIDTH, FRAME_HEIGHT, FilterType::Triangle)
        };

        Ok(Frame {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            rgb: shaped.into_raw(),
        })
    }

    /// Encode the frame as a JPEG suitable for an MJPEG part.
    pub fn encode_jpeg(&self) -> Result<Bytes, FrameError> {
        let got = self.rgb.len();
        let image = RgbImage::from_raw(self.width, self.height, self.rgb.clone()).ok_or(
            FrameError::BufferSize {
                width: self.width,
                height: self.height,
                got,
            },
        )?;

        let mut encoded = Vec::new();
        image.write_to(
            &mut std::io::Cursor::new(&mut encoded),
            ImageOutputFormat::Jpeg(JPEG_QUALITY),
        )?;
        Ok(Bytes::from(encoded))
    }
}
