//! Frame buffers and the capture source interface.

use crate::{Error, Result};
use image::{imageops, RgbImage};

/// Pixel dimensions of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An owned RGB image travelling through the pipeline
///
/// Frames are moved, never shared: each queue hop transfers ownership.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap an RGB image
    #[must_use]
    pub const fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Black frame of the given size
    #[must_use]
    pub fn blank(size: FrameSize) -> Self {
        Self::new(RgbImage::new(size.width, size.height))
    }

    /// Build a frame from packed RGB bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not match the dimensions
    pub fn from_rgb_bytes(size: FrameSize, bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        RgbImage::from_raw(size.width, size.height, bytes)
            .map(Self::new)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "RGB buffer of {len} bytes does not fit {}x{}",
                    size.width, size.height
                ))
            })
    }

    #[must_use]
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.image.width(), self.image.height())
    }

    #[must_use]
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Mirror horizontally so on-screen motion matches hand motion
    #[must_use]
    pub fn mirrored(mut self) -> Self {
        imageops::flip_horizontal_in_place(&mut self.image);
        self
    }

    /// Centered digital zoom
    ///
    /// The image is scaled up by `scale` and cropped back to its original
    /// dimensions around the center. Scales at or below 1.0 leave the frame
    /// untouched.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // scale >= 1 and finite
    pub fn zoomed(self, scale: f64) -> Self {
        if !scale.is_finite() || scale <= 1.0 {
            return self;
        }
        let FrameSize { width, height } = self.size();
        if width == 0 || height == 0 {
            return self;
        }

        let new_width = (f64::from(width) * scale).round() as u32;
        let new_height = (f64::from(height) * scale).round() as u32;
        let resized = imageops::resize(&self.image, new_width, new_height, imageops::FilterType::Triangle);

        let (x, y) = centered_crop_origin(new_width, new_height, width, height);
        Self::new(imageops::crop_imm(&resized, x, y, width, height).to_image())
    }
}

/// Top-left corner of a `(width, height)` window centered in `(outer_w, outer_h)`
#[must_use]
pub const fn centered_crop_origin(outer_w: u32, outer_h: u32, width: u32, height: u32) -> (u32, u32) {
    (
        (outer_w / 2).saturating_sub(width / 2),
        (outer_h / 2).saturating_sub(height / 2),
    )
}

/// Camera or other frame producer, driven by the capture thread
pub trait FrameSource: Send {
    /// Read the next frame
    ///
    /// `Ok(None)` means the source is exhausted and capture should end.
    ///
    /// # Errors
    ///
    /// Returns an error for a transient read failure; the capture loop logs
    /// it and keeps reading.
    fn read(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying device
    fn release(&mut self);
}
