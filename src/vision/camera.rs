use super::mat_to_frame;
use crate::{
    frame::{Frame, FrameSource},
    Error, Result,
};
use log::{info, warn};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};

/// Webcam capture through `OpenCV`
pub struct OpenCvCamera {
    capture: VideoCapture,
    index: i32,
}

impl OpenCvCamera {
    /// Open a camera and request a frame size
    ///
    /// # Errors
    ///
    /// Returns a `Camera` error if the device does not open
    pub fn open(index: i32, width: u32, height: u32) -> Result<Self> {
        info!("Opening camera {index}");
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::Camera(format!("Camera {index} could not be opened")));
        }

        capture.set(CAP_PROP_FRAME_WIDTH, f64::from(width))?;
        capture.set(CAP_PROP_FRAME_HEIGHT, f64::from(height))?;
        // Reduce buffer size for lower latency
        if !capture.set(CAP_PROP_BUFFERSIZE, 1.0)? {
            warn!("Camera {index} ignores the buffer size hint");
        }

        info!(
            "Camera {index} opened at {}x{}",
            capture.get(CAP_PROP_FRAME_WIDTH)?,
            capture.get(CAP_PROP_FRAME_HEIGHT)?
        );
        Ok(Self { capture, index })
    }
}

impl FrameSource for OpenCvCamera {
    fn read(&mut self) -> Result<Option<Frame>> {
        let mut mat = Mat::default();
        if !self.capture.read(&mut mat)? || mat.empty() {
            return Err(Error::Camera(format!("Camera {} returned no frame", self.index)));
        }
        mat_to_frame(&mat).map(Some)
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("Failed to release camera {}: {e}", self.index);
        }
    }
}
