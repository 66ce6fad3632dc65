//! Camera, hand landmark model and window backed by `OpenCV` and ONNX Runtime.
//!
//! Only built with the `vision` feature.

/// `OpenCV` video capture as a frame source
pub mod camera;

/// Hand landmark detection via an ONNX model
pub mod hand_detection;

/// `OpenCV` highgui window
pub mod display;

pub use camera::OpenCvCamera;
pub use display::HighGuiDisplay;
pub use hand_detection::OnnxHandDetector;

use crate::{frame::Frame, utils::safe_cast::u32_to_i32, Error, Result};
use opencv::{
    core::{Mat, Scalar, CV_8UC3},
    imgproc,
    prelude::*,
};

/// Convert an `OpenCV` BGR image into an RGB frame
///
/// # Errors
///
/// Returns an error if the Mat is empty or not 8-bit 3-channel
#[allow(clippy::cast_sign_loss)] // checked positive
pub fn mat_to_frame(bgr: &Mat) -> Result<Frame> {
    let (rows, cols) = (bgr.rows(), bgr.cols());
    if rows <= 0 || cols <= 0 || bgr.typ() != CV_8UC3 {
        return Err(Error::InvalidInput(format!(
            "Expected a non-empty 8-bit BGR image, got {cols}x{rows} type {}",
            bgr.typ()
        )));
    }

    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let bytes = rgb.data_bytes()?.to_vec();
    Frame::from_rgb_bytes(crate::frame::FrameSize::new(cols as u32, rows as u32), bytes)
}

/// Convert an RGB frame into an `OpenCV` BGR image
///
/// # Errors
///
/// Returns an error if the frame is too large for `OpenCV` or a conversion fails
pub fn frame_to_mat(frame: &Frame) -> Result<Mat> {
    let size = frame.size();
    let mut rgb = Mat::new_rows_cols_with_default(
        u32_to_i32(size.height)?,
        u32_to_i32(size.width)?,
        CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.image().as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

/// RGB colour as an `OpenCV` BGR scalar
#[must_use]
pub fn bgr_scalar(color: [u8; 3]) -> Scalar {
    Scalar::new(
        f64::from(color[2]),
        f64::from(color[1]),
        f64::from(color[0]),
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameSize;
    use image::Rgb;

    #[test]
    fn test_frame_mat_roundtrip_keeps_channel_order() {
        let mut frame = Frame::blank(FrameSize::new(4, 2));
        frame.image_mut().put_pixel(1, 1, Rgb([200, 10, 30]));

        let mat = frame_to_mat(&frame).unwrap();
        let bgr = *mat.at_2d::<opencv::core::Vec3b>(1, 1).unwrap();
        assert_eq!((bgr[0], bgr[1], bgr[2]), (30, 10, 200));

        let back = mat_to_frame(&mat).unwrap();
        assert_eq!(back.image().get_pixel(1, 1), &Rgb([200, 10, 30]));
    }

    #[test]
    fn test_bgr_scalar() {
        let s = bgr_scalar([1, 2, 3]);
        assert_eq!((s[0], s[1], s[2]), (3.0, 2.0, 1.0));
    }
}
