use crate::{
    constants::NUM_HAND_LANDMARKS,
    frame::Frame,
    landmarks::{Landmark, LandmarkSet, LandmarkSource},
    Error, Result,
};
use image::{imageops, Rgb, RgbImage};
use log::{debug, info};
use ndarray::{Array4, CowArray};
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Square input size of the hand landmark model
const HAND_INPUT_SIZE: u32 = 224;

/// Joint pairs drawn as bones
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

const BONE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const JOINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Single-hand landmark detector using `ONNX` Runtime
///
/// Expects a model taking a `1x224x224x3` RGB tensor in `[0, 1]` and
/// returning 63 landmark coordinates in input pixels plus a hand presence
/// score.
pub struct OnnxHandDetector {
    session: Session,
    min_confidence: f32,
}

impl OnnxHandDetector {
    /// Load the model
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or has no outputs
    pub fn new<P: AsRef<Path>>(model_path: P, min_confidence: f32) -> Result<Self> {
        info!(
            "Initializing OnnxHandDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("hand_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.outputs.is_empty() {
            return Err(Error::ModelError("Model has no outputs".to_string()));
        }

        Ok(Self {
            session,
            min_confidence,
        })
    }

    /// Resize to the model input and build an NHWC tensor
    fn preprocess(frame: &Frame) -> Result<Array4<f32>> {
        let size = HAND_INPUT_SIZE as usize;
        let resized = imageops::resize(
            frame.image(),
            HAND_INPUT_SIZE,
            HAND_INPUT_SIZE,
            imageops::FilterType::Triangle,
        );
        let data: Vec<f32> = resized.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
        Array4::from_shape_vec((1, size, size, 3), data)
            .map_err(|e| Error::ModelError(format!("Failed to create input array: {e}")))
    }

    /// Run the model, returning flat landmark coordinates and the presence score
    fn forward(&self, input: Array4<f32>) -> Result<(Vec<f32>, Option<f32>)> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;
        let outputs = self.session.run(vec![input_tensor])?;

        let mut outputs = outputs.into_iter();
        let coords = outputs
            .next()
            .ok_or_else(|| Error::ModelError("No output from model".to_string()))?;
        let coords = coords.try_extract::<f32>()?;
        let coords = coords.view().iter().copied().collect();

        let mut score = None;
        if let Some(output) = outputs.next() {
            let tensor = output.try_extract::<f32>()?;
            score = tensor.view().iter().next().copied();
        }
        Ok((coords, score))
    }
}

/// Model-space coordinates to a normalized landmark set
fn to_landmarks(coords: &[f32]) -> Result<LandmarkSet> {
    if coords.len() < NUM_HAND_LANDMARKS * 3 {
        return Err(Error::ModelError(format!(
            "Expected {} landmark values, got {}",
            NUM_HAND_LANDMARKS * 3,
            coords.len()
        )));
    }
    let scale = f64::from(HAND_INPUT_SIZE);
    let points: Vec<Landmark> = coords
        .chunks_exact(3)
        .take(NUM_HAND_LANDMARKS)
        .map(|c| {
            Landmark::new(
                f64::from(c[0]) / scale,
                f64::from(c[1]) / scale,
                f64::from(c[2]) / scale,
            )
        })
        .collect();
    LandmarkSet::new(&points)
}

impl LandmarkSource for OnnxHandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>> {
        let input = Self::preprocess(frame)?;
        let (coords, score) = self.forward(input)?;

        if let Some(score) = score {
            if score < self.min_confidence {
                debug!("Hand presence {score:.2} below threshold");
                return Ok(None);
            }
        }
        to_landmarks(&coords).map(Some)
    }

    fn annotate(&mut self, frame: &mut Frame, hand: &LandmarkSet) -> Result<()> {
        let size = frame.size();
        let pixels: Vec<(f64, f64)> = hand.points().iter().map(|p| p.to_pixel(size)).collect();
        let image = frame.image_mut();

        for &(a, b) in &HAND_CONNECTIONS {
            draw_line(image, pixels[a], pixels[b], BONE_COLOR);
        }
        for &point in &pixels {
            draw_dot(image, point, 3, JOINT_COLOR);
        }
        Ok(())
    }

    fn close(&mut self) {
        info!("Hand detector closed");
    }
}

#[allow(clippy::cast_possible_truncation)] // bounds checked before the cast
fn put(image: &mut RgbImage, x: f64, y: f64, color: Rgb<u8>) {
    if x >= 0.0 && y >= 0.0 && x < f64::from(image.width()) && y < f64::from(image.height()) {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_dot(image: &mut RgbImage, (cx, cy): (f64, f64), radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(image, cx + f64::from(dx), cy + f64::from(dy), color);
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // short on-frame segments
fn draw_line(image: &mut RgbImage, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: Rgb<u8>) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
    if !steps.is_finite() {
        return;
    }
    for i in 0..=(steps as u32) {
        let t = f64::from(i) / steps;
        put(image, x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, color);
    }
}
