//! Hand landmark types and the landmark source interface.
//!
//! A [`LandmarkSet`] holds the 21 canonical hand joints reported by a hand
//! tracker, in normalized image coordinates (`x`, `y` in `[0, 1]`, `y` growing
//! downwards) plus a relative depth `z`. Pixel positions are obtained by
//! scaling with the frame the landmarks were detected on.

use crate::{
    constants::{
        INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, NUM_HAND_LANDMARKS, PINKY_PIP, PINKY_TIP,
        RING_PIP, RING_TIP, THUMB_TIP,
    },
    frame::{Frame, FrameSize},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// One tracked hand joint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position
    pub x: f64,
    /// Normalized vertical position (0 = top of frame)
    pub y: f64,
    /// Relative depth estimate
    pub z: f64,
}

impl Landmark {
    /// Create a landmark from normalized coordinates
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Project onto a frame, truncating to whole pixels
    #[must_use]
    pub fn to_pixel(&self, size: FrameSize) -> (f64, f64) {
        (
            (self.x * f64::from(size.width)).trunc(),
            (self.y * f64::from(size.height)).trunc(),
        )
    }
}

/// Finger names usable in gesture definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
    /// A name the tracker has no joint for; gestures using it never fire
    #[serde(other)]
    Unknown,
}

impl Finger {
    /// Landmark index of the fingertip
    #[must_use]
    pub const fn tip(self) -> Option<usize> {
        match self {
            Self::Thumb => Some(THUMB_TIP),
            Self::Index => Some(INDEX_TIP),
            Self::Middle => Some(MIDDLE_TIP),
            Self::Ring => Some(RING_TIP),
            Self::Pinky => Some(PINKY_TIP),
            Self::Unknown => None,
        }
    }

    /// Landmark index of the proximal interphalangeal joint
    #[must_use]
    pub const fn pip(self) -> Option<usize> {
        match self {
            Self::Index => Some(INDEX_PIP),
            Self::Middle => Some(MIDDLE_PIP),
            Self::Ring => Some(RING_PIP),
            Self::Pinky => Some(PINKY_PIP),
            Self::Thumb | Self::Unknown => None,
        }
    }
}

/// The 21 landmarks of one detected hand
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; NUM_HAND_LANDMARKS],
}

impl LandmarkSet {
    /// Build a set from exactly 21 points ordered by joint index
    ///
    /// # Errors
    ///
    /// Returns an error if the slice does not hold exactly 21 points
    pub fn new(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; NUM_HAND_LANDMARKS] = points.try_into().map_err(|_| {
            Error::InvalidInput(format!(
                "Expected {NUM_HAND_LANDMARKS} hand landmarks, got {}",
                points.len()
            ))
        })?;
        Ok(Self { points })
    }

    /// Build a set from `(index, x, y, z)` tuples in any order
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of range, repeated, or missing
    pub fn from_indexed(entries: &[(usize, f64, f64, f64)]) -> Result<Self> {
        let mut points = [Landmark::default(); NUM_HAND_LANDMARKS];
        let mut seen = [false; NUM_HAND_LANDMARKS];
        for &(index, x, y, z) in entries {
            let slot = seen.get_mut(index).ok_or_else(|| {
                Error::InvalidInput(format!("Landmark index {index} out of range"))
            })?;
            if *slot {
                return Err(Error::InvalidInput(format!("Duplicate landmark index {index}")));
            }
            *slot = true;
            points[index] = Landmark::new(x, y, z);
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(Error::InvalidInput(format!("Missing landmark index {missing}")));
        }
        Ok(Self { points })
    }

    /// Landmark by joint index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// All landmarks in joint order
    #[must_use]
    pub const fn points(&self) -> &[Landmark; NUM_HAND_LANDMARKS] {
        &self.points
    }

    /// Mutable access for trackers and tests that perturb single joints
    pub fn point_mut(&mut self, index: usize) -> Option<&mut Landmark> {
        self.points.get_mut(index)
    }

    /// Pixel distance between two joints on a frame of the given size
    #[must_use]
    pub fn pixel_distance(&self, a: usize, b: usize, size: FrameSize) -> Option<f64> {
        let (x1, y1) = self.get(a)?.to_pixel(size);
        let (x2, y2) = self.get(b)?.to_pixel(size);
        Some((x1 - x2).hypot(y1 - y2))
    }

    /// Mean position of all joints, in whole pixels
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // 21 points
    pub fn centroid(&self, size: FrameSize) -> (f64, f64) {
        let n = self.points.len() as f64;
        let mean_x = self.points.iter().map(|p| p.x).sum::<f64>() / n;
        let mean_y = self.points.iter().map(|p| p.y).sum::<f64>() / n;
        (
            (mean_x * f64::from(size.width)).trunc(),
            (mean_y * f64::from(size.height)).trunc(),
        )
    }
}

/// Per-frame hand tracker
///
/// Implementations wrap a detection model; the pipeline calls `detect` once
/// per processed frame and `annotate` only when a hand was found.
pub trait LandmarkSource: Send {
    /// Find the tracked hand in a frame
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails; the caller treats it as "no hand"
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>>;

    /// Draw the hand overlay onto the frame
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails; the frame is still rendered
    fn annotate(&mut self, frame: &mut Frame, hand: &LandmarkSet) -> Result<()>;

    /// Release model resources
    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand(x: f64, y: f64) -> LandmarkSet {
        LandmarkSet::new(&[Landmark::new(x, y, 0.0); NUM_HAND_LANDMARKS]).unwrap()
    }

    #[test]
    fn test_wrong_landmark_count() {
        let result = LandmarkSet::new(&[Landmark::default(); 20]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_from_indexed_requires_every_joint() {
        let mut entries: Vec<_> = (0..NUM_HAND_LANDMARKS).map(|i| (i, 0.5, 0.5, 0.0)).collect();
        assert!(LandmarkSet::from_indexed(&entries).is_ok());

        entries.pop();
        assert!(LandmarkSet::from_indexed(&entries).is_err());

        entries.push((3, 0.1, 0.1, 0.0));
        assert!(LandmarkSet::from_indexed(&entries).is_err());

        entries.pop();
        entries.push((21, 0.1, 0.1, 0.0));
        assert!(LandmarkSet::from_indexed(&entries).is_err());
    }

    #[test]
    fn test_pixel_projection_truncates() {
        let size = FrameSize::new(640, 480);
        let lm = Landmark::new(0.50078, 0.25, 0.0);
        assert_eq!(lm.to_pixel(size), (320.0, 120.0));
    }

    #[test]
    fn test_centroid() {
        let hand = flat_hand(0.25, 0.5);
        assert_eq!(hand.centroid(FrameSize::new(640, 480)), (160.0, 240.0));
    }

    #[test]
    fn test_pixel_distance() {
        let mut hand = flat_hand(0.5, 0.5);
        hand.point_mut(THUMB_TIP).unwrap().x = 0.5 + 30.0 / 640.0;
        hand.point_mut(THUMB_TIP).unwrap().y = 0.5 + 40.0 / 480.0;
        let d = hand.pixel_distance(THUMB_TIP, INDEX_TIP, FrameSize::new(640, 480)).unwrap();
        assert!((d - 50.0).abs() < 1.0 + 1e-9);
        assert!(hand.pixel_distance(THUMB_TIP, 42, FrameSize::new(640, 480)).is_none());
    }

    #[test]
    fn test_finger_joints() {
        assert_eq!(Finger::Thumb.tip(), Some(THUMB_TIP));
        assert_eq!(Finger::Thumb.pip(), None);
        assert_eq!(Finger::Ring.pip(), Some(RING_PIP));
        assert_eq!(Finger::Unknown.tip(), None);
    }

    #[test]
    fn test_unknown_finger_name_parses() {
        let fingers: Vec<Finger> = serde_json::from_str(r#"["thumb", "elbow"]"#).unwrap();
        assert_eq!(fingers, vec![Finger::Thumb, Finger::Unknown]);
    }
}
