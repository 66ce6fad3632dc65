//! Gesture definitions and the stateless gesture classifier.
//!
//! Gestures are data: a name, a check kind, the fingers involved and numeric
//! arguments. [`detect`] evaluates a named gesture against one landmark set
//! and never fails; unknown names, malformed definitions and missing hands all
//! classify as `false`.

use crate::{
    constants::{
        DEFAULT_DISTANCE_THRESHOLD, DEFAULT_INDEX_TIP_TO_PIP_OFFSET, DEFAULT_OTHERS_FOLDED_OFFSET,
        NUM_HAND_LANDMARKS,
    },
    frame::FrameSize,
    landmarks::{Finger, LandmarkSet},
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Geometric test applied by a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureCheck {
    /// Thumb tip touches exactly one other fingertip
    Touch,
    /// Thumb tip touches every listed fingertip
    GroupTouch,
    /// Index finger pointing up, middle/ring/pinky curled
    FistIndexUp,
    /// Any check kind this build does not know; never fires
    #[serde(other)]
    Unknown,
}

/// One named gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureDefinition {
    pub name: String,
    pub check: GestureCheck,
    #[serde(default)]
    pub fingers: BTreeSet<Finger>,
    #[serde(default)]
    pub args: HashMap<String, f64>,
}

impl GestureDefinition {
    /// Create a definition without arguments
    #[must_use]
    pub fn new(name: &str, check: GestureCheck, fingers: &[Finger]) -> Self {
        Self {
            name: name.to_string(),
            check,
            fingers: fingers.iter().copied().collect(),
            args: HashMap::new(),
        }
    }

    /// Set a numeric argument
    #[must_use]
    pub fn with_arg(mut self, key: &str, value: f64) -> Self {
        self.args.insert(key.to_string(), value);
        self
    }

    fn arg(&self, key: &str, default: f64) -> f64 {
        self.args.get(key).copied().unwrap_or(default)
    }

    /// Touch distance in pixels
    #[must_use]
    pub fn distance_threshold(&self) -> f64 {
        self.arg("distance_threshold", DEFAULT_DISTANCE_THRESHOLD)
    }

    #[must_use]
    pub fn index_tip_to_pip_offset(&self) -> f64 {
        self.arg("index_tip_to_pip_offset", DEFAULT_INDEX_TIP_TO_PIP_OFFSET)
    }

    #[must_use]
    pub fn others_folded_offset(&self) -> f64 {
        self.arg("others_folded_offset", DEFAULT_OTHERS_FOLDED_OFFSET)
    }

    /// Fingers other than the thumb
    fn partners(&self) -> impl Iterator<Item = Finger> + '_ {
        self.fingers.iter().copied().filter(|f| *f != Finger::Thumb)
    }

    /// Evaluate against one hand
    #[must_use]
    pub fn matches(&self, hand: &LandmarkSet, size: FrameSize) -> bool {
        match self.check {
            GestureCheck::Touch => self.touch(hand, size),
            GestureCheck::GroupTouch => self.group_touch(hand, size),
            GestureCheck::FistIndexUp => self.fist_index_up(hand),
            GestureCheck::Unknown => false,
        }
    }

    fn touch(&self, hand: &LandmarkSet, size: FrameSize) -> bool {
        if self.fingers.len() != 2 || !self.fingers.contains(&Finger::Thumb) {
            return false;
        }
        self.group_touch(hand, size)
    }

    fn group_touch(&self, hand: &LandmarkSet, size: FrameSize) -> bool {
        let Some(thumb) = Finger::Thumb.tip() else {
            return false;
        };
        let threshold = self.distance_threshold();
        let mut partners = self.partners().peekable();
        if partners.peek().is_none() {
            return false;
        }
        partners.all(|finger| {
            finger
                .tip()
                .and_then(|tip| hand.pixel_distance(tip, thumb, size))
                .is_some_and(|d| d < threshold)
        })
    }

    fn fist_index_up(&self, hand: &LandmarkSet) -> bool {
        let y = |index: Option<usize>| index.and_then(|i| hand.get(i)).map(|p| p.y);

        let (Some(index_tip), Some(index_pip)) = (y(Finger::Index.tip()), y(Finger::Index.pip())) else {
            return false;
        };
        let index_extended = index_tip < index_pip - self.index_tip_to_pip_offset();

        let folded_offset = self.others_folded_offset();
        let others_folded = [Finger::Middle, Finger::Ring, Finger::Pinky].into_iter().all(|finger| {
            match (y(finger.tip()), y(finger.pip())) {
                (Some(tip), Some(pip)) => tip > pip + folded_offset,
                _ => false,
            }
        });

        index_extended && others_folded
    }
}

/// Gestures used by the stock profiles
#[must_use]
pub fn preset_definitions() -> Vec<GestureDefinition> {
    use Finger::{Index, Middle, Pinky, Ring, Thumb};
    vec![
        GestureDefinition::new("thumb_index_touch", GestureCheck::Touch, &[Thumb, Index]),
        GestureDefinition::new("thumb_middle_touch", GestureCheck::Touch, &[Thumb, Middle]),
        GestureDefinition::new("thumb_ring_touch", GestureCheck::Touch, &[Thumb, Ring]),
        GestureDefinition::new("thumb_pinky_touch", GestureCheck::Touch, &[Thumb, Pinky]),
        GestureDefinition::new("thumb_middle_ring_touch", GestureCheck::GroupTouch, &[Thumb, Middle, Ring]),
        GestureDefinition::new("thumb_index_middle_touch", GestureCheck::GroupTouch, &[Thumb, Index, Middle]),
        GestureDefinition::new("thumb_ring_pinky_touch", GestureCheck::GroupTouch, &[Thumb, Ring, Pinky]),
        GestureDefinition::new("fist_index_up", GestureCheck::FistIndexUp, &[Index]),
    ]
}

/// Immutable name → definition lookup
#[derive(Debug, Clone, Default)]
pub struct GestureTable {
    definitions: HashMap<String, GestureDefinition>,
}

impl GestureTable {
    /// Build a table; on duplicate names the first definition wins
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = GestureDefinition>) -> Self {
        let mut table = HashMap::new();
        for definition in definitions {
            if table.contains_key(&definition.name) {
                warn!("Duplicate gesture '{}' ignored", definition.name);
                continue;
            }
            if definition.check == GestureCheck::Unknown {
                warn!("Gesture '{}' has an unknown check and will never fire", definition.name);
            }
            table.insert(definition.name.clone(), definition);
        }
        Self { definitions: table }
    }

    /// Built-in gestures matching the stock profiles
    #[must_use]
    pub fn presets() -> Self {
        Self::new(preset_definitions())
    }

    /// Load order: `definitions` first, then any preset they do not override
    #[must_use]
    pub fn with_presets(definitions: impl IntoIterator<Item = GestureDefinition>) -> Self {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for definition in definitions {
            seen.insert(definition.name.clone());
            merged.push(definition);
        }
        merged.extend(preset_definitions().into_iter().filter(|d| !seen.contains(&d.name)));
        Self::new(merged)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GestureDefinition> {
        self.definitions.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Classify a named gesture; see [`detect`]
    #[must_use]
    pub fn detect(&self, hand: Option<&LandmarkSet>, size: FrameSize, name: &str) -> bool {
        detect(self, hand, size, name)
    }
}

/// Classify `name` against the tracked hand
///
/// Returns `false` when there is no hand, the gesture is not in the table,
/// or its definition cannot be evaluated.
#[must_use]
pub fn detect(table: &GestureTable, hand: Option<&LandmarkSet>, size: FrameSize, name: &str) -> bool {
    let (Some(hand), Some(definition)) = (hand, table.get(name)) else {
        return false;
    };
    debug_assert_eq!(hand.points().len(), NUM_HAND_LANDMARKS);
    definition.matches(hand, size)
}
