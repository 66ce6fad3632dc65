//! Gesture → action state machine.
//!
//! One [`ActionDispatcher`] lives on the processing thread. Every iteration
//! it moves the cursor, runs the edge/cooldown logic for one-shot actions,
//! feeds continuous actions into the scroll integrator and flushes a scroll
//! tick. Input sink failures are logged and never stop the loop.

use crate::{
    constants::{
        DEFAULT_ANNOTATION_FRAMES, DEFAULT_COOLDOWN_FRAMES, DEFAULT_FRAME_MARGIN,
        DEFAULT_SMOOTHING_FACTOR,
    },
    cursor_control::ScreenMapper,
    filters::{exponential::ExponentialSmoother, PointFilter},
    frame::FrameSize,
    gestures::{detect, GestureTable},
    input::{InputSink, MouseButton},
    landmarks::LandmarkSet,
    profile::{Action, ActionKind, Profile},
    scroll::{ScrollIntegrator, ScrollTuning},
    utils::safe_cast::f64_to_i32,
};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Text overlay request with a frame-count lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub text: String,
    /// Baseline origin in frame pixels
    pub position: (i32, i32),
    /// RGB
    pub color: [u8; 3],
    pub frames_remaining: u32,
}

impl Annotation {
    #[must_use]
    pub fn new(text: &str, position: (i32, i32), color: [u8; 3], frames: u32) -> Self {
        Self {
            text: text.to_string(),
            position,
            color,
            frames_remaining: frames,
        }
    }
}

/// Per-action edge state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    /// Gesture value at the last evaluation outside cooldown
    pub was_active: bool,
    /// Iterations left before the action is evaluated again
    pub cooldown_remaining: u32,
}

/// Dispatcher timing knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchTuning {
    pub cooldown_frames: u32,
    pub annotation_frames: u32,
    /// Frame border ignored by the cursor mapping
    pub frame_margin: u32,
    pub scroll: ScrollTuning,
}

impl Default for DispatchTuning {
    fn default() -> Self {
        Self {
            cooldown_frames: DEFAULT_COOLDOWN_FRAMES,
            annotation_frames: DEFAULT_ANNOTATION_FRAMES,
            frame_margin: DEFAULT_FRAME_MARGIN,
            scroll: ScrollTuning::default(),
        }
    }
}

/// Overlay label of an action: text, anchor and RGB colour
fn label(action: &Action) -> Option<(&'static str, (i32, i32), [u8; 3])> {
    match action {
        Action::Click => Some(("CLICK!", (50, 50), [255, 0, 0])),
        Action::DoubleClick => Some(("DOUBLE CLICK!", (50, 80), [255, 0, 255])),
        Action::Drag => Some(("DRAG!", (50, 110), [255, 150, 0])),
        Action::ScrollDown => Some(("SCROLL DOWN (smooth)", (50, 200), [0, 255, 0])),
        Action::ScrollUp => Some(("SCROLL UP (smooth)", (50, 230), [0, 255, 255])),
        Action::MouseMove | Action::Unknown(_) => None,
    }
}

/// Turns per-frame gesture observations into input sink calls
pub struct ActionDispatcher<S: InputSink> {
    profile: Profile,
    table: Arc<GestureTable>,
    sink: S,
    cursor: Box<dyn PointFilter>,
    tuning: DispatchTuning,
    states: HashMap<Action, ActionState>,
    drag_active: bool,
    scroll: ScrollIntegrator,
}

impl<S: InputSink> ActionDispatcher<S> {
    /// Dispatcher with the default divisor-7 cursor smoother
    #[must_use]
    pub fn new(profile: Profile, table: Arc<GestureTable>, sink: S, tuning: DispatchTuning) -> Self {
        Self::with_filter(
            profile,
            table,
            sink,
            tuning,
            Box::new(ExponentialSmoother::new(DEFAULT_SMOOTHING_FACTOR)),
        )
    }

    #[must_use]
    pub fn with_filter(
        profile: Profile,
        table: Arc<GestureTable>,
        sink: S,
        tuning: DispatchTuning,
        cursor: Box<dyn PointFilter>,
    ) -> Self {
        for binding in profile.bindings() {
            if !table.contains(&binding.gesture) {
                warn!(
                    "Action '{}' is bound to unknown gesture '{}'; it will never fire",
                    binding.action, binding.gesture
                );
            }
        }
        info!(
            "Dispatcher ready: {} binding(s), cursor follow {}, smoothing {}",
            profile.bindings().len(),
            if profile.follows_cursor() { "on" } else { "off" },
            cursor.name()
        );
        Self {
            profile,
            table,
            sink,
            cursor,
            scroll: ScrollIntegrator::new(tuning.scroll),
            tuning,
            states: HashMap::new(),
            drag_active: false,
        }
    }

    /// Run one processing iteration
    ///
    /// `hand` is `None` when no hand was detected; every gesture then reads
    /// as inactive, so cooldowns keep counting and a held drag is released.
    /// Returns the annotations to show for this iteration.
    pub fn step(&mut self, hand: Option<&LandmarkSet>, size: FrameSize) -> Vec<Annotation> {
        let mut annotations = Vec::new();

        if let Some(hand) = hand.filter(|_| self.profile.follows_cursor()) {
            self.follow(hand, size);
        }

        let Self {
            profile,
            table,
            sink,
            tuning,
            states,
            drag_active,
            scroll,
            ..
        } = self;

        for binding in profile.bindings() {
            let action = &binding.action;
            match action.kind() {
                ActionKind::OneShot => {
                    let state = states.entry(action.clone()).or_default();
                    if state.cooldown_remaining > 0 {
                        state.cooldown_remaining -= 1;
                        continue;
                    }

                    let active = detect(&**table, hand, size, &binding.gesture);
                    if active && !state.was_active {
                        fire(action, sink, drag_active);
                        state.cooldown_remaining = tuning.cooldown_frames;
                        if let Some((text, position, color)) = label(action) {
                            annotations.push(Annotation::new(
                                text,
                                position,
                                color,
                                tuning.annotation_frames,
                            ));
                        }
                    }
                    state.was_active = active;

                    if *action == Action::Drag && !active && *drag_active {
                        release_drag(sink, drag_active);
                    }
                }
                ActionKind::Continuous => {
                    if !detect(&**table, hand, size, &binding.gesture) {
                        continue;
                    }
                    if *action == Action::ScrollDown {
                        scroll.push_down();
                    } else {
                        scroll.push_up();
                    }
                    if let Some((text, position, color)) = label(action) {
                        annotations.push(Annotation::new(text, position, color, 1));
                    }
                }
                ActionKind::Cursor | ActionKind::Inert => {}
            }
        }

        if let Some(tick) = scroll.tick() {
            debug!("Scroll {:?} by {}", tick.direction, tick.amount);
            if let Err(e) = sink.scroll(tick.direction, tick.amount) {
                warn!("Scroll failed: {e}");
            }
        }

        annotations
    }

    fn follow(&mut self, hand: &LandmarkSet, size: FrameSize) {
        let mapper = ScreenMapper::new(size, self.sink.screen_size(), self.tuning.frame_margin);
        let (cx, cy) = hand.centroid(size);
        let (tx, ty) = mapper.map(cx, cy);
        let (x, y) = self.cursor.apply(tx, ty);
        match (f64_to_i32(x), f64_to_i32(y)) {
            (Ok(x), Ok(y)) => {
                if let Err(e) = self.sink.move_to(x, y) {
                    warn!("Pointer move failed: {e}");
                }
            }
            _ => {
                warn!("Smoothed cursor position ({x}, {y}) out of range, resetting");
                self.cursor.reset();
            }
        }
    }

    /// Release a held drag; later calls do nothing
    ///
    /// Returns true if a release was issued.
    pub fn shutdown(&mut self) -> bool {
        self.scroll.reset();
        if !self.drag_active {
            return false;
        }
        info!("Releasing active drag before shutdown");
        release_drag(&mut self.sink, &mut self.drag_active);
        true
    }

    #[must_use]
    pub const fn drag_active(&self) -> bool {
        self.drag_active
    }

    #[must_use]
    pub const fn scroll_velocity(&self) -> f64 {
        self.scroll.velocity()
    }

    /// Edge state of an action, once it has been observed
    #[must_use]
    pub fn state(&self, action: &Action) -> Option<&ActionState> {
        self.states.get(action)
    }

    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }
}

/// Issue the side effect of a one-shot action
fn fire<S: InputSink>(action: &Action, sink: &mut S, drag_active: &mut bool) {
    let result = match action {
        Action::Click => sink.click(MouseButton::Left),
        Action::DoubleClick => sink.double_click(),
        Action::Drag => {
            if *drag_active {
                return;
            }
            let result = sink.drag_start();
            *drag_active = result.is_ok();
            result
        }
        _ => return,
    };
    match result {
        Ok(()) => debug!("Fired {action}"),
        Err(e) => warn!("Action '{action}' failed: {e}"),
    }
}

fn release_drag<S: InputSink>(sink: &mut S, drag_active: &mut bool) {
    // Cleared even on failure; a second release would not help
    *drag_active = false;
    if let Err(e) = sink.drag_end() {
        warn!("Drag release failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::DryRunSink;

    fn dispatcher(pairs: &[(&str, &str)]) -> ActionDispatcher<DryRunSink> {
        ActionDispatcher::new(
            Profile::from_pairs(pairs.iter().copied()),
            Arc::new(GestureTable::presets()),
            DryRunSink::new(1920, 1080),
            DispatchTuning::default(),
        )
    }

    #[test]
    fn test_no_hand_no_effects() {
        let mut d = dispatcher(&[("click", "thumb_index_touch"), ("scroll_up", "fist_index_up")]);
        let size = FrameSize::new(640, 480);
        for _ in 0..5 {
            assert!(d.step(None, size).is_empty());
        }
        assert_eq!(d.scroll_velocity(), 0.0);
        assert_eq!(d.state(&Action::Click), Some(&ActionState::default()));
        assert!(d.state(&Action::ScrollUp).is_none());
    }

    #[test]
    fn test_shutdown_without_drag() {
        let mut d = dispatcher(&[("drag", "thumb_ring_touch")]);
        assert!(!d.drag_active());
        assert!(!d.shutdown());
    }

    #[test]
    fn test_labels() {
        assert_eq!(label(&Action::Click).map(|l| l.0), Some("CLICK!"));
        assert!(label(&Action::MouseMove).is_none());
    }
}
