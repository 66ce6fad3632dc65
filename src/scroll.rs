//! Scroll velocity integrator.
//!
//! Continuous scroll gestures push velocity up or down; each iteration a
//! velocity of at least the threshold emits one fixed-size tick and decays.

use crate::constants::{
    DEFAULT_SCROLL_DECAY, DEFAULT_SCROLL_STEP, DEFAULT_SCROLL_THRESHOLD, DEFAULT_SCROLL_TICK,
};
use crate::input::ScrollDirection;

/// Tuning for [`ScrollIntegrator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTuning {
    /// Velocity added per iteration a scroll gesture holds
    pub step: f64,
    /// Wheel amount of one tick
    pub tick: f64,
    /// Velocity multiplier applied after a tick
    pub decay: f64,
    /// Minimum |velocity| that emits a tick
    pub threshold: f64,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            step: DEFAULT_SCROLL_STEP,
            tick: DEFAULT_SCROLL_TICK,
            decay: DEFAULT_SCROLL_DECAY,
            threshold: DEFAULT_SCROLL_THRESHOLD,
        }
    }
}

/// One emitted scroll tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTick {
    pub direction: ScrollDirection,
    pub amount: f64,
}

/// Single-velocity scroll accumulator
///
/// Positive velocity scrolls down, negative scrolls up.
#[derive(Debug, Clone)]
pub struct ScrollIntegrator {
    tuning: ScrollTuning,
    velocity: f64,
}

impl ScrollIntegrator {
    #[must_use]
    pub const fn new(tuning: ScrollTuning) -> Self {
        Self { tuning, velocity: 0.0 }
    }

    #[must_use]
    pub const fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub const fn tuning(&self) -> &ScrollTuning {
        &self.tuning
    }

    /// Accumulate one iteration of a held `scroll_down` gesture
    pub fn push_down(&mut self) {
        self.velocity += self.tuning.step;
    }

    /// Accumulate one iteration of a held `scroll_up` gesture
    pub fn push_up(&mut self) {
        self.velocity -= self.tuning.step;
    }

    /// Advance one iteration
    ///
    /// Emits a tick when |velocity| reaches the threshold, decaying the
    /// velocity afterwards. Below the threshold the velocity is left alone.
    pub fn tick(&mut self) -> Option<ScrollTick> {
        if !self.velocity.is_finite() {
            self.velocity = 0.0;
            return None;
        }
        if self.velocity.abs() < self.tuning.threshold {
            return None;
        }
        let direction = if self.velocity > 0.0 {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        self.velocity *= self.tuning.decay;
        Some(ScrollTick {
            direction,
            amount: self.tuning.tick,
        })
    }

    pub fn reset(&mut self) {
        self.velocity = 0.0;
    }
}

impl Default for ScrollIntegrator {
    fn default() -> Self {
        Self::new(ScrollTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_emits_nothing() {
        let mut scroll = ScrollIntegrator::default();
        assert!(scroll.tick().is_none());
        assert_eq!(scroll.velocity(), 0.0);
    }

    #[test]
    fn test_single_push_down() {
        let mut scroll = ScrollIntegrator::default();
        scroll.push_down();
        let tick = scroll.tick().unwrap();
        assert_eq!(tick.direction, ScrollDirection::Down);
        assert!((tick.amount - 0.7).abs() < 1e-12);
        assert!((scroll.velocity() - 0.6).abs() < 1e-12);

        // 0.6 is under the threshold and stays put
        assert!(scroll.tick().is_none());
        assert!((scroll.velocity() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_push_up_is_negative() {
        let mut scroll = ScrollIntegrator::default();
        scroll.push_up();
        assert_eq!(scroll.tick().unwrap().direction, ScrollDirection::Up);
        assert!(scroll.velocity() < 0.0);
    }

    #[test]
    fn test_opposing_pushes_cancel() {
        let mut scroll = ScrollIntegrator::default();
        scroll.push_down();
        scroll.push_up();
        assert!(scroll.tick().is_none());
    }

    #[test]
    fn test_non_finite_velocity_resets() {
        let mut scroll = ScrollIntegrator::new(ScrollTuning {
            step: f64::INFINITY,
            ..ScrollTuning::default()
        });
        scroll.push_down();
        scroll.push_up();
        assert!(scroll.tick().is_none());
        assert_eq!(scroll.velocity(), 0.0);
    }
}
