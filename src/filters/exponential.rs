use super::PointFilter;

/// Exponential smoothing in divisor form
///
/// Each update moves `1 / factor` of the way from the previous output to the
/// new target, independently on x and y. The first sample passes through
/// unchanged; there is no glide in from the origin.
pub struct ExponentialSmoother {
    factor: f64,
    last: Option<(f64, f64)>,
}

impl ExponentialSmoother {
    /// Create a smoother
    ///
    /// # Panics
    ///
    /// Panics if factor is below 1
    #[must_use]
    pub fn new(factor: f64) -> Self {
        assert!(factor >= 1.0, "Smoothing factor must be >= 1");
        Self { factor, last: None }
    }

    /// Current smoothed position, if any sample has been seen
    #[must_use]
    pub const fn position(&self) -> Option<(f64, f64)> {
        self.last
    }
}

impl PointFilter for ExponentialSmoother {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        let next = match self.last {
            Some((px, py)) => (px + (x - px) / self.factor, py + (y - py) / self.factor),
            None => (x, y),
        };
        self.last = Some(next);
        next
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialSmoother"
    }
}
