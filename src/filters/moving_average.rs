use super::PointFilter;
use std::collections::VecDeque;

/// Moving average over the last `window_size` targets
pub struct MovingAverageFilter {
    window_size: usize,
    history: VecDeque<(f64, f64)>,
}

impl MovingAverageFilter {
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            history: VecDeque::with_capacity(window_size),
        }
    }
}

impl PointFilter for MovingAverageFilter {
    #[allow(clippy::cast_precision_loss)] // window sizes are small
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        if self.history.len() >= self.window_size {
            self.history.pop_front();
        }
        self.history.push_back((x, y));

        let n = self.history.len() as f64;
        let (sum_x, sum_y) = self
            .history
            .iter()
            .fold((0.0, 0.0), |(ax, ay), (px, py)| (ax + px, ay + py));
        (sum_x / n, sum_y / n)
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn name(&self) -> &str {
        "MovingAverageFilter"
    }
}
