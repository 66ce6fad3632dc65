//! Input sink interface: where dispatched pointer actions end up.

use crate::Result;
use log::info;

/// Mouse button for clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Wheel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// OS-level pointer primitives
///
/// Every call may fail. Callers log failures and carry on; nothing is
/// retried, since a retried click or scroll could fire twice.
pub trait InputSink: Send {
    /// Move the pointer to an absolute screen position
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press and release a button
    fn click(&mut self, button: MouseButton) -> Result<()>;

    /// Two left clicks in quick succession
    fn double_click(&mut self) -> Result<()>;

    /// Hold the left button down
    fn drag_start(&mut self) -> Result<()>;

    /// Release the left button
    fn drag_end(&mut self) -> Result<()>;

    /// Scroll the wheel by `amount` notches (fractions allowed)
    fn scroll(&mut self, direction: ScrollDirection, amount: f64) -> Result<()>;

    /// Screen dimensions in pixels
    fn screen_size(&self) -> (u32, u32);
}

impl<T: InputSink + ?Sized> InputSink for Box<T> {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        (**self).move_to(x, y)
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        (**self).click(button)
    }

    fn double_click(&mut self) -> Result<()> {
        (**self).double_click()
    }

    fn drag_start(&mut self) -> Result<()> {
        (**self).drag_start()
    }

    fn drag_end(&mut self) -> Result<()> {
        (**self).drag_end()
    }

    fn scroll(&mut self, direction: ScrollDirection, amount: f64) -> Result<()> {
        (**self).scroll(direction, amount)
    }

    fn screen_size(&self) -> (u32, u32) {
        (**self).screen_size()
    }
}

/// Sink that only logs, for running without touching the real pointer
pub struct DryRunSink {
    screen: (u32, u32),
    last_move: Option<(i32, i32)>,
}

impl DryRunSink {
    #[must_use]
    pub const fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen: (screen_width, screen_height),
            last_move: None,
        }
    }
}

impl InputSink for DryRunSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        // Moves arrive every frame; only log changes
        if self.last_move != Some((x, y)) {
            log::trace!("[dry-run] move to ({x}, {y})");
            self.last_move = Some((x, y));
        }
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        info!("[dry-run] click {button:?}");
        Ok(())
    }

    fn double_click(&mut self) -> Result<()> {
        info!("[dry-run] double click");
        Ok(())
    }

    fn drag_start(&mut self) -> Result<()> {
        info!("[dry-run] drag start");
        Ok(())
    }

    fn drag_end(&mut self) -> Result<()> {
        info!("[dry-run] drag end");
        Ok(())
    }

    fn scroll(&mut self, direction: ScrollDirection, amount: f64) -> Result<()> {
        info!("[dry-run] scroll {direction:?} by {amount:.2}");
        Ok(())
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_sink_accepts_everything() {
        let mut sink: Box<dyn InputSink> = Box::new(DryRunSink::new(800, 600));
        assert!(sink.move_to(10, 10).is_ok());
        assert!(sink.click(MouseButton::Left).is_ok());
        assert!(sink.double_click().is_ok());
        assert!(sink.drag_start().is_ok());
        assert!(sink.drag_end().is_ok());
        assert!(sink.scroll(ScrollDirection::Down, 0.7).is_ok());
        assert_eq!(sink.screen_size(), (800, 600));
    }
}
