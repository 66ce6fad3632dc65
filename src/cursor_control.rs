//! Cursor control module for X11-based systems.
//!
//! [`ScreenMapper`] turns a hand position in frame pixels into a screen
//! position. [`X11Sink`] injects pointer motion, button and wheel events
//! through the XTEST extension.

use crate::{
    error::{AppError, Result},
    frame::FrameSize,
    input::{InputSink, MouseButton, ScrollDirection},
    utils::safe_cast::i32_to_i16_clamp,
};
use log::{debug, info};
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{ConnectionExt as _, Window, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT},
        xtest::ConnectionExt as _,
    },
    rust_connection::RustConnection,
};

/// X11 button numbers
const BUTTON_LEFT: u8 = 1;
const BUTTON_RIGHT: u8 = 3;
const WHEEL_UP: u8 = 4;
const WHEEL_DOWN: u8 = 5;

/// Maps frame pixel coordinates to screen pixel coordinates
///
/// A border of `margin` pixels around the frame is clamped away, so the
/// hand reaches the screen edges before it leaves the camera view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapper {
    frame: FrameSize,
    screen: (u32, u32),
    margin: u32,
}

impl ScreenMapper {
    #[must_use]
    pub const fn new(frame: FrameSize, screen: (u32, u32), margin: u32) -> Self {
        Self { frame, screen, margin }
    }

    #[must_use]
    pub const fn screen(&self) -> (u32, u32) {
        self.screen
    }

    /// Map a frame pixel position to a whole screen pixel position
    #[must_use]
    pub fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let nx = normalize(x, self.frame.width, self.margin);
        let ny = normalize(y, self.frame.height, self.margin);
        (
            (nx * f64::from(self.screen.0)).trunc(),
            (ny * f64::from(self.screen.1)).trunc(),
        )
    }
}

/// Clamp into `[margin, dim - margin]` and rescale to `[0, 1]`
fn normalize(value: f64, dim: u32, margin: u32) -> f64 {
    // Frames too small for the margin use the whole frame
    let margin = if dim > margin.saturating_mul(2) { margin } else { 0 };
    let low = f64::from(margin);
    let span = f64::from(dim) - 2.0 * low;
    if span <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value.clamp(low, low + span) - low) / span
}

/// Input sink backed by an X11 connection
pub struct X11Sink {
    connection: RustConnection,
    root: Window,
    screen_width: u16,
    screen_height: u16,
    // Signed wheel notches not yet emitted, positive is up
    wheel_pending: f64,
}

impl X11Sink {
    /// Connect to the default display
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be reached
    pub fn new() -> Result<Self> {
        info!("Initializing X11 input sink");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| AppError::X11(format!("Failed to connect to X11: {e}")))?;

        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| AppError::X11("Failed to get screen".to_string()))?;
        let root = screen.root;
        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;

        info!("Connected to X11 display, screen: {screen_width}x{screen_height}");

        Ok(Self {
            connection,
            root,
            screen_width,
            screen_height,
            wheel_pending: 0.0,
        })
    }

    fn fake_button(&self, event: u8, button: u8) -> Result<()> {
        self.connection
            .xtest_fake_input(event, button, x11rb::CURRENT_TIME, self.root, 0, 0, 0)
            .map_err(|e| AppError::InputSink(format!("Failed to send fake input: {e}")))?;
        Ok(())
    }

    fn press_release(&self, button: u8) -> Result<()> {
        self.fake_button(BUTTON_PRESS_EVENT, button)?;
        self.fake_button(BUTTON_RELEASE_EVENT, button)
    }

    fn flush(&self) -> Result<()> {
        self.connection
            .flush()
            .map_err(|e| AppError::InputSink(format!("Failed to flush connection: {e}")))?;
        Ok(())
    }
}

impl InputSink for X11Sink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let max_x = i32::from(self.screen_width.saturating_sub(1));
        let max_y = i32::from(self.screen_height.saturating_sub(1));
        let x = i32_to_i16_clamp(x, 0, max_x);
        let y = i32_to_i16_clamp(y, 0, max_y);

        self.connection
            .warp_pointer(x11rb::NONE, self.root, 0, 0, 0, 0, x, y)
            .map_err(|e| AppError::InputSink(format!("Failed to warp pointer: {e}")))?;
        self.flush()
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        debug!("Click {button:?}");
        let button = match button {
            MouseButton::Left => BUTTON_LEFT,
            MouseButton::Right => BUTTON_RIGHT,
        };
        self.press_release(button)?;
        self.flush()
    }

    fn double_click(&mut self) -> Result<()> {
        debug!("Double click");
        self.press_release(BUTTON_LEFT)?;
        self.press_release(BUTTON_LEFT)?;
        self.flush()
    }

    fn drag_start(&mut self) -> Result<()> {
        debug!("Drag start");
        self.fake_button(BUTTON_PRESS_EVENT, BUTTON_LEFT)?;
        self.flush()
    }

    fn drag_end(&mut self) -> Result<()> {
        debug!("Drag end");
        self.fake_button(BUTTON_RELEASE_EVENT, BUTTON_LEFT)?;
        self.flush()
    }

    fn scroll(&mut self, direction: ScrollDirection, amount: f64) -> Result<()> {
        let signed = match direction {
            ScrollDirection::Up => amount,
            ScrollDirection::Down => -amount,
        };
        // A reversal discards what was owed in the other direction
        if self.wheel_pending * signed < 0.0 {
            self.wheel_pending = 0.0;
        }
        self.wheel_pending += signed;

        let (notches, remainder) = split_notches(self.wheel_pending);
        self.wheel_pending = remainder;
        if notches == 0 {
            return Ok(());
        }

        let button = if notches > 0 { WHEEL_UP } else { WHEEL_DOWN };
        for _ in 0..notches.unsigned_abs() {
            self.press_release(button)?;
        }
        self.flush()
    }

    fn screen_size(&self) -> (u32, u32) {
        (u32::from(self.screen_width), u32::from(self.screen_height))
    }
}

/// Whole wheel notches due and the fractional part carried over
#[allow(clippy::cast_possible_truncation)] // amounts are a few notches at most
fn split_notches(pending: f64) -> (i32, f64) {
    if !pending.is_finite() {
        return (0, 0.0);
    }
    let whole = pending.trunc();
    (whole as i32, pending - whole)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "Requires X11 display"]
    fn test_x11_sink_creation() {
        let sink = X11Sink::new();
        assert!(sink.is_ok());
    }

    #[test]
    fn test_mapper_margin_clamp() {
        let mapper = ScreenMapper::new(FrameSize::new(640, 480), (1920, 1080), 100);

        // Anything inside the margin pins to the screen edge
        assert_eq!(mapper.map(10.0, 10.0), (0.0, 0.0));
        assert_eq!(mapper.map(630.0, 470.0), (1920.0, 1080.0));

        // Frame center lands on screen center
        assert_eq!(mapper.map(320.0, 240.0), (960.0, 540.0));
    }

    #[test]
    fn test_mapper_truncates() {
        let mapper = ScreenMapper::new(FrameSize::new(640, 480), (1000, 1000), 100);
        // (101 - 100) / 440 * 1000 = 2.27...
        assert_eq!(mapper.map(101.0, 100.0).0, 2.0);
    }

    #[test]
    fn test_mapper_small_frame_ignores_margin() {
        let mapper = ScreenMapper::new(FrameSize::new(150, 150), (300, 300), 100);
        assert_eq!(mapper.map(75.0, 0.0), (150.0, 0.0));
        assert_eq!(mapper.map(f64::NAN, 150.0), (0.0, 300.0));
    }

    #[test]
    fn test_split_notches() {
        assert_eq!(split_notches(0.7), (0, 0.7));
        let (n, rest) = split_notches(1.4);
        assert_eq!(n, 1);
        assert!((rest - 0.4).abs() < 1e-9);
        let (n, rest) = split_notches(-2.1);
        assert_eq!(n, -2);
        assert!((rest + 0.1).abs() < 1e-9);
        assert_eq!(split_notches(f64::INFINITY), (0, 0.0));
    }
}
