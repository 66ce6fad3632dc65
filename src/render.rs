//! Render stage: overlays, display and key polling.

use crate::{
    dispatcher::Annotation,
    frame::Frame,
    pipeline::{StopSignal, ZoomControl},
    queue::{Pop, QueueReader},
    Result,
};
use log::{debug, info, warn};
use std::time::Duration;

/// Keyboard commands understood by the render stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    ZoomIn,
    ZoomOut,
}

impl KeyCommand {
    /// Map a key code (`q`, `+`/`=`, `-`/`_`)
    #[must_use]
    pub fn from_key(key: i32) -> Option<Self> {
        let ch = u8::try_from(key).ok().map(char::from)?;
        match ch {
            'q' | '\u{1b}' => Some(Self::Quit),
            '+' | '=' => Some(Self::ZoomIn),
            '-' | '_' => Some(Self::ZoomOut),
            _ => None,
        }
    }
}

/// One line of text drawn over a frame
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub text: String,
    pub position: (i32, i32),
    /// RGB
    pub color: [u8; 3],
    pub font_scale: f64,
    pub thickness: i32,
}

impl Overlay {
    /// Persistent zoom readout in the top-left corner
    #[must_use]
    pub fn zoom(scale: f64) -> Self {
        Self {
            text: format!("ZOOM: {scale:.2}x"),
            position: (10, 30),
            color: [255, 200, 200],
            font_scale: 0.9,
            thickness: 2,
        }
    }
}

impl From<&Annotation> for Overlay {
    fn from(annotation: &Annotation) -> Self {
        Self {
            text: annotation.text.clone(),
            position: annotation.position,
            color: annotation.color,
            font_scale: 1.1,
            thickness: 3,
        }
    }
}

/// A processed frame on its way to the display
#[derive(Debug)]
pub struct RenderItem {
    pub frame: Frame,
    pub annotations: Vec<Annotation>,
}

/// Window or other output the render stage draws to
pub trait Display: Send {
    /// Show a frame with overlays, returning a key command if one was pressed
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be shown; the render loop logs it
    /// and continues with the next frame.
    fn present(&mut self, frame: &Frame, overlays: &[Overlay]) -> Result<Option<KeyCommand>>;

    /// Poll for a key while no frame is available
    ///
    /// # Errors
    ///
    /// Returns an error if the window system fails
    fn poll(&mut self) -> Result<Option<KeyCommand>> {
        Ok(None)
    }

    /// Tear down the window
    fn close(&mut self) {}
}

/// Display that shows nothing
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    presented: u64,
}

impl HeadlessDisplay {
    #[must_use]
    pub const fn new() -> Self {
        Self { presented: 0 }
    }

    #[must_use]
    pub const fn presented(&self) -> u64 {
        self.presented
    }
}

impl Display for HeadlessDisplay {
    fn present(&mut self, frame: &Frame, overlays: &[Overlay]) -> Result<Option<KeyCommand>> {
        self.presented += 1;
        if log::log_enabled!(log::Level::Trace) {
            let size = frame.size();
            let texts: Vec<&str> = overlays.iter().map(|o| o.text.as_str()).collect();
            log::trace!("[headless] {}x{} frame, overlays {texts:?}", size.width, size.height);
        }
        Ok(None)
    }
}

/// Ephemeral annotations still on screen
#[derive(Debug, Default)]
pub struct AnnotationBoard {
    live: Vec<Annotation>,
}

impl AnnotationBoard {
    #[must_use]
    pub const fn new() -> Self {
        Self { live: Vec::new() }
    }

    pub fn extend(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.live
            .extend(annotations.into_iter().filter(|a| a.frames_remaining > 0));
    }

    /// Overlays for the next frame; each annotation loses one frame of life
    pub fn frame_overlays(&mut self, zoom_scale: f64) -> Vec<Overlay> {
        let mut overlays = Vec::with_capacity(self.live.len() + 1);
        overlays.push(Overlay::zoom(zoom_scale));
        overlays.extend(self.live.iter().map(Overlay::from));

        for annotation in &mut self.live {
            annotation.frames_remaining = annotation.frames_remaining.saturating_sub(1);
        }
        self.live.retain(|a| a.frames_remaining > 0);
        overlays
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// Run the render stage until `halt` trips or the queue closes
///
/// Key commands act on the shared zoom and the external stop signal.
/// Returns the number of frames presented.
pub fn render_loop(
    reader: &QueueReader<RenderItem>,
    display: &mut dyn Display,
    zoom: &ZoomControl,
    stop: &StopSignal,
    halt: &StopSignal,
    wait: Duration,
) -> u64 {
    let mut board = AnnotationBoard::new();
    let mut presented = 0u64;

    while !halt.is_triggered() {
        let key = match reader.pop_timeout(wait) {
            Pop::Item(item) => {
                board.extend(item.annotations);
                let overlays = board.frame_overlays(zoom.scale());
                presented += 1;
                display.present(&item.frame, &overlays)
            }
            Pop::Empty => display.poll(),
            Pop::Closed => {
                debug!("Render queue closed");
                break;
            }
        };

        match key {
            Ok(Some(command)) => handle_key(command, zoom, stop),
            Ok(None) => {}
            Err(e) => warn!("Display error: {e}"),
        }
    }

    display.close();
    info!("Render stage stopped after {presented} frames");
    presented
}

fn handle_key(command: KeyCommand, zoom: &ZoomControl, stop: &StopSignal) {
    match command {
        KeyCommand::Quit => {
            info!("Exit requested by user");
            stop.trigger();
        }
        KeyCommand::ZoomIn => {
            let scale = zoom.zoom_in();
            info!("Zoom {scale:.2}x");
        }
        KeyCommand::ZoomOut => {
            let scale = zoom.zoom_out();
            info!("Zoom {scale:.2}x");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyCommand::from_key(i32::from(b'q')), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key(27), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key(i32::from(b'=')), Some(KeyCommand::ZoomIn));
        assert_eq!(KeyCommand::from_key(i32::from(b'_')), Some(KeyCommand::ZoomOut));
        assert_eq!(KeyCommand::from_key(i32::from(b'x')), None);
        assert_eq!(KeyCommand::from_key(-1), None);
    }

    #[test]
    fn test_zoom_keys_change_scale_without_logger() {
        let zoom = ZoomControl::new(1.5, 1.0, 4.0, 0.1);
        let stop = StopSignal::new();

        handle_key(KeyCommand::ZoomIn, &zoom, &stop);
        assert!((zoom.scale() - 1.6).abs() < 1e-9);
        handle_key(KeyCommand::ZoomOut, &zoom, &stop);
        handle_key(KeyCommand::ZoomOut, &zoom, &stop);
        assert!((zoom.scale() - 1.4).abs() < 1e-9);
        assert!(!stop.is_triggered());

        handle_key(KeyCommand::Quit, &zoom, &stop);
        assert!(stop.is_triggered());
    }

    #[test]
    fn test_zoom_overlay_text() {
        assert_eq!(Overlay::zoom(1.5).text, "ZOOM: 1.50x");
    }

    #[test]
    fn test_annotation_countdown() {
        let mut board = AnnotationBoard::new();
        board.extend([
            Annotation::new("CLICK!", (50, 50), [255, 0, 0], 2),
            Annotation::new("SCROLL UP (smooth)", (50, 230), [0, 255, 255], 1),
            Annotation::new("never shown", (0, 0), [0, 0, 0], 0),
        ]);
        assert_eq!(board.len(), 2);

        let first = board.frame_overlays(1.0);
        assert_eq!(first.len(), 3);
        assert_eq!(first[1].text, "CLICK!");

        let second = board.frame_overlays(1.0);
        assert_eq!(second.len(), 2);

        let third = board.frame_overlays(1.0);
        assert_eq!(third.len(), 1);
        assert!(board.is_empty());
    }
}
