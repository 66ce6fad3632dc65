use super::{bgr_scalar, frame_to_mat};
use crate::{
    frame::Frame,
    render::{Display, KeyCommand, Overlay},
    Result,
};
use log::warn;
use opencv::{
    core::Point,
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};

/// Camera preview window
pub struct HighGuiDisplay {
    title: String,
    open: bool,
}

impl HighGuiDisplay {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            open: false,
        }
    }

    fn ensure_window(&mut self) -> Result<()> {
        if !self.open {
            highgui::named_window(&self.title, WINDOW_NORMAL)?;
            self.open = true;
        }
        Ok(())
    }
}

impl Display for HighGuiDisplay {
    fn present(&mut self, frame: &Frame, overlays: &[Overlay]) -> Result<Option<KeyCommand>> {
        self.ensure_window()?;
        let mut mat = frame_to_mat(frame)?;
        for overlay in overlays {
            imgproc::put_text(
                &mut mat,
                &overlay.text,
                Point::new(overlay.position.0, overlay.position.1),
                FONT_HERSHEY_SIMPLEX,
                overlay.font_scale,
                bgr_scalar(overlay.color),
                overlay.thickness,
                LINE_8,
                false,
            )?;
        }
        highgui::imshow(&self.title, &mat)?;
        Ok(KeyCommand::from_key(highgui::wait_key(1)?))
    }

    fn poll(&mut self) -> Result<Option<KeyCommand>> {
        if !self.open {
            return Ok(None);
        }
        Ok(KeyCommand::from_key(highgui::wait_key(1)?))
    }

    fn close(&mut self) {
        if self.open {
            if let Err(e) = highgui::destroy_window(&self.title) {
                warn!("Failed to close window: {e}");
            }
            self.open = false;
        }
    }
}
