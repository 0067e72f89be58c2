//! Presenter that records presentation transitions in the log.
//!
//! The overlay window itself belongs to the host application; this binary
//! only reports what would be shown where.

#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use dropzone_core::{Presenter, Rect};
use tracing::info;

/// Logs every show, hide and reposition.
#[derive(Debug, Default)]
pub struct LogPresenter {
    /// Frame of the visible overlay, if any.
    shown: Option<Rect>,
}

impl Presenter for LogPresenter {
    fn show(&mut self, frame: Rect) {
        info!(x = frame.x, y = frame.y, w = frame.w, h = frame.h, "overlay_show");
        self.shown = Some(frame);
    }

    fn hide(&mut self) {
        info!("overlay_hide");
        self.shown = None;
    }

    fn set_frame(&mut self, frame: Rect) {
        if self.shown != Some(frame) {
            info!(x = frame.x, y = frame.y, w = frame.w, h = frame.h, "overlay_move");
        }
        self.shown = Some(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_shown_frame() {
        let mut p = LogPresenter::default();
        let a = Rect::new(0.0, 0.0, 280.0, 240.0);
        let b = Rect::new(10.0, 0.0, 280.0, 240.0);
        p.show(a);
        assert_eq!(p.shown, Some(a));
        p.set_frame(b);
        assert_eq!(p.shown, Some(b));
        p.hide();
        assert_eq!(p.shown, None);
    }
}
