//! Display enumeration and coordinate conversion.
//!
//! AppKit screen frames already use the bottom-left global space the engine
//! works in. CoreGraphics event locations, window list bounds and
//! Accessibility rectangles use a top-left origin anchored at the primary
//! display; [`to_global_rect`] and [`to_global_point`] convert them.

use core_graphics::{display::CGDisplay, geometry::CGRect};
use dropzone_core::{Display, Point, Rect};
use objc2_app_kit::{NSEvent, NSScreen};
use objc2_foundation::{MainThreadMarker, NSRect};
use tracing::debug;

/// Height of the primary display, the reference for coordinate flips.
pub fn primary_height() -> f64 {
    CGDisplay::main().bounds().size.height
}

/// Convert a top-left-origin CoreGraphics rectangle to global coordinates.
pub fn to_global_rect(r: &CGRect) -> Rect {
    Rect::new(r.origin.x, r.origin.y, r.size.width, r.size.height).flip_y(primary_height())
}

/// Convert a top-left-origin CoreGraphics point to global coordinates.
pub fn to_global_point(x: f64, y: f64) -> Point {
    Point::new(x, y).flip_y(primary_height())
}

fn rect_of(r: NSRect) -> Rect {
    Rect::new(r.origin.x, r.origin.y, r.size.width, r.size.height)
}

/// Attached displays; the first is the primary (menu bar) display.
pub fn displays(mtm: MainThreadMarker) -> Vec<Display> {
    let out: Vec<Display> = NSScreen::screens(mtm)
        .iter()
        .map(|s| Display::new(rect_of(s.frame()), rect_of(s.visibleFrame())))
        .collect();
    if out.is_empty() {
        debug!("no_screens_available");
    }
    out
}

/// Live pointer location in global coordinates.
pub fn cursor_location() -> Point {
    let p = NSEvent::mouseLocation();
    Point::new(p.x, p.y)
}
