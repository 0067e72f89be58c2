//! Window and screen location.
//!
//! The frontmost window is resolved through two tiers: a precise query of
//! the frontmost application's focused window (which needs Accessibility
//! permission), then an on-screen window list scan. Each tier reports why it
//! failed; the locator logs the failure and moves on. Absence of an anchor
//! is a normal outcome, not an error.

use thiserror::Error;
use tracing::debug;

use crate::geom::{Point, Rect};

/// One physical display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Display {
    /// Full display frame in global coordinates.
    pub frame: Rect,
    /// Usable area, excluding the menu bar and dock.
    pub visible: Rect,
}

impl Display {
    /// A display with separate full and usable areas.
    pub fn new(frame: Rect, visible: Rect) -> Self {
        Self { frame, visible }
    }

    /// A display whose usable area is its whole frame.
    pub fn full(frame: Rect) -> Self {
        Self {
            frame,
            visible: frame,
        }
    }

    /// Same display, allowing for rounding in reported frames.
    pub fn same_as(&self, other: &Self) -> bool {
        self.frame.approx_eq(&other.frame, 0.5)
    }
}

/// The frontmost window and the display that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Window rectangle in global coordinates.
    pub rect: Rect,
    /// Display owning the window.
    pub display: Display,
}

/// Why a window tier produced nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocateError {
    /// Accessibility permission missing.
    #[error("accessibility permission not granted")]
    Permission,
    /// No application is frontmost.
    #[error("no frontmost application")]
    NoFrontmostApp,
    /// The frontmost application has no usable window.
    #[error("frontmost application has no usable window")]
    NoWindow,
    /// The window handle went stale while being queried.
    #[error("window no longer exists")]
    WindowGone,
    /// Accessibility call failed with this error code.
    #[error("accessibility error {0}")]
    Ax(i32),
    /// No window query exists on this platform.
    #[error("window query unsupported on this platform")]
    Unsupported,
}

/// One strategy for finding the frontmost window's rectangle.
pub trait WindowTier {
    /// Short name used in logs.
    fn name(&self) -> &'static str;
    /// Rectangle of the frontmost window in global bottom-left coordinates.
    fn frontmost_window(&self) -> Result<Rect, LocateError>;
}

impl<T: WindowTier + ?Sized> WindowTier for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn frontmost_window(&self) -> Result<Rect, LocateError> {
        (**self).frontmost_window()
    }
}

/// Two-tier frontmost window locator.
#[derive(Debug)]
pub struct WindowLocator<A, B> {
    precise: A,
    scan: B,
}

impl<A: WindowTier, B: WindowTier> WindowLocator<A, B> {
    /// Try `precise` first, then `scan`.
    pub fn new(precise: A, scan: B) -> Self {
        Self { precise, scan }
    }

    /// Frontmost window rectangle from the first tier that succeeds.
    pub fn frontmost_window(&self) -> Option<Rect> {
        for tier in [&self.precise as &dyn WindowTier, &self.scan] {
            match tier.frontmost_window() {
                Ok(rect) if rect.w > 0.0 && rect.h > 0.0 => {
                    debug!(tier = tier.name(), ?rect, "frontmost_window");
                    return Some(rect);
                }
                Ok(rect) => debug!(tier = tier.name(), ?rect, "window_tier_empty_rect"),
                Err(err) => debug!(tier = tier.name(), %err, "window_tier_failed"),
            }
        }
        None
    }

    /// Resolve the current anchor against `displays`. Never cached.
    pub fn current_anchor(&self, displays: &[Display]) -> Option<Anchor> {
        let rect = self.frontmost_window()?;
        let display = display_for_rect(displays, &rect)?;
        Some(Anchor { rect, display })
    }
}

/// First display whose frame contains `p`, else the default display.
pub fn display_containing(displays: &[Display], p: Point) -> Option<Display> {
    displays
        .iter()
        .find(|d| d.frame.contains_point(p))
        .or_else(|| displays.first())
        .copied()
}

/// First display whose frame intersects `r`, else the default display.
pub fn display_for_rect(displays: &[Display], r: &Rect) -> Option<Display> {
    displays
        .iter()
        .find(|d| d.frame.intersects(r))
        .or_else(|| displays.first())
        .copied()
}

/// Everything the controller needs to know about the desktop.
pub trait Desktop {
    /// Attached displays; the first entry is the system default display.
    fn displays(&self) -> Vec<Display>;
    /// Live pointer location.
    fn cursor_location(&self) -> Point;
    /// Frontmost window anchor, resolved fresh on each call.
    fn current_anchor(&self) -> Option<Anchor>;

    /// Display containing `p`. Always resolvable; with no displays at all a
    /// zero rectangle is returned.
    fn display_containing(&self, p: Point) -> Display {
        display_containing(&self.displays(), p).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Tier {
        name: &'static str,
        result: Result<Rect, LocateError>,
        calls: Cell<usize>,
    }

    impl Tier {
        fn new(name: &'static str, result: Result<Rect, LocateError>) -> Self {
            Self {
                name,
                result,
                calls: Cell::new(0),
            }
        }
    }

    impl WindowTier for Tier {
        fn name(&self) -> &'static str {
            self.name
        }

        fn frontmost_window(&self) -> Result<Rect, LocateError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    fn two_displays() -> Vec<Display> {
        vec![
            Display::new(
                Rect::new(0.0, 0.0, 1600.0, 1000.0),
                Rect::new(0.0, 0.0, 1600.0, 975.0),
            ),
            Display::full(Rect::new(1600.0, 0.0, 1920.0, 1080.0)),
        ]
    }

    #[test]
    fn precise_tier_wins_when_available() {
        let precise = Tier::new("ax", Ok(Rect::new(100.0, 100.0, 300.0, 300.0)));
        let scan = Tier::new("scan", Ok(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let loc = WindowLocator::new(&precise, &scan);
        let anchor = loc.current_anchor(&two_displays()).expect("anchor");
        assert_eq!(anchor.rect, Rect::new(100.0, 100.0, 300.0, 300.0));
        assert_eq!(scan.calls.get(), 0);
    }

    #[test]
    fn falls_back_to_scan_on_permission_failure() {
        let precise = Tier::new("ax", Err(LocateError::Permission));
        let scan = Tier::new("scan", Ok(Rect::new(1700.0, 100.0, 400.0, 300.0)));
        let loc = WindowLocator::new(&precise, &scan);
        let anchor = loc.current_anchor(&two_displays()).expect("anchor");
        assert_eq!(anchor.display.frame.x, 1600.0);
    }

    #[test]
    fn both_tiers_failing_yields_none() {
        let precise = Tier::new("ax", Err(LocateError::WindowGone));
        let scan = Tier::new("scan", Err(LocateError::NoWindow));
        let loc = WindowLocator::new(&precise, &scan);
        assert!(loc.current_anchor(&two_displays()).is_none());
    }

    #[test]
    fn zero_sized_window_is_skipped() {
        let precise = Tier::new("ax", Ok(Rect::new(5.0, 5.0, 0.0, 0.0)));
        let scan = Tier::new("scan", Ok(Rect::new(10.0, 10.0, 50.0, 50.0)));
        let loc = WindowLocator::new(&precise, &scan);
        assert_eq!(loc.frontmost_window(), Some(Rect::new(10.0, 10.0, 50.0, 50.0)));
    }

    #[test]
    fn offscreen_window_uses_default_display() {
        let displays = two_displays();
        let r = Rect::new(-5000.0, -5000.0, 100.0, 100.0);
        assert_eq!(display_for_rect(&displays, &r), Some(displays[0]));
        assert_eq!(
            display_containing(&displays, Point::new(-1.0, -1.0)),
            Some(displays[0])
        );
        assert_eq!(
            display_containing(&displays, Point::new(2000.0, 500.0)),
            Some(displays[1])
        );
        assert_eq!(display_containing(&[], Point::new(0.0, 0.0)), None);
    }
}
