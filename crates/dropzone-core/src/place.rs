//! Overlay placement.
//!
//! [`place`] is a pure function over geometry. It tries, in order:
//!
//! 1. the slot above the anchor window, if it is close enough to the cursor
//! 2. the nearest of the four slots outside the anchor window
//! 3. the nearest of four slots offset around the cursor that do not cover it,
//!    used when no outside slot is within tolerance (typically a large or
//!    full-screen anchor)
//! 4. a default frame above-left of the cursor
//!
//! Every frame is clamped to the usable bounds of the cursor's display with
//! the configured margin, so whenever the overlay fits on the display the
//! result lies inside it.

mod cursor;
mod outside;

pub use cursor::cursor_candidates;
pub use outside::outside_candidates;
use tracing::debug;

use crate::{
    config::PlacementCfg,
    geom::{Point, Rect, Size, clamp_lo},
    locator::{Anchor, Display, display_containing},
};

/// Direction of a candidate slot relative to what it is placed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Larger `y`.
    Above,
    /// Larger `x`.
    Right,
    /// Smaller `x`.
    Left,
    /// Smaller `y`.
    Below,
}

/// A candidate frame produced during one placement computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementCandidate {
    /// Candidate frame in global coordinates.
    pub frame: Rect,
    /// Distance from the cursor to the nearest point of `frame`.
    pub distance: f64,
    /// Which side of the window or cursor the slot is on.
    pub side: Side,
}

/// Which rule produced a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementTier {
    /// Preferred slot above the anchor window.
    AboveWindow,
    /// Nearest slot outside the anchor window.
    OutsideWindow(Side),
    /// Offset around the cursor.
    NearCursor(Side),
    /// Unconditional cursor-relative frame.
    Default,
}

/// Result of [`place`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Chosen frame.
    pub frame: Rect,
    /// Rule that produced `frame`.
    pub tier: PlacementTier,
}

/// Choose a frame of `size` for the overlay.
///
/// `anchor` is ignored unless its display is the cursor's display. An empty
/// `displays` slice yields an unclamped default frame.
pub fn place(
    cfg: &PlacementCfg,
    cursor: Point,
    size: Size,
    anchor: Option<&Anchor>,
    displays: &[Display],
) -> Placement {
    let Some(display) = display_containing(displays, cursor) else {
        return Placement {
            frame: default_origin(cfg, cursor, size),
            tier: PlacementTier::Default,
        };
    };
    let bounds = display.visible;

    if let Some(anchor) = anchor.filter(|a| a.display.same_as(&display)) {
        let candidates = outside_candidates(cfg, &anchor.rect, size, &bounds, cursor);
        if let Some(p) = choose_outside(cfg, &candidates) {
            return p;
        }
        if is_large_anchor(cfg, &anchor.rect, &bounds) {
            debug!(?anchor.rect, "placement_large_anchor_near_cursor");
        }
    }

    let near = cursor_candidates(cfg, cursor, size, &bounds);
    if let Some(best) = nearest(&near) {
        return Placement {
            frame: best.frame,
            tier: PlacementTier::NearCursor(best.side),
        };
    }

    Placement {
        frame: clamp_frame(default_origin(cfg, cursor, size), &bounds, cfg.margin),
        tier: PlacementTier::Default,
    }
}

fn choose_outside(cfg: &PlacementCfg, candidates: &[PlacementCandidate]) -> Option<Placement> {
    if let Some(above) = candidates
        .iter()
        .find(|c| c.side == Side::Above && c.distance <= cfg.max_distance)
    {
        return Some(Placement {
            frame: above.frame,
            tier: PlacementTier::AboveWindow,
        });
    }
    let best = nearest(candidates).filter(|c| c.distance <= cfg.max_distance)?;
    Some(Placement {
        frame: best.frame,
        tier: PlacementTier::OutsideWindow(best.side),
    })
}

/// Minimum distance candidate; earlier entries win ties.
fn nearest(candidates: &[PlacementCandidate]) -> Option<&PlacementCandidate> {
    candidates.iter().fold(None, |best, c| match best {
        Some(b) if b.distance <= c.distance => Some(b),
        _ => Some(c),
    })
}

fn is_large_anchor(cfg: &PlacementCfg, anchor: &Rect, bounds: &Rect) -> bool {
    let area = bounds.area();
    area > 0.0 && anchor.intersection_area(bounds) >= cfg.large_anchor_ratio * area
}

fn default_origin(cfg: &PlacementCfg, cursor: Point, size: Size) -> Rect {
    let off = cfg.cursor_offset;
    Rect::new(cursor.x - size.w - off, cursor.y + off, size.w, size.h)
}

/// Margin along one axis, shrunk so that an extent up to the full bound
/// still fits.
fn axis_margin(margin: f64, bound: f64, extent: f64) -> f64 {
    margin.min((bound - extent) / 2.0).max(0.0)
}

/// Clamp `frame`'s origin into `bounds` inset by the margin.
pub(crate) fn clamp_frame(frame: Rect, bounds: &Rect, margin: f64) -> Rect {
    let mx = axis_margin(margin, bounds.w, frame.w);
    let my = axis_margin(margin, bounds.h, frame.h);
    frame.with_origin(
        clamp_lo(frame.x, bounds.left() + mx, bounds.right() - frame.w - mx),
        clamp_lo(frame.y, bounds.bottom() + my, bounds.top() - frame.h - my),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> Display {
        Display::full(Rect::new(0.0, 0.0, 1600.0, 1000.0))
    }

    fn anchor(rect: Rect) -> Anchor {
        Anchor {
            rect,
            display: display(),
        }
    }

    const OVERLAY: Size = Size::new(280.0, 240.0);

    #[test]
    fn small_window_near_cursor_prefers_above() {
        let cfg = PlacementCfg::default();
        let a = anchor(Rect::new(100.0, 100.0, 300.0, 300.0));
        let p = place(&cfg, Point::new(500.0, 500.0), OVERLAY, Some(&a), &[display()]);
        assert_eq!(p.tier, PlacementTier::AboveWindow);
        assert_eq!(p.frame, Rect::new(110.0, 412.0, 280.0, 240.0));
        assert!(!p.frame.intersects(&a.rect));
    }

    #[test]
    fn distant_above_slot_yields_to_nearest_side() {
        let cfg = PlacementCfg::default();
        // Window hugs the top, so the above slot does not fit at all.
        let a = anchor(Rect::new(100.0, 500.0, 300.0, 480.0));
        let p = place(&cfg, Point::new(600.0, 700.0), OVERLAY, Some(&a), &[display()]);
        assert_eq!(p.tier, PlacementTier::OutsideWindow(Side::Right));
        assert_eq!(p.frame.x, 412.0);
    }

    #[test]
    fn far_cursor_falls_back_to_cursor_slots() {
        let cfg = PlacementCfg::default();
        let a = anchor(Rect::new(100.0, 100.0, 300.0, 300.0));
        let cursor = Point::new(1500.0, 900.0);
        let p = place(&cfg, cursor, OVERLAY, Some(&a), &[display()]);
        assert!(matches!(p.tier, PlacementTier::NearCursor(_)));
        assert!(!p.frame.contains_point(cursor));
        assert!(display().visible.contains_rect(&p.frame));
    }

    #[test]
    fn large_anchor_without_outside_room_uses_cursor_slots() {
        let cfg = PlacementCfg::default();
        let a = anchor(Rect::new(0.0, 0.0, 1600.0, 960.0));
        let p = place(&cfg, Point::new(800.0, 500.0), OVERLAY, Some(&a), &[display()]);
        assert!(matches!(p.tier, PlacementTier::NearCursor(_)));
    }

    #[test]
    fn large_anchor_still_prefers_free_slot_above() {
        let cfg = PlacementCfg::default();
        // Covers 70% of the display but leaves room above.
        let a = anchor(Rect::new(0.0, 0.0, 1600.0, 700.0));
        let p = place(&cfg, Point::new(800.0, 650.0), OVERLAY, Some(&a), &[display()]);
        assert_eq!(p.tier, PlacementTier::AboveWindow);
        assert_eq!(p.frame, Rect::new(660.0, 712.0, 280.0, 240.0));
        assert!(!p.frame.intersects(&a.rect));
    }

    #[test]
    fn anchor_on_other_display_is_ignored() {
        let cfg = PlacementCfg::default();
        let other = Display::full(Rect::new(1600.0, 0.0, 1600.0, 1000.0));
        let a = Anchor {
            rect: Rect::new(1700.0, 100.0, 300.0, 300.0),
            display: other,
        };
        let p = place(
            &cfg,
            Point::new(500.0, 500.0),
            OVERLAY,
            Some(&a),
            &[display(), other],
        );
        assert!(matches!(p.tier, PlacementTier::NearCursor(_)));
    }

    #[test]
    fn no_anchor_places_near_cursor_preferring_above() {
        let cfg = PlacementCfg::default();
        let p = place(&cfg, Point::new(800.0, 500.0), OVERLAY, None, &[display()]);
        assert_eq!(p.tier, PlacementTier::NearCursor(Side::Above));
        assert_eq!(p.frame, Rect::new(660.0, 516.0, 280.0, 240.0));
    }

    #[test]
    fn oversized_overlay_uses_clamped_default() {
        let cfg = PlacementCfg::default();
        let d = Display::full(Rect::new(0.0, 0.0, 300.0, 260.0));
        let size = Size::new(300.0, 260.0);
        let p = place(&cfg, Point::new(150.0, 130.0), size, None, &[d]);
        // Every cursor slot clamps back over the cursor.
        assert_eq!(p.tier, PlacementTier::Default);
        assert_eq!(p.frame, Rect::new(0.0, 0.0, 300.0, 260.0));
    }

    #[test]
    fn no_displays_returns_unclamped_default() {
        let cfg = PlacementCfg::default();
        let p = place(&cfg, Point::new(500.0, 500.0), OVERLAY, None, &[]);
        assert_eq!(p.tier, PlacementTier::Default);
        assert_eq!(p.frame, Rect::new(204.0, 516.0, 280.0, 240.0));
    }

    #[test]
    fn clamp_respects_margin_and_small_bounds() {
        let b = Rect::new(0.0, 0.0, 100.0, 100.0);
        let f = clamp_frame(Rect::new(-50.0, 90.0, 40.0, 40.0), &b, 12.0);
        assert_eq!(f.origin(), Point::new(12.0, 48.0));
        let tight = clamp_frame(Rect::new(30.0, 30.0, 90.0, 90.0), &b, 12.0);
        assert_eq!(tight.origin(), Point::new(5.0, 5.0));
    }
}
