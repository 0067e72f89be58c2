//! Slots outside the anchor window.

use super::{PlacementCandidate, Side, axis_margin};
use crate::{
    config::PlacementCfg,
    geom::{Point, Rect, Size, clamp_lo},
};

/// Candidate frames around `anchor`, in tie-break order above, right, left,
/// below.
///
/// A slot is produced only if it fits between the anchor and the display
/// edge along its own axis and lies wholly inside `bounds`; the cross axis
/// is centred on the anchor and clamped. Produced slots never intersect the
/// anchor.
pub fn outside_candidates(
    cfg: &PlacementCfg,
    anchor: &Rect,
    size: Size,
    bounds: &Rect,
    cursor: Point,
) -> Vec<PlacementCandidate> {
    let m = cfg.margin;
    let mx = axis_margin(m, bounds.w, size.w);
    let my = axis_margin(m, bounds.h, size.h);
    let cross_x = clamp_lo(
        anchor.cx() - size.w / 2.0,
        bounds.left() + mx,
        bounds.right() - size.w - mx,
    );
    let cross_y = clamp_lo(
        anchor.cy() - size.h / 2.0,
        bounds.bottom() + my,
        bounds.top() - size.h - my,
    );

    let mut out = Vec::with_capacity(4);
    let mut push = |side, x, y| {
        let frame = Rect::new(x, y, size.w, size.h);
        if !bounds.contains_rect(&frame) {
            return;
        }
        out.push(PlacementCandidate {
            frame,
            distance: frame.distance_to(cursor),
            side,
        });
    };

    let above_y = anchor.top() + m;
    if above_y + size.h <= bounds.top() - m {
        push(Side::Above, cross_x, above_y);
    }
    let right_x = anchor.right() + m;
    if right_x + size.w <= bounds.right() - m {
        push(Side::Right, right_x, cross_y);
    }
    let left_x = anchor.left() - size.w - m;
    if left_x >= bounds.left() + m {
        push(Side::Left, left_x, cross_y);
    }
    let below_y = anchor.bottom() - size.h - m;
    if below_y >= bounds.bottom() + m {
        push(Side::Below, cross_x, below_y);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_slot_sits_one_margin_past_the_window() {
        let cfg = PlacementCfg::default();
        let bounds = Rect::new(0.0, 0.0, 1600.0, 1000.0);
        let anchor = Rect::new(100.0, 100.0, 300.0, 300.0);
        let c = outside_candidates(
            &cfg,
            &anchor,
            Size::new(280.0, 240.0),
            &bounds,
            Point::new(500.0, 500.0),
        );
        let sides: Vec<Side> = c.iter().map(|c| c.side).collect();
        // Left needs 292 px of room and the window starts at x=100.
        assert_eq!(sides, vec![Side::Above, Side::Right]);

        let right = c[1];
        assert_eq!(right.frame.x, 412.0);
        assert!(right.frame.y >= 12.0 && right.frame.y <= 748.0);
        assert_eq!(right.frame.y, 130.0);
        // The cursor is straight above the slot's top edge.
        assert!((right.distance - 130.0).abs() < 1e-9);
        for cand in &c {
            assert!(!cand.frame.intersects(&anchor));
            assert!(bounds.contains_rect(&cand.frame));
        }
    }

    #[test]
    fn window_filling_an_edge_loses_that_slot() {
        let cfg = PlacementCfg::default();
        let bounds = Rect::new(0.0, 0.0, 1600.0, 1000.0);
        let anchor = Rect::new(0.0, 600.0, 1600.0, 400.0);
        let c = outside_candidates(
            &cfg,
            &anchor,
            Size::new(280.0, 240.0),
            &bounds,
            Point::new(800.0, 500.0),
        );
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].side, Side::Below);
        assert_eq!(c[0].frame, Rect::new(660.0, 348.0, 280.0, 240.0));
        assert_eq!(c[0].distance, 0.0);
    }
}
