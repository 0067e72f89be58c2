//! Slots offset around the cursor.

use super::{PlacementCandidate, Side, clamp_frame};
use crate::{
    config::PlacementCfg,
    geom::{Point, Rect, Size},
};

/// Clamped frames above, below, left and right of the cursor, in that
/// tie-break order. Frames that would cover the cursor after clamping are
/// dropped.
pub fn cursor_candidates(
    cfg: &PlacementCfg,
    cursor: Point,
    size: Size,
    bounds: &Rect,
) -> Vec<PlacementCandidate> {
    let off = cfg.cursor_offset;
    let centred_x = cursor.x - size.w / 2.0;
    let centred_y = cursor.y - size.h / 2.0;
    [
        (Side::Above, centred_x, cursor.y + off),
        (Side::Below, centred_x, cursor.y - off - size.h),
        (Side::Left, cursor.x - off - size.w, centred_y),
        (Side::Right, cursor.x + off, centred_y),
    ]
    .into_iter()
    .map(|(side, x, y)| {
        let frame = clamp_frame(Rect::new(x, y, size.w, size.h), bounds, cfg.margin);
        PlacementCandidate {
            frame,
            distance: frame.distance_to(cursor),
            side,
        }
    })
    .filter(|c| !c.frame.contains_point(cursor))
    .collect()
}
