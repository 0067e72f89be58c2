//! Geometry primitives shared by the locator, controller and placement engine.
//!
//! All coordinates are global screen coordinates with a bottom-left origin:
//! larger `y` is further up the screen.

use serde::{Deserialize, Serialize};

/// A point in global screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows upwards).
    pub y: f64,
}

impl Point {
    /// Construct a point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point counterpart of [`Rect::flip_y`].
    #[inline]
    pub fn flip_y(&self, primary_h: f64) -> Self {
        Self::new(self.x, primary_h - self.y)
    }
}

/// A width/height pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in points.
    pub w: f64,
    /// Height in points.
    pub h: f64,
}

impl Size {
    /// Construct a size.
    #[inline]
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}

/// Absolute tolerance used by approximate comparisons.
pub const EPS: f64 = 1e-6;

/// True if `a` and `b` differ by at most `eps`.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Axis-aligned rectangle; `(x, y)` is the bottom-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Construct a rectangle from origin and extent.
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Construct a rectangle from an origin and a size.
    #[inline]
    pub const fn from_origin(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            w: size.w,
            h: size.h,
        }
    }

    /// Left edge.
    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }
    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }
    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y
    }
    /// Top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.y + self.h
    }
    /// Horizontal centre.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.w / 2.0
    }
    /// Vertical centre.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Origin (bottom-left corner).
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Extent of the rectangle.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Area, treating negative extents as empty.
    #[inline]
    pub fn area(&self) -> f64 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.bottom() && p.y <= self.top()
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    #[inline]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.left() >= self.left() - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() >= self.bottom() - EPS
            && other.top() <= self.top() + EPS
    }

    /// True when the interiors overlap; touching edges do not count.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        overlap_1d(self.left(), self.right(), other.left(), other.right()) > EPS
            && overlap_1d(self.bottom(), self.top(), other.bottom(), other.top()) > EPS
    }

    /// Area of the overlap between two rectangles.
    #[inline]
    pub fn intersection_area(&self, other: &Self) -> f64 {
        overlap_1d(self.left(), self.right(), other.left(), other.right())
            * overlap_1d(self.bottom(), self.top(), other.bottom(), other.top())
    }

    /// Euclidean distance from `p` to the nearest point of the rectangle.
    ///
    /// Zero when `p` is inside.
    pub fn distance_to(&self, p: Point) -> f64 {
        let dx = (self.left() - p.x).max(0.0).max(p.x - self.right());
        let dy = (self.bottom() - p.y).max(0.0).max(p.y - self.top());
        dx.hypot(dy)
    }

    /// Same rectangle moved to a new origin.
    #[inline]
    pub fn with_origin(&self, x: f64, y: f64) -> Self {
        Self::new(x, y, self.w, self.h)
    }

    /// Rectangle shrunk by `margin` on every side.
    #[inline]
    pub fn inset(&self, margin: f64) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            self.w - 2.0 * margin,
            self.h - 2.0 * margin,
        )
    }

    /// Convert between top-left-origin and bottom-left-origin spaces that
    /// share a primary display of height `primary_h`. The conversion is its
    /// own inverse.
    #[inline]
    pub fn flip_y(&self, primary_h: f64) -> Self {
        Self::new(self.x, primary_h - self.y - self.h, self.w, self.h)
    }

    /// Component-wise [`approx_eq`].
    #[inline]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        approx_eq(self.x, other.x, eps)
            && approx_eq(self.y, other.y, eps)
            && approx_eq(self.w, other.w, eps)
            && approx_eq(self.h, other.h, eps)
    }
}

/// Length of the overlap of `[a1, a2]` and `[b1, b2]`.
#[inline]
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    let l = a1.max(b1);
    let r = a2.min(b2);
    (r - l).max(0.0)
}

/// Clamp `v` into `[lo, hi]`; when the range is inverted the lower bound wins.
#[inline]
pub fn clamp_lo(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}
