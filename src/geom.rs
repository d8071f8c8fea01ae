//! Geometric primitives - points, rectangles and dirty-region accumulation
//!
//! Everything in the stroke pipeline works in surface pixel coordinates
//! (f32). The dirty region reported back to the host is an `Option<Rect>`:
//! `None` means "nothing painted, nothing to redraw".

use serde::{Deserialize, Serialize};

/// A 2D point (or vector) in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }

    /// Euclidean distance to another point
    pub fn distance_to(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation toward another point
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Vector length
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Angle of the vector from this point to `other`, in radians
    pub fn angle_to(self, other: Self) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Offset by a polar displacement
    pub fn offset_polar(self, angle: f32, distance: f32) -> Self {
        Self {
            x: self.x + angle.cos() * distance,
            y: self.y + angle.sin() * distance,
        }
    }

    /// Both coordinates are finite (no NaN / infinity)
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Evaluate a quadratic Bezier curve at parameter `t`
///
/// `a` and `b` are the endpoints, `c` is the control point.
pub fn quad_point(a: Point, c: Point, b: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let w0 = u * u;
    let w1 = 2.0 * u * t;
    let w2 = t * t;
    Point {
        x: w0 * a.x + w1 * c.x + w2 * b.x,
        y: w0 * a.y + w1 * c.y + w2 * b.y,
    }
}

/// Cheap arc-length estimate for a quadratic Bezier segment
///
/// Chord length plus half the control-polygon excess. Within a few percent
/// for the short, gentle segments produced by midpoint smoothing.
pub fn quad_arc_length(a: Point, c: Point, b: Point) -> f32 {
    let chord = a.distance_to(b);
    let polygon = a.distance_to(c) + c.distance_to(b);
    chord + 0.5 * (polygon - chord)
}

/// Scalar linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// An axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Create a rectangle from its edges
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square rectangle centered on a point
    pub fn around(center: Point, half_extent: f32) -> Self {
        Self {
            left: center.x - half_extent,
            top: center.y - half_extent,
            right: center.x + half_extent,
            bottom: center.y + half_extent,
        }
    }

    /// Smallest rectangle containing two points
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Grow the rectangle outward on all sides
    pub fn pad(&self, amount: f32) -> Rect {
        Rect {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    /// Whether a point lies inside (inclusive)
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Whether another rectangle lies fully inside (inclusive)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Integer pixel bounds clamped to a surface of the given size
    ///
    /// Returns `(left, top, right, bottom)` with `right`/`bottom`
    /// exclusive, or `None` when the rectangle misses the surface.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let left = self.left.floor().max(0.0) as u32;
        let top = self.top.floor().max(0.0) as u32;
        let right = (self.right.ceil().max(0.0) as u32).min(width);
        let bottom = (self.bottom.ceil().max(0.0) as u32).min(height);
        if left >= right || top >= bottom {
            None
        } else {
            Some((left, top, right, bottom))
        }
    }
}

/// Dirty region reported from session calls; `None` means nothing painted
pub type Dirty = Option<Rect>;

/// Union of two dirty regions
///
/// `None` is the identity: `union_dirty(None, r) == r`.
pub fn union_dirty(a: Dirty, b: Dirty) -> Dirty {
    match (a, b) {
        (None, r) => r,
        (r, None) => r,
        (Some(a), Some(b)) => Some(a.union(&b)),
    }
}

/// Accumulator for the dirty region of one session call
#[derive(Debug, Default, Clone, Copy)]
pub struct DirtyAccum {
    region: Dirty,
}

impl DirtyAccum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the accumulated region
    pub fn add(&mut self, rect: Rect) {
        self.region = union_dirty(self.region, Some(rect));
    }

    /// Widen with an optional region
    pub fn merge(&mut self, dirty: Dirty) {
        self.region = union_dirty(self.region, dirty);
    }

    /// Final accumulated region
    pub fn take(self) -> Dirty {
        self.region
    }
}
