//! Geometry primitives shared by every other module.
//!
//! `Point` is both the captured pointer sample (with optional pen pressure and
//! tilt) and a plain 2D coordinate. `Rect` is an axis-aligned box used for
//! post-it bounds, rubber-band selection and viewport culling.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

fn default_pressure() -> f64 {
    1.0
}

#[allow(clippy::float_cmp, clippy::trivially_copy_pass_by_ref)]
fn is_default_pressure(p: &f64) -> bool {
    *p == 1.0
}

#[allow(clippy::float_cmp, clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

/// A point on the logical plane (or in screen space before conversion).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Pen pressure in `(0, 1]`. Mice and absent data report 1.0.
    #[serde(default = "default_pressure", skip_serializing_if = "is_default_pressure")]
    pub pressure: f64,
    #[serde(rename = "tiltX", default, skip_serializing_if = "is_zero")]
    pub tilt_x: f64,
    #[serde(rename = "tiltY", default, skip_serializing_if = "is_zero")]
    pub tilt_y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, pressure: 1.0, tilt_x: 0.0, tilt_y: 0.0 }
    }

    /// Attach pen data. Non-positive or non-finite pressure falls back to 1.0.
    #[must_use]
    pub fn with_pen(mut self, pressure: f64, tilt_x: f64, tilt_y: f64) -> Self {
        self.pressure = if pressure.is_finite() && pressure > 0.0 { pressure } else { 1.0 };
        self.tilt_x = if tilt_x.is_finite() { tilt_x } else { 0.0 };
        self.tilt_y = if tilt_y.is_finite() { tilt_y } else { 0.0 };
        self
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The same sample shifted by `(dx, dy)`; pen data is kept.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// True when both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The rectangle spanned by two opposite corners, in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when the two rectangles overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right() && other.x <= self.right() && self.y <= other.bottom() && other.y <= self.bottom()
    }
}

/// Even-odd ray-casting test. Polygons with fewer than three vertices contain nothing.
#[must_use]
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        // The straddle check guarantees pj.y != pi.y, so the division is safe.
        if (pi.y > point.y) != (pj.y > point.y) {
            let cross_x = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
