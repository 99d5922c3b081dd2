//! Viewport transform between screen pixels and the logical drawing plane.
//!
//! The viewport is the logical rectangle currently visible inside the
//! surface's element. Panning moves its origin; its size never changes, so
//! there is no zoom. The scale factor between the two spaces is simply
//! `viewport.width / element.width` (and likewise for height), which lets a
//! fixed-size logical board stretch over whatever box the host lays out.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::geom::Point;

/// The visible logical rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport origin as a point.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The drawing surface's bounding box on screen, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// True when the element has a usable, non-zero size.
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Map a screen point (client coordinates) to the logical plane.
///
/// Pen pressure and tilt pass through. An unmeasured element returns the
/// point unchanged instead of dividing by zero.
#[must_use]
pub fn to_logical(screen: Point, viewport: &Viewport, element: &ElementRect) -> Point {
    if !element.is_measurable() {
        return screen;
    }
    Point {
        x: (screen.x - element.left) / element.width * viewport.width + viewport.x,
        y: (screen.y - element.top) / element.height * viewport.height + viewport.y,
        ..screen
    }
}

/// Map a logical point back to screen (client) coordinates.
#[must_use]
pub fn to_screen(logical: Point, viewport: &Viewport, element: &ElementRect) -> Point {
    if !element.is_measurable() || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return logical;
    }
    Point {
        x: (logical.x - viewport.x) / viewport.width * element.width + element.left,
        y: (logical.y - viewport.y) / viewport.height * element.height + element.top,
        ..logical
    }
}

/// Shift the viewport so content follows a screen-space drag of `(dx, dy)`.
///
/// Dragging right reveals what lies to the left, so the origin moves by the
/// negated, scaled delta. Size is preserved.
#[must_use]
pub fn apply_pan(viewport: &Viewport, screen_dx: f64, screen_dy: f64, element: &ElementRect) -> Viewport {
    if !element.is_measurable() || !screen_dx.is_finite() || !screen_dy.is_finite() {
        return *viewport;
    }
    Viewport {
        x: viewport.x - screen_dx * viewport.width / element.width,
        y: viewport.y - screen_dy * viewport.height / element.height,
        ..*viewport
    }
}

/// Logical units per screen pixel along each axis, `(1, 1)` when unmeasured.
#[must_use]
pub fn scale(viewport: &Viewport, element: &ElementRect) -> (f64, f64) {
    if !element.is_measurable() {
        return (1.0, 1.0);
    }
    (viewport.width / element.width, viewport.height / element.height)
}
