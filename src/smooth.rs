//! Catmull-Rom path smoothing for captured strokes.
//!
//! Strokes are stored as the sparse samples the pointer produced; the renderer
//! runs them through [`smooth`] every frame. The function is pure, so the same
//! input always yields the same path.

#[cfg(test)]
#[path = "smooth_test.rs"]
mod smooth_test;

use crate::geom::Point;

/// Interpolate `points` with a uniform Catmull-Rom spline.
///
/// Each segment `points[i] → points[i + 1]` contributes `samples_per_segment`
/// samples at `t = k / n` for `k` in `0..n` (so the segment start is always
/// included), and the exact last point closes the path. The first and last
/// points are duplicated as the virtual outer control points. Pen pressure and
/// tilt are interpolated linearly. Zero samples is treated as one.
///
/// Fewer than two points are returned unchanged.
#[must_use]
pub fn smooth(points: &[Point], samples_per_segment: usize) -> Vec<Point> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let n = samples_per_segment.max(1);
    let last = points.len() - 1;
    let mut out = Vec::with_capacity(last * n + 1);

    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        for k in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let t = k as f64 / n as f64;
            out.push(segment_point(&p0, &p1, &p2, &p3, t));
        }
    }

    out.push(points[last]);
    out
}

fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn segment_point(p0: &Point, p1: &Point, p2: &Point, p3: &Point, t: f64) -> Point {
    Point {
        x: catmull_rom(p0.x, p1.x, p2.x, p3.x, t),
        y: catmull_rom(p0.y, p1.y, p2.y, p3.y, t),
        pressure: lerp(p1.pressure, p2.pressure, t),
        tilt_x: lerp(p1.tilt_x, p2.tilt_x, t),
        tilt_y: lerp(p1.tilt_y, p2.tilt_y, t),
    }
}
