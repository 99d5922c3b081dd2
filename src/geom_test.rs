#![allow(clippy::float_cmp)]

use super::*;

fn square() -> Vec<Point> {
    vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)]
}

// =============================================================
// Point
// =============================================================

#[test]
fn point_new_has_default_pen_data() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.pressure, 1.0);
    assert_eq!(p.tilt_x, 0.0);
    assert_eq!(p.tilt_y, 0.0);
}

#[test]
fn with_pen_rejects_zero_pressure() {
    let p = Point::new(0.0, 0.0).with_pen(0.0, 5.0, f64::NAN);
    assert_eq!(p.pressure, 1.0);
    assert_eq!(p.tilt_x, 5.0);
    assert_eq!(p.tilt_y, 0.0);
}

#[test]
fn distance_is_euclidean() {
    assert_eq!(Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0)), 5.0);
}

#[test]
fn offset_keeps_pen_data() {
    let p = Point::new(1.0, 1.0).with_pen(0.5, 2.0, 3.0).offset(10.0, -1.0);
    assert_eq!((p.x, p.y), (11.0, 0.0));
    assert_eq!(p.pressure, 0.5);
    assert_eq!(p.tilt_x, 2.0);
}

#[test]
fn point_serializes_without_default_pen_fields() {
    let json = serde_json::to_value(Point::new(1.0, 2.0)).unwrap();
    assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0}));
}

#[test]
fn point_serializes_camel_case_tilt() {
    let json = serde_json::to_value(Point::new(1.0, 2.0).with_pen(0.4, 10.0, -3.0)).unwrap();
    assert_eq!(json["pressure"], 0.4);
    assert_eq!(json["tiltX"], 10.0);
    assert_eq!(json["tiltY"], -3.0);
}

#[test]
fn point_deserialize_fills_defaults() {
    let p: Point = serde_json::from_str(r#"{"x": 5, "y": 6}"#).unwrap();
    assert_eq!(p, Point::new(5.0, 6.0));
}

// =============================================================
// Rect
// =============================================================

#[test]
fn from_corners_normalizes_order() {
    let r = Rect::from_corners(Point::new(100.0, 100.0), Point::new(0.0, 20.0));
    assert_eq!(r, Rect::new(0.0, 20.0, 100.0, 80.0));
}

#[test]
fn contains_is_inclusive() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(&Point::new(0.0, 0.0)));
    assert!(r.contains(&Point::new(10.0, 10.0)));
    assert!(!r.contains(&Point::new(10.1, 5.0)));
}

#[test]
fn intersects_detects_overlap_and_separation() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
    assert!(!a.intersects(&Rect::new(20.0, 0.0, 5.0, 5.0)));
}

// =============================================================
// point_in_polygon
// =============================================================

#[test]
fn polygon_contains_interior_point() {
    assert!(point_in_polygon(&Point::new(5.0, 5.0), &square()));
}

#[test]
fn polygon_excludes_exterior_point() {
    assert!(!point_in_polygon(&Point::new(15.0, 5.0), &square()));
    assert!(!point_in_polygon(&Point::new(5.0, -1.0), &square()));
}

#[test]
fn polygon_with_two_vertices_contains_nothing() {
    let line = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
    assert!(!point_in_polygon(&Point::new(5.0, 5.0), &line));
}

#[test]
fn concave_polygon_uses_even_odd_rule() {
    // A "U" shape: the notch between the arms is outside.
    let u = vec![
        Point::new(0.0, 0.0),
        Point::new(30.0, 0.0),
        Point::new(30.0, 30.0),
        Point::new(20.0, 30.0),
        Point::new(20.0, 10.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 30.0),
        Point::new(0.0, 30.0),
    ];
    assert!(point_in_polygon(&Point::new(5.0, 20.0), &u));
    assert!(!point_in_polygon(&Point::new(15.0, 20.0), &u));
    assert!(point_in_polygon(&Point::new(25.0, 20.0), &u));
}
