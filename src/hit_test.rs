use super::*;
use crate::scene::StrokeKind;

fn stroke_at_points(id: &str, coords: &[(f64, f64)]) -> Stroke {
    Stroke {
        id: id.to_string(),
        points: coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        color: "#000".into(),
        width: 2.0,
        kind: StrokeKind::Drawing,
    }
}

fn note(id: &str, x: f64, y: f64) -> PostIt {
    PostIt { id: id.to_string(), ..PostIt::new(x, y, "#FFEB3B") }
}

fn scene_with(strokes: Vec<Stroke>, postits: Vec<PostIt>) -> Scene {
    let mut scene = Scene::new();
    for s in strokes {
        scene.append_stroke(s).unwrap();
    }
    for p in postits {
        scene.upsert_post_it(p);
    }
    scene
}

// =============================================================
// near_stroke
// =============================================================

#[test]
fn near_stroke_within_box() {
    let s = stroke_at_points("a", &[(100.0, 100.0)]);
    assert!(near_stroke(&Point::new(119.0, 81.0), &s, 20.0));
}

#[test]
fn near_stroke_is_chebyshev_not_euclidean() {
    // (19, 19) away is ~26.9 Euclidean but inside the square.
    let s = stroke_at_points("a", &[(0.0, 0.0)]);
    assert!(near_stroke(&Point::new(19.0, 19.0), &s, 20.0));
}

#[test]
fn near_stroke_boundary_is_exclusive() {
    let s = stroke_at_points("a", &[(0.0, 0.0)]);
    assert!(!near_stroke(&Point::new(20.0, 0.0), &s, 20.0));
}

#[test]
fn near_stroke_checks_every_point() {
    let s = stroke_at_points("a", &[(0.0, 0.0), (200.0, 200.0)]);
    assert!(near_stroke(&Point::new(205.0, 195.0), &s, 20.0));
}

// =============================================================
// Post-it regions
// =============================================================

#[test]
fn in_post_it_inclusive_edges() {
    let p = note("p", 10.0, 10.0);
    assert!(in_post_it(&Point::new(10.0, 10.0), &p));
    assert!(in_post_it(&Point::new(210.0, 160.0), &p));
    assert!(!in_post_it(&Point::new(211.0, 100.0), &p));
}

#[test]
fn resize_handle_only_in_corner() {
    let p = note("p", 0.0, 0.0);
    assert!(in_resize_handle(&Point::new(195.0, 145.0), &p));
    assert!(!in_resize_handle(&Point::new(100.0, 75.0), &p));
}

// =============================================================
// Region selection
// =============================================================

#[test]
fn rect_selects_strokes_with_any_point_inside() {
    let strokes = vec![stroke_at_points("a", &[(50.0, 50.0)]), stroke_at_points("b", &[(500.0, 500.0)])];
    let rect = Rect::from_corners(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
    assert_eq!(strokes_in_rect(&strokes, &rect), vec!["a".to_string()]);
}

#[test]
fn rect_selects_partially_covered_stroke() {
    let strokes = vec![stroke_at_points("a", &[(-50.0, -50.0), (10.0, 10.0)])];
    let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
    assert_eq!(strokes_in_rect(&strokes, &rect), vec!["a".to_string()]);
}

#[test]
fn polygon_selection_uses_containment() {
    let strokes = vec![stroke_at_points("a", &[(5.0, 5.0)]), stroke_at_points("b", &[(50.0, 5.0)])];
    let triangle = [Point::new(0.0, 0.0), Point::new(20.0, 0.0), Point::new(0.0, 20.0)];
    assert_eq!(strokes_in_polygon(&strokes, &triangle), vec!["a".to_string()]);
}

#[test]
fn degenerate_polygon_selects_nothing() {
    let strokes = vec![stroke_at_points("a", &[(5.0, 5.0)])];
    assert!(strokes_in_polygon(&strokes, &[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]).is_empty());
}

// =============================================================
// Priority
// =============================================================

#[test]
fn scene_order_picks_first_overlapping_stroke() {
    let strokes = vec![stroke_at_points("a", &[(10.0, 10.0)]), stroke_at_points("b", &[(12.0, 12.0)])];
    let hit = stroke_at(&Point::new(11.0, 11.0), &strokes, HitPriority::SceneOrder).unwrap();
    assert_eq!(hit.id, "a");
}

#[test]
fn topmost_picks_last_overlapping_stroke() {
    let strokes = vec![stroke_at_points("a", &[(10.0, 10.0)]), stroke_at_points("b", &[(12.0, 12.0)])];
    let hit = stroke_at(&Point::new(11.0, 11.0), &strokes, HitPriority::Topmost).unwrap();
    assert_eq!(hit.id, "b");
}

#[test]
fn priority_applies_to_post_its_too() {
    let postits = vec![note("low", 0.0, 0.0), note("high", 50.0, 50.0)];
    let p = Point::new(100.0, 100.0);
    assert_eq!(post_it_at(&p, &postits, HitPriority::SceneOrder).unwrap().id, "low");
    assert_eq!(post_it_at(&p, &postits, HitPriority::Topmost).unwrap().id, "high");
}

#[test]
fn priority_deserializes_from_camel_case() {
    let p: HitPriority = serde_json::from_str("\"topmost\"").unwrap();
    assert_eq!(p, HitPriority::Topmost);
    let p: HitPriority = serde_json::from_str("\"sceneOrder\"").unwrap();
    assert_eq!(p, HitPriority::SceneOrder);
}

// =============================================================
// hit_test ordering
// =============================================================

#[test]
fn handle_beats_body_and_strokes() {
    let scene = scene_with(vec![stroke_at_points("s", &[(195.0, 145.0)])], vec![note("p", 0.0, 0.0)]);
    let hit = hit_test(&Point::new(195.0, 145.0), &scene, HitPriority::SceneOrder).unwrap();
    assert_eq!(hit, Hit { id: "p".into(), part: HitPart::ResizeHandle });
}

#[test]
fn body_beats_strokes() {
    let scene = scene_with(vec![stroke_at_points("s", &[(50.0, 50.0)])], vec![note("p", 0.0, 0.0)]);
    let hit = hit_test(&Point::new(50.0, 50.0), &scene, HitPriority::SceneOrder).unwrap();
    assert_eq!(hit.part, HitPart::PostItBody);
}

#[test]
fn stroke_hit_outside_post_its() {
    let scene = scene_with(vec![stroke_at_points("s", &[(500.0, 500.0)])], vec![note("p", 0.0, 0.0)]);
    let hit = hit_test(&Point::new(505.0, 505.0), &scene, HitPriority::SceneOrder).unwrap();
    assert_eq!(hit, Hit { id: "s".into(), part: HitPart::Stroke });
}

#[test]
fn overlapping_post_its_resolve_to_the_top_one() {
    let scene = scene_with(vec![], vec![note("under", 100.0, 100.0), note("over", 150.0, 150.0)]);
    let p = Point::new(200.0, 200.0);
    assert_eq!(top_post_it_at(&p, scene.post_its()).unwrap().id, "over");
    for priority in [HitPriority::SceneOrder, HitPriority::Topmost] {
        let hit = hit_test(&p, &scene, priority).unwrap();
        assert_eq!(hit, Hit { id: "over".into(), part: HitPart::PostItBody });
    }
}

#[test]
fn overlapping_handle_belongs_to_the_top_post_it() {
    // The bottom note's handle (284..300, 234..250) lies under the top note's body.
    let scene = scene_with(vec![], vec![note("under", 100.0, 100.0), note("over", 150.0, 150.0)]);
    let hit = hit_test(&Point::new(290.0, 240.0), &scene, HitPriority::SceneOrder).unwrap();
    assert_eq!(hit.id, "over");
}

#[test]
fn empty_space_is_no_hit() {
    let scene = scene_with(vec![stroke_at_points("s", &[(500.0, 500.0)])], vec![]);
    assert!(hit_test(&Point::new(0.0, 0.0), &scene, HitPriority::SceneOrder).is_none());
}
