//! Hit-testing of logical points and regions against scene content.
//!
//! Stroke proximity uses the Chebyshev metric: a point hits a stroke when it
//! lies strictly inside the `2r × 2r` square centred on any stroke point. It
//! is cheap, matches what users expect from a chunky eraser, and is used by
//! every tool so erase and select always agree.
//!
//! When several items match, [`HitPriority`] decides which one wins. The same
//! rule applies to strokes and to post-its.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::Deserialize;

use crate::consts::HIT_RADIUS;
use crate::geom::{Point, Rect, point_in_polygon};
use crate::scene::{PostIt, Scene, Stroke};

/// Tie-break when more than one item is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HitPriority {
    /// First match in insertion order.
    #[default]
    SceneOrder,
    /// Last match in insertion order, i.e. the one drawn on top.
    Topmost,
}

impl HitPriority {
    /// Pick one item matching `pred` according to this priority.
    pub fn pick<'a, T>(self, items: &'a [T], mut pred: impl FnMut(&T) -> bool) -> Option<&'a T> {
        match self {
            Self::SceneOrder => items.iter().find(|item| pred(item)),
            Self::Topmost => items.iter().rev().find(|item| pred(item)),
        }
    }
}

/// Which part of the scene was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    ResizeHandle,
    PostItBody,
    Stroke,
}

/// Result of a select-tool hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub id: String,
    pub part: HitPart,
}

/// True if any point of `stroke` is within `radius` of `point` (Chebyshev).
#[must_use]
pub fn near_stroke(point: &Point, stroke: &Stroke, radius: f64) -> bool {
    stroke
        .points
        .iter()
        .any(|p| (p.x - point.x).abs() < radius && (p.y - point.y).abs() < radius)
}

/// True if `point` lies within the post-it's bounding box (edges included).
#[must_use]
pub fn in_post_it(point: &Point, postit: &PostIt) -> bool {
    postit.rect().contains(point)
}

/// True if `point` lies on the post-it's bottom-right resize handle.
#[must_use]
pub fn in_resize_handle(point: &Point, postit: &PostIt) -> bool {
    postit.handle_rect().contains(point)
}

/// Ids of strokes with at least one point inside `rect`, in scene order.
#[must_use]
pub fn strokes_in_rect(strokes: &[Stroke], rect: &Rect) -> Vec<String> {
    strokes
        .iter()
        .filter(|s| s.bounds().is_some_and(|b| b.intersects(rect)))
        .filter(|s| s.points.iter().any(|p| rect.contains(p)))
        .map(|s| s.id.clone())
        .collect()
}

/// Ids of strokes with at least one point inside the closed `polygon`.
#[must_use]
pub fn strokes_in_polygon(strokes: &[Stroke], polygon: &[Point]) -> Vec<String> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    strokes
        .iter()
        .filter(|s| s.points.iter().any(|p| point_in_polygon(p, polygon)))
        .map(|s| s.id.clone())
        .collect()
}

/// The stroke under `point` within the default radius.
#[must_use]
pub fn stroke_at<'a>(point: &Point, strokes: &'a [Stroke], priority: HitPriority) -> Option<&'a Stroke> {
    priority.pick(strokes, |s| near_stroke(point, s, HIT_RADIUS))
}

/// The post-it whose body contains `point`.
#[must_use]
pub fn post_it_at<'a>(point: &Point, postits: &'a [PostIt], priority: HitPriority) -> Option<&'a PostIt> {
    priority.pick(postits, |p| in_post_it(point, p))
}

/// The post-it drawn on top at `point`. Post-its are stacked in insertion
/// order, so this always resolves top-down regardless of the configured
/// stroke priority.
#[must_use]
pub fn top_post_it_at<'a>(point: &Point, postits: &'a [PostIt]) -> Option<&'a PostIt> {
    post_it_at(point, postits, HitPriority::Topmost)
}

/// Select-tool hit test: resize handles first, then post-it bodies, then strokes.
///
/// `priority` breaks ties between strokes; post-its resolve top-down.
#[must_use]
pub fn hit_test(point: &Point, scene: &Scene, priority: HitPriority) -> Option<Hit> {
    if let Some(p) = HitPriority::Topmost.pick(scene.post_its(), |p| in_resize_handle(point, p)) {
        return Some(Hit { id: p.id.clone(), part: HitPart::ResizeHandle });
    }
    if let Some(p) = top_post_it_at(point, scene.post_its()) {
        return Some(Hit { id: p.id.clone(), part: HitPart::PostItBody });
    }
    stroke_at(point, scene.strokes(), priority).map(|s| Hit { id: s.id.clone(), part: HitPart::Stroke })
}
