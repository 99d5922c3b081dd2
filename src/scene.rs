//! Scene model: strokes, post-its, and the store that owns them.
//!
//! A [`Scene`] belongs to exactly one drawing surface. Nothing outside the
//! surface mutates it directly; the engine calls the mutation API below in
//! response to committed gestures. Stroke ids and post-it ids live in
//! separate namespaces and are each unique within their list.
//!
//! The scene is also the unit of persistence. [`Scene::serialize`] produces the
//! JSON blob collaborators store and send to the backend, and
//! [`Scene::deserialize`] restores it. Restoring is deliberately forgiving:
//! upstream data may come from a half-failed request or an older client, so
//! malformed entries are dropped with a warning instead of failing the load.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::consts::{
    DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, POSTIT_DEFAULT_HEIGHT, POSTIT_DEFAULT_WIDTH, POSTIT_MIN_HEIGHT,
    POSTIT_MIN_WIDTH, RESIZE_HANDLE_SIZE,
};
use crate::geom::{Point, Rect};

/// Fill used for post-its restored without a colour.
pub const DEFAULT_POSTIT_COLOR: &str = "#FFF59D";

/// Generate a fresh, process-unique id.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================
// Types
// =============================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("stroke id already present: {0}")]
    DuplicateStrokeId(String),
    #[error("stroke has no points: {0}")]
    EmptyStroke(String),
    #[error("post-it not found: {0}")]
    PostItNotFound(String),
}

/// What a stroke represents. Only freehand drawings exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    #[default]
    Drawing,
}

/// One freehand gesture in temporal point order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: String,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
    #[serde(rename = "type", default)]
    pub kind: StrokeKind,
}

impl Stroke {
    /// Start a new stroke at `first` with a fresh id.
    #[must_use]
    pub fn new(first: Point, color: impl Into<String>, width: f64) -> Self {
        Self { id: new_id(), points: vec![first], color: color.into(), width, kind: StrokeKind::Drawing }
    }

    /// Shift every point by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            *p = p.offset(dx, dy);
        }
    }

    /// Mean pen pressure over all points, 1.0 for an empty stroke.
    #[must_use]
    pub fn average_pressure(&self) -> f64 {
        if self.points.is_empty() {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.points.len() as f64;
        self.points.iter().map(|p| p.pressure).sum::<f64>() / n
    }

    /// Mean horizontal pen tilt in degrees, 0 for an empty stroke.
    #[must_use]
    pub fn average_tilt_x(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.points.len() as f64;
        self.points.iter().map(|p| p.tilt_x).sum::<f64>() / n
    }

    /// Bounding box of the stroke's points.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// A movable, resizable sticky note with its own drawing.
///
/// `drawing` is stored in the note's local frame: `(0, 0)` is the note's
/// top-left corner. The note's position is applied only when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostIt {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub drawing: Vec<Stroke>,
}

impl PostIt {
    /// New note at `(x, y)` with the default size and an empty drawing.
    #[must_use]
    pub fn new(x: f64, y: f64, color: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            x,
            y,
            width: POSTIT_DEFAULT_WIDTH,
            height: POSTIT_DEFAULT_HEIGHT,
            color: color.into(),
            drawing: Vec::new(),
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The square resize handle in the bottom-right corner.
    #[must_use]
    pub fn handle_rect(&self) -> Rect {
        Rect::new(
            self.x + self.width - RESIZE_HANDLE_SIZE,
            self.y + self.height - RESIZE_HANDLE_SIZE,
            RESIZE_HANDLE_SIZE,
            RESIZE_HANDLE_SIZE,
        )
    }

    /// Convert a logical-plane point into this note's local frame.
    #[must_use]
    pub fn to_local(&self, p: Point) -> Point {
        p.offset(-self.x, -self.y)
    }
}

/// Clamp a requested post-it size to the minimum.
#[must_use]
pub fn clamp_post_it_size(width: f64, height: f64) -> (f64, f64) {
    (width.max(POSTIT_MIN_WIDTH), height.max(POSTIT_MIN_HEIGHT))
}

/// All strokes and post-its on one surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    strokes: Vec<Stroke>,
    postits: Vec<PostIt>,
}

// =============================================================
// Mutation
// =============================================================

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished stroke.
    ///
    /// # Errors
    ///
    /// `DuplicateStrokeId` if the id is taken, `EmptyStroke` if it has no points.
    pub fn append_stroke(&mut self, stroke: Stroke) -> Result<(), SceneError> {
        check_stroke(&self.strokes, &stroke)?;
        self.strokes.push(stroke);
        Ok(())
    }

    /// Remove a stroke by id. Returns `false` if it was not present.
    pub fn remove_stroke(&mut self, id: &str) -> bool {
        let before = self.strokes.len();
        self.strokes.retain(|s| s.id != id);
        self.strokes.len() != before
    }

    /// Shift every named stroke by `(dx, dy)`. Unknown ids are ignored.
    /// Returns how many strokes moved.
    pub fn translate_strokes<S: AsRef<str>>(&mut self, ids: &[S], dx: f64, dy: f64) -> usize {
        let mut moved = 0;
        for stroke in &mut self.strokes {
            if ids.iter().any(|id| id.as_ref() == stroke.id) {
                stroke.translate(dx, dy);
                moved += 1;
            }
        }
        moved
    }

    /// Replace every stroke, keeping post-its. Duplicate ids keep the first
    /// occurrence and empty strokes are dropped.
    pub fn replace_strokes(&mut self, strokes: Vec<Stroke>) {
        self.strokes = dedupe_strokes(strokes);
    }

    /// Insert a post-it, or replace the one with the same id in place.
    pub fn upsert_post_it(&mut self, mut postit: PostIt) {
        (postit.width, postit.height) = clamp_post_it_size(postit.width, postit.height);
        match self.postits.iter_mut().find(|p| p.id == postit.id) {
            Some(existing) => *existing = postit,
            None => self.postits.push(postit),
        }
    }

    /// Remove a post-it by id. Returns `false` if it was not present.
    pub fn remove_post_it(&mut self, id: &str) -> bool {
        let before = self.postits.len();
        self.postits.retain(|p| p.id != id);
        self.postits.len() != before
    }

    /// Resize a post-it, clamped to the minimum size.
    ///
    /// # Errors
    ///
    /// `PostItNotFound` if no post-it has this id.
    pub fn resize_post_it(&mut self, id: &str, width: f64, height: f64) -> Result<(), SceneError> {
        let postit = self.post_it_mut(id)?;
        (postit.width, postit.height) = clamp_post_it_size(width, height);
        Ok(())
    }

    /// Move a post-it's top-left corner. Its drawing moves with it because it
    /// is stored in local coordinates.
    ///
    /// # Errors
    ///
    /// `PostItNotFound` if no post-it has this id.
    pub fn move_post_it(&mut self, id: &str, x: f64, y: f64) -> Result<(), SceneError> {
        let postit = self.post_it_mut(id)?;
        postit.x = x;
        postit.y = y;
        Ok(())
    }

    /// Replace a post-it's embedded drawing.
    ///
    /// # Errors
    ///
    /// `PostItNotFound` if no post-it has this id.
    pub fn set_post_it_drawing(&mut self, id: &str, strokes: Vec<Stroke>) -> Result<(), SceneError> {
        let postit = self.post_it_mut(id)?;
        postit.drawing = dedupe_strokes(strokes);
        Ok(())
    }

    /// Append a finished stroke (in local coordinates) to a post-it's drawing.
    ///
    /// # Errors
    ///
    /// `PostItNotFound`, or the same stroke errors as [`Scene::append_stroke`]
    /// scoped to that post-it's drawing.
    pub fn append_post_it_stroke(&mut self, id: &str, stroke: Stroke) -> Result<(), SceneError> {
        let postit = self.post_it_mut(id)?;
        check_stroke(&postit.drawing, &stroke)?;
        postit.drawing.push(stroke);
        Ok(())
    }

    /// Drop all strokes and post-its.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.postits.clear();
    }

    fn post_it_mut(&mut self, id: &str) -> Result<&mut PostIt, SceneError> {
        self.postits
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| SceneError::PostItNotFound(id.to_string()))
    }
}

// =============================================================
// Queries
// =============================================================

impl Scene {
    /// Strokes in insertion order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Post-its in insertion order (later ones draw on top).
    #[must_use]
    pub fn post_its(&self) -> &[PostIt] {
        &self.postits
    }

    #[must_use]
    pub fn stroke(&self, id: &str) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn post_it(&self, id: &str) -> Option<&PostIt> {
        self.postits.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.postits.is_empty()
    }
}

// =============================================================
// Serialization
// =============================================================

impl Scene {
    /// The persisted form: `{ "strokes": [...], "postits": [...] }`.
    #[must_use]
    pub fn serialize(&self) -> Value {
        json!(self)
    }

    /// Restore a scene from persisted JSON.
    ///
    /// Accepts the full `{strokes, postits}` object, or a bare array of
    /// strokes as written by mini surfaces. Bare arrays may also carry
    /// flat post-it entries (`type: "postit"`) from older clients. Anything
    /// else yields an empty scene.
    #[must_use]
    pub fn deserialize(data: &Value) -> Scene {
        match data {
            Value::Object(map) => {
                let strokes = map.get("strokes").map(strokes_from_value).unwrap_or_default();
                let postits = map.get("postits").map(post_its_from_value).unwrap_or_default();
                Scene { strokes, postits }
            }
            Value::Array(entries) => {
                let (legacy, drawings): (Vec<&Value>, Vec<&Value>) = entries
                    .iter()
                    .partition(|e| e.get("type").and_then(Value::as_str) == Some("postit"));
                let postits = legacy.into_iter().filter_map(legacy_post_it_from_value).collect();
                Scene { strokes: collect_strokes(drawings.into_iter()), postits: dedupe_post_its(postits) }
            }
            Value::Null => Scene::default(),
            other => {
                warn!(kind = value_kind(other), "scene payload is neither object nor array; loading empty scene");
                Scene::default()
            }
        }
    }
}

/// Parse a bare stroke array. Non-arrays yield an empty list; entries without
/// usable points are dropped.
#[must_use]
pub fn strokes_from_value(data: &Value) -> Vec<Stroke> {
    match data {
        Value::Array(entries) => collect_strokes(entries.iter()),
        Value::Null => Vec::new(),
        other => {
            warn!(kind = value_kind(other), "stroke payload is not an array; using no strokes");
            Vec::new()
        }
    }
}

fn collect_strokes<'a>(entries: impl Iterator<Item = &'a Value>) -> Vec<Stroke> {
    dedupe_strokes(entries.filter_map(stroke_from_value).collect())
}

fn stroke_from_value(entry: &Value) -> Option<Stroke> {
    let Some(raw_points) = entry.get("points").and_then(Value::as_array) else {
        warn!("dropping stroke entry without a points array");
        return None;
    };
    let points = points_from_values(raw_points);
    if points.is_empty() {
        warn!("dropping stroke entry with no valid points");
        return None;
    }
    Some(Stroke {
        id: id_from_value(entry.get("id")),
        points,
        color: entry
            .get("color")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_STROKE_COLOR)
            .to_string(),
        width: entry
            .get("width")
            .and_then(Value::as_f64)
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(DEFAULT_STROKE_WIDTH),
        kind: StrokeKind::Drawing,
    })
}

fn points_from_values(raw: &[Value]) -> Vec<Point> {
    raw.iter()
        .filter_map(|v| match Point::deserialize(v) {
            Ok(p) if p.is_finite() => Some(p.with_pen(p.pressure, p.tilt_x, p.tilt_y)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "dropping malformed point");
                None
            }
        })
        .collect()
}

fn post_its_from_value(data: &Value) -> Vec<PostIt> {
    let Some(entries) = data.as_array() else {
        warn!(kind = value_kind(data), "post-it payload is not an array; using no post-its");
        return Vec::new();
    };
    dedupe_post_its(entries.iter().filter_map(post_it_from_value).collect())
}

fn post_it_from_value(entry: &Value) -> Option<PostIt> {
    let x = entry.get("x").and_then(Value::as_f64)?;
    let y = entry.get("y").and_then(Value::as_f64)?;
    let width = entry.get("width").and_then(Value::as_f64).unwrap_or(POSTIT_DEFAULT_WIDTH);
    let height = entry.get("height").and_then(Value::as_f64).unwrap_or(POSTIT_DEFAULT_HEIGHT);
    Some(build_post_it(entry, x, y, width, height, entry.get("drawing")))
}

/// Older clients stored post-its among the strokes, positioned by their first
/// point and sized by `postitSize: {w, h}`.
fn legacy_post_it_from_value(entry: &Value) -> Option<PostIt> {
    let origin = entry.get("points")?.as_array()?.first()?;
    let x = origin.get("x").and_then(Value::as_f64)?;
    let y = origin.get("y").and_then(Value::as_f64)?;
    let size = entry.get("postitSize");
    let width = size.and_then(|s| s.get("w")).and_then(Value::as_f64).unwrap_or(POSTIT_DEFAULT_WIDTH);
    let height = size.and_then(|s| s.get("h")).and_then(Value::as_f64).unwrap_or(POSTIT_DEFAULT_HEIGHT);
    Some(build_post_it(entry, x, y, width, height, entry.get("postitDrawing")))
}

fn build_post_it(entry: &Value, x: f64, y: f64, width: f64, height: f64, drawing: Option<&Value>) -> PostIt {
    let (width, height) = clamp_post_it_size(width, height);
    PostIt {
        id: id_from_value(entry.get("id")),
        x,
        y,
        width,
        height,
        color: entry
            .get("color")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_POSTIT_COLOR)
            .to_string(),
        drawing: drawing.map(strokes_from_value).unwrap_or_default(),
    }
}

/// Ids are strings, but older data used numeric timestamps. Missing ids get a fresh one.
fn id_from_value(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => new_id(),
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_stroke(existing: &[Stroke], stroke: &Stroke) -> Result<(), SceneError> {
    if stroke.points.is_empty() {
        return Err(SceneError::EmptyStroke(stroke.id.clone()));
    }
    if existing.iter().any(|s| s.id == stroke.id) {
        return Err(SceneError::DuplicateStrokeId(stroke.id.clone()));
    }
    Ok(())
}

fn dedupe_strokes(mut strokes: Vec<Stroke>) -> Vec<Stroke> {
    let mut seen = HashSet::with_capacity(strokes.len());
    strokes.retain(|stroke| {
        if stroke.points.is_empty() {
            warn!(id = %stroke.id, "dropping stroke with no points");
            return false;
        }
        if !seen.insert(stroke.id.clone()) {
            warn!(id = %stroke.id, "dropping stroke with duplicate id");
            return false;
        }
        true
    });
    strokes
}

fn dedupe_post_its(mut postits: Vec<PostIt>) -> Vec<PostIt> {
    let mut seen = HashSet::with_capacity(postits.len());
    postits.retain(|postit| {
        let fresh = seen.insert(postit.id.clone());
        if !fresh {
            warn!(id = %postit.id, "dropping post-it with duplicate id");
        }
        fresh
    });
    postits
}
