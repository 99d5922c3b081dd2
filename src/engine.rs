//! Drawing-surface engine: the tool state machine and the public surface API.
//!
//! [`EngineCore`] holds everything that does not depend on a browser: the
//! scene, viewport, UI state and the active gesture. Pointer handlers take
//! screen points, convert them to the logical plane, advance the gesture for
//! the active tool, and return the [`Action`]s the host may want to react to.
//! Committed scene mutations also notify every listener registered with
//! [`EngineCore::on_change`].
//!
//! [`Engine`] wraps a shared core together with the `<canvas>` element and its
//! 2D context. Other components never reach into it directly; they hold a
//! [`SurfaceHandle`], which exposes only the [`DrawingHandle`] capabilities.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::{ConfigError, SurfaceConfig, SurfaceKind, SurfaceSize};
use crate::consts::{DRAG_THRESHOLD, HIT_RADIUS, MIN_POINT_DISTANCE};
use crate::geom::{Point, Rect};
use crate::hit::{self, Hit, HitPart};
use crate::input::{InputState, LassoShape, StrokeTarget, Tool, UiState};
use crate::render::{self, DrawCmd, RenderStyle};
use crate::scene::{PostIt, Scene, SceneError, Stroke, clamp_post_it_size, strokes_from_value};
use crate::viewport::{ElementRect, Viewport, apply_pan, to_logical, to_screen};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    StrokeAdded(Stroke),
    StrokeRemoved { id: String },
    StrokesMoved { ids: Vec<String>, dx: f64, dy: f64 },
    PostItCreated(PostIt),
    PostItUpdated(PostIt),
    PostItDrawingChanged { id: String, stroke: Stroke },
    /// Selected stroke ids.
    SelectionChanged(Vec<String>),
    PostItSelectionChanged(Option<String>),
    ViewportChanged(Viewport),
    SceneReplaced,
    SceneCleared,
    RenderNeeded,
}

impl Action {
    /// Whether this action records a committed change to the scene.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::SelectionChanged(_) | Self::PostItSelectionChanged(_) | Self::ViewportChanged(_) | Self::RenderNeeded
        )
    }
}

/// Called with the surface's current strokes after every committed mutation.
pub type ChangeListener = Box<dyn FnMut(&[Stroke])>;

/// The save/restore capabilities other components are allowed to use.
pub trait DrawingHandle {
    /// Current strokes, for persistence.
    fn get_paths(&self) -> Vec<Stroke>;
    /// Replace the strokes with a previously saved drawing.
    fn set_paths(&mut self, strokes: Vec<Stroke>) -> Vec<Action>;
    /// Empty the scene, post-its included.
    fn clear(&mut self) -> Vec<Action>;
    /// Strokes currently selected, in scene order.
    fn selected_paths(&self) -> Vec<Stroke>;
}

// =============================================================
// EngineCore
// =============================================================

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    scene: Scene,
    viewport: Viewport,
    element: ElementRect,
    pub ui: UiState,
    pub input: InputState,
    config: SurfaceConfig,
    listeners: Vec<ChangeListener>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl EngineCore {
    /// Build a surface from its configuration, restoring `initial_paths`.
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        let viewport = match config.resolved_size() {
            SurfaceSize::Fixed { width, height } => Viewport::new(0.0, 0.0, width, height),
            SurfaceSize::Flex => Viewport::new(0.0, 0.0, 0.0, 0.0),
        };
        let tool = if config.tool.is_available_on(config.kind) {
            config.tool
        } else {
            warn!(tool = ?config.tool, kind = ?config.kind, "configured tool unavailable; using draw");
            Tool::Draw
        };
        let mut core = Self {
            scene: Scene::new(),
            viewport,
            element: ElementRect::default(),
            ui: UiState { tool, ..UiState::default() },
            input: InputState::Idle,
            config,
            listeners: Vec::new(),
        };
        let initial = std::mem::take(&mut core.config.initial_paths);
        core.scene = core.restrict(Scene::deserialize(&initial));
        info!(
            kind = ?core.config.kind,
            strokes = core.scene.strokes().len(),
            postits = core.scene.post_its().len(),
            "drawing surface created"
        );
        core
    }

    /// Register a listener for committed mutations.
    pub fn on_change(&mut self, listener: impl FnMut(&[Stroke]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Record the element's on-screen box. A flex surface adopts the first
    /// measurable size as its fixed viewport size.
    pub fn set_element_rect(&mut self, rect: ElementRect) {
        self.element = rect;
        if self.viewport.width <= 0.0 && rect.is_measurable() {
            self.viewport.width = rect.width;
            self.viewport.height = rect.height;
            debug!(width = rect.width, height = rect.height, "flex viewport resolved");
        }
    }

    // --- Tool / style ---

    /// Switch tools. An active gesture is committed first and the selection
    /// is cleared.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if !tool.is_available_on(self.config.kind) {
            warn!(?tool, kind = ?self.config.kind, "tool not available on this surface");
            return Vec::new();
        }
        if tool == self.ui.tool {
            return Vec::new();
        }
        let mut actions = self.finish_gesture();
        self.ui.tool = tool;
        actions.extend(self.clear_selection());
        actions.push(Action::RenderNeeded);
        debug!(?tool, "tool changed");
        actions
    }

    /// Colour for strokes started from now on.
    pub fn set_color(&mut self, color: &str) {
        color.clone_into(&mut self.config.color);
    }

    /// Width for strokes started from now on.
    ///
    /// # Errors
    ///
    /// `InvalidStrokeWidth` for non-positive or non-finite widths.
    pub fn set_width(&mut self, width: f64) -> Result<(), ConfigError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(ConfigError::InvalidStrokeWidth(width));
        }
        self.config.width = width;
        Ok(())
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            warn!(gesture = self.input.name(), "pointer-down during active gesture ignored");
            return Vec::new();
        }
        let p = self.logical(screen);
        if !p.is_finite() {
            warn!("non-finite pointer position ignored");
            return Vec::new();
        }
        match self.ui.tool {
            Tool::Draw => self.begin_stroke(p),
            Tool::Erase => {
                self.input = InputState::Erasing;
                self.erase_at(p)
            }
            Tool::Pan => {
                self.input = InputState::Panning { start_screen: screen, origin: self.viewport };
                Vec::new()
            }
            Tool::LassoSelect => self.begin_lasso(p),
            Tool::SingleSelect => self.begin_select(p),
            Tool::PostItCreate => self.create_post_it(p),
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        let p = self.logical(screen);
        if !p.is_finite() {
            return Vec::new();
        }
        let state = std::mem::take(&mut self.input);
        let (next, actions) = self.track(state, screen, p);
        self.input = next;
        actions
    }

    /// Finish the active gesture at `screen`.
    pub fn on_pointer_up(&mut self, screen: Point) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        // The release position counts as a last move, except for the eraser,
        // which would erase a second stroke at the same spot.
        let mut actions = if matches!(self.input, InputState::Erasing) {
            Vec::new()
        } else {
            self.on_pointer_move(screen)
        };
        actions.extend(self.finish_gesture());
        actions
    }

    /// Leaving the surface commits the gesture exactly like a release.
    pub fn on_pointer_leave(&mut self, screen: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            debug!(gesture = self.input.name(), "pointer left surface; committing gesture");
        }
        self.on_pointer_up(screen)
    }

    // --- Scene contract ---

    /// Replace strokes from persisted JSON. Non-arrays and malformed entries
    /// degrade to fewer (or no) strokes.
    pub fn set_paths_json(&mut self, data: &Value) -> Vec<Action> {
        self.set_paths(strokes_from_value(data))
    }

    /// Replace the whole scene, post-its included, from persisted JSON.
    pub fn load_scene(&mut self, data: &Value) -> Vec<Action> {
        self.input = InputState::Idle;
        self.scene = self.restrict(Scene::deserialize(data));
        self.ui.clear_selection();
        info!(strokes = self.scene.strokes().len(), postits = self.scene.post_its().len(), "scene loaded");
        self.emit(vec![Action::SceneReplaced, Action::RenderNeeded])
    }

    /// Replace one post-it's drawing, e.g. from an editor opened on the note.
    ///
    /// # Errors
    ///
    /// `PostItNotFound` if no post-it has this id.
    pub fn set_post_it_drawing(&mut self, id: &str, strokes: Vec<Stroke>) -> Result<Vec<Action>, SceneError> {
        self.scene.set_post_it_drawing(id, strokes)?;
        debug!(%id, "post-it drawing replaced");
        Ok(self.post_it_updated(id))
    }

    /// The persisted form: a bare stroke array for mini surfaces, the full
    /// `{strokes, postits}` object otherwise.
    #[must_use]
    pub fn serialize_scene(&self) -> Value {
        match self.config.kind {
            SurfaceKind::Full => self.scene.serialize(),
            SurfaceKind::Mini => json!(self.scene.strokes()),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn element(&self) -> ElementRect {
        self.element
    }

    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    /// Selected stroke ids in sorted order.
    #[must_use]
    pub fn selection(&self) -> Vec<String> {
        self.ui.selected_ids.iter().cloned().collect()
    }

    #[must_use]
    pub fn selected_post_it(&self) -> Option<&str> {
        self.ui.selected_post_it.as_deref()
    }

    /// Client coordinates of a logical point, e.g. to place a DOM editor over a post-it.
    #[must_use]
    pub fn to_screen(&self, logical: Point) -> Point {
        to_screen(logical, &self.viewport, &self.element)
    }

    /// Project the current state, including live previews, into draw commands.
    #[must_use]
    pub fn display_list(&self) -> Vec<DrawCmd> {
        render::build_display_list(&self.scene, &self.viewport, &self.ui, &self.input, &RenderStyle::from_config(&self.config))
    }
}

// =============================================================
// Gesture handling
// =============================================================

impl EngineCore {
    fn logical(&self, screen: Point) -> Point {
        to_logical(screen, &self.viewport, &self.element)
    }

    fn begin_stroke(&mut self, p: Point) -> Vec<Action> {
        let (target, local) = match hit::top_post_it_at(&p, self.scene.post_its()) {
            Some(note) => (StrokeTarget::PostIt(note.id.clone()), note.to_local(p)),
            None => (StrokeTarget::Main, p),
        };
        let stroke = Stroke::new(local, self.config.color.clone(), self.config.width);
        debug!(id = %stroke.id, ?target, "stroke started");
        self.input = InputState::DrawingStroke { target, stroke, start: local, travelled: false };
        vec![Action::RenderNeeded]
    }

    fn begin_lasso(&mut self, p: Point) -> Vec<Action> {
        let on_selection = self
            .scene
            .strokes()
            .iter()
            .any(|s| self.ui.is_selected(&s.id) && hit::near_stroke(&p, s, HIT_RADIUS));
        if on_selection {
            self.input = InputState::LassoDraggingSelection { start: p, dx: 0.0, dy: 0.0 };
            return Vec::new();
        }
        let mut actions = self.clear_selection();
        self.input = InputState::LassoRubberBand { start: p, current: p, path: vec![p] };
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_select(&mut self, p: Point) -> Vec<Action> {
        let Some(Hit { id, part }) = hit::hit_test(&p, &self.scene, self.config.hit_priority) else {
            let mut actions = self.clear_selection();
            actions.push(Action::RenderNeeded);
            return actions;
        };
        match part {
            HitPart::ResizeHandle | HitPart::PostItBody => {
                let Some((x, y, width, height)) = self.scene.post_it(&id).map(|n| (n.x, n.y, n.width, n.height)) else {
                    return Vec::new();
                };
                let mut actions = self.select_post_it(&id);
                self.input = if part == HitPart::ResizeHandle {
                    InputState::PostItResizing { id, start: p, orig_width: width, orig_height: height, width, height }
                } else {
                    InputState::PostItDragging { id, grab_dx: p.x - x, grab_dy: p.y - y, x, y }
                };
                actions.push(Action::RenderNeeded);
                actions
            }
            HitPart::Stroke => {
                // Grabbing an already selected stroke drags the whole selection.
                let mut actions = if self.ui.is_selected(&id) { Vec::new() } else { self.select_stroke(&id) };
                self.input = InputState::SingleSelectDragging { start: p, dx: 0.0, dy: 0.0 };
                actions.push(Action::RenderNeeded);
                actions
            }
        }
    }

    fn create_post_it(&mut self, p: Point) -> Vec<Action> {
        let note = PostIt::new(p.x, p.y, self.config.postit_color.clone());
        let mut actions = self.clear_selection();
        self.scene.upsert_post_it(note.clone());
        debug!(id = %note.id, x = note.x, y = note.y, "post-it created");
        actions.push(Action::PostItCreated(note));
        actions.push(Action::RenderNeeded);
        self.emit(actions)
    }

    /// Advance `state` to pointer position `p` (logical) / `screen`.
    fn track(&mut self, state: InputState, screen: Point, p: Point) -> (InputState, Vec<Action>) {
        match state {
            InputState::Idle => (InputState::Idle, Vec::new()),
            InputState::DrawingStroke { target, mut stroke, start, mut travelled } => {
                let local = match &target {
                    StrokeTarget::Main => p,
                    StrokeTarget::PostIt(id) => self.scene.post_it(id).map_or(p, |note| note.to_local(p)),
                };
                if local.distance(&start) > DRAG_THRESHOLD {
                    travelled = true;
                }
                let mut actions = Vec::new();
                if stroke.points.last().is_none_or(|last| local.distance(last) > MIN_POINT_DISTANCE) {
                    stroke.points.push(local);
                    actions.push(Action::RenderNeeded);
                }
                (InputState::DrawingStroke { target, stroke, start, travelled }, actions)
            }
            InputState::Erasing => (InputState::Erasing, self.erase_at(p)),
            InputState::Panning { start_screen, origin } => {
                let next = apply_pan(&origin, screen.x - start_screen.x, screen.y - start_screen.y, &self.element);
                let actions = if next == self.viewport {
                    Vec::new()
                } else {
                    self.viewport = next;
                    vec![Action::ViewportChanged(next), Action::RenderNeeded]
                };
                (InputState::Panning { start_screen, origin }, actions)
            }
            InputState::LassoRubberBand { start, mut path, .. } => {
                if path.last().is_none_or(|last| last.distance(&p) > MIN_POINT_DISTANCE) {
                    path.push(p);
                }
                let selected = match self.config.lasso {
                    LassoShape::Rect => hit::strokes_in_rect(self.scene.strokes(), &Rect::from_corners(start, p)),
                    LassoShape::Freeform => hit::strokes_in_polygon(self.scene.strokes(), &path),
                };
                let mut actions = self.set_selection(selected);
                actions.push(Action::RenderNeeded);
                (InputState::LassoRubberBand { start, current: p, path }, actions)
            }
            InputState::LassoDraggingSelection { start, .. } => (
                InputState::LassoDraggingSelection { start, dx: p.x - start.x, dy: p.y - start.y },
                vec![Action::RenderNeeded],
            ),
            InputState::SingleSelectDragging { start, .. } => (
                InputState::SingleSelectDragging { start, dx: p.x - start.x, dy: p.y - start.y },
                vec![Action::RenderNeeded],
            ),
            InputState::PostItDragging { id, grab_dx, grab_dy, .. } => (
                InputState::PostItDragging { id, grab_dx, grab_dy, x: p.x - grab_dx, y: p.y - grab_dy },
                vec![Action::RenderNeeded],
            ),
            InputState::PostItResizing { id, start, orig_width, orig_height, .. } => {
                let (width, height) = clamp_post_it_size(orig_width + p.x - start.x, orig_height + p.y - start.y);
                (
                    InputState::PostItResizing { id, start, orig_width, orig_height, width, height },
                    vec![Action::RenderNeeded],
                )
            }
        }
    }

    /// Commit and end the active gesture.
    fn finish_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        let gesture = state.name();
        let actions = match state {
            InputState::Idle => return Vec::new(),
            InputState::DrawingStroke { target, mut stroke, travelled, .. } => {
                if self.config.kind == SurfaceKind::Mini && !travelled {
                    stroke.points.truncate(1);
                }
                self.commit_stroke(target, stroke)
            }
            InputState::Erasing => self.clear_selection(),
            InputState::Panning { .. } => {
                debug!(origin = ?self.viewport.origin(), "pan finished");
                Vec::new()
            }
            InputState::LassoRubberBand { .. } => {
                debug!(selected = self.ui.selected_ids.len(), "lasso selection finished");
                vec![Action::RenderNeeded]
            }
            InputState::LassoDraggingSelection { dx, dy, .. } | InputState::SingleSelectDragging { dx, dy, .. } => {
                self.commit_translation(dx, dy)
            }
            InputState::PostItDragging { id, x, y, .. } => match self.scene.move_post_it(&id, x, y) {
                Ok(()) => self.post_it_updated(&id),
                Err(e) => {
                    warn!(error = %e, "post-it vanished during drag");
                    vec![Action::RenderNeeded]
                }
            },
            InputState::PostItResizing { id, width, height, .. } => match self.scene.resize_post_it(&id, width, height) {
                Ok(()) => self.post_it_updated(&id),
                Err(e) => {
                    warn!(error = %e, "post-it vanished during resize");
                    vec![Action::RenderNeeded]
                }
            },
        };
        debug!(gesture, "gesture finished");
        actions
    }

    fn commit_stroke(&mut self, target: StrokeTarget, stroke: Stroke) -> Vec<Action> {
        let mut actions = self.clear_selection();
        let id = stroke.id.clone();
        let points = stroke.points.len();
        let result = match target {
            StrokeTarget::Main => self.scene.append_stroke(stroke.clone()).map(|()| Action::StrokeAdded(stroke)),
            StrokeTarget::PostIt(postit_id) => self
                .scene
                .append_post_it_stroke(&postit_id, stroke.clone())
                .map(|()| Action::PostItDrawingChanged { id: postit_id, stroke }),
        };
        match result {
            Ok(action) => {
                debug!(%id, points, "stroke committed");
                actions.push(action);
            }
            Err(e) => error!(error = %e, "stroke rejected"),
        }
        actions.push(Action::RenderNeeded);
        self.emit(actions)
    }

    fn commit_translation(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
            return vec![Action::RenderNeeded];
        }
        let ids: Vec<String> = self
            .ui
            .selected_ids
            .iter()
            .filter(|id| self.scene.stroke(id).is_some())
            .cloned()
            .collect();
        if self.scene.translate_strokes(&ids, dx, dy) == 0 {
            return vec![Action::RenderNeeded];
        }
        debug!(count = ids.len(), dx, dy, "selection moved");
        self.emit(vec![Action::StrokesMoved { ids, dx, dy }, Action::RenderNeeded])
    }

    fn post_it_updated(&mut self, id: &str) -> Vec<Action> {
        match self.scene.post_it(id).cloned() {
            Some(note) => self.emit(vec![Action::PostItUpdated(note), Action::RenderNeeded]),
            None => vec![Action::RenderNeeded],
        }
    }

    /// Remove the stroke under `p`, if any. Post-its are never erased.
    fn erase_at(&mut self, p: Point) -> Vec<Action> {
        let Some(id) = hit::stroke_at(&p, self.scene.strokes(), self.config.hit_priority).map(|s| s.id.clone()) else {
            return Vec::new();
        };
        self.scene.remove_stroke(&id);
        self.ui.selected_ids.remove(&id);
        debug!(%id, "stroke erased");
        self.emit(vec![Action::StrokeRemoved { id }, Action::RenderNeeded])
    }

    fn set_selection(&mut self, ids: impl IntoIterator<Item = String>) -> Vec<Action> {
        let next = ids.into_iter().collect();
        let mut actions = self.deselect_post_it();
        if next != self.ui.selected_ids {
            self.ui.selected_ids = next;
            actions.push(Action::SelectionChanged(self.selection()));
        }
        actions
    }

    fn select_stroke(&mut self, id: &str) -> Vec<Action> {
        let mut actions = self.deselect_post_it();
        self.ui.select_only(id);
        actions.push(Action::SelectionChanged(self.selection()));
        actions
    }

    fn select_post_it(&mut self, id: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.ui.selected_ids.is_empty() {
            actions.push(Action::SelectionChanged(Vec::new()));
        }
        if !self.ui.is_post_it_selected(id) {
            actions.push(Action::PostItSelectionChanged(Some(id.to_string())));
        }
        self.ui.select_post_it(id);
        actions
    }

    fn deselect_post_it(&mut self) -> Vec<Action> {
        match self.ui.selected_post_it.take() {
            Some(_) => vec![Action::PostItSelectionChanged(None)],
            None => Vec::new(),
        }
    }

    fn clear_selection(&mut self) -> Vec<Action> {
        self.set_selection(std::iter::empty())
    }

    /// Mini surfaces never hold post-its.
    fn restrict(&self, mut scene: Scene) -> Scene {
        if self.config.kind == SurfaceKind::Mini && !scene.post_its().is_empty() {
            warn!(count = scene.post_its().len(), "mini surface dropping post-its from loaded data");
            let ids: Vec<String> = scene.post_its().iter().map(|p| p.id.clone()).collect();
            for id in &ids {
                scene.remove_post_it(id);
            }
        }
        scene
    }

    /// Notify listeners if any action is a committed mutation.
    fn emit(&mut self, actions: Vec<Action>) -> Vec<Action> {
        if actions.iter().any(Action::is_mutation) {
            for listener in &mut self.listeners {
                listener(self.scene.strokes());
            }
        }
        actions
    }
}

impl DrawingHandle for EngineCore {
    fn get_paths(&self) -> Vec<Stroke> {
        self.scene.strokes().to_vec()
    }

    fn set_paths(&mut self, strokes: Vec<Stroke>) -> Vec<Action> {
        if !self.input.is_idle() {
            debug!(gesture = self.input.name(), "set_paths dropped the active gesture");
        }
        self.input = InputState::Idle;
        self.scene.replace_strokes(strokes);
        self.ui.clear_selection();
        info!(strokes = self.scene.strokes().len(), "paths restored");
        self.emit(vec![Action::SceneReplaced, Action::RenderNeeded])
    }

    fn clear(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        let was_empty = self.scene.is_empty();
        self.scene.clear();
        self.ui.clear_selection();
        info!(was_empty, "surface cleared");
        self.emit(vec![Action::SceneCleared, Action::RenderNeeded])
    }

    fn selected_paths(&self) -> Vec<Stroke> {
        self.scene.strokes().iter().filter(|s| self.ui.is_selected(&s.id)).cloned().collect()
    }
}

// =============================================================
// SurfaceHandle
// =============================================================

/// Shared capability handle to one surface.
///
/// Cloning is cheap; every clone talks to the same surface. Calls made while
/// the surface is busy (for example from inside a change listener) are
/// ignored with a warning rather than re-entering it.
#[derive(Clone)]
pub struct SurfaceHandle {
    core: Rc<RefCell<EngineCore>>,
}

impl SurfaceHandle {
    #[must_use]
    pub fn new(core: EngineCore) -> Self {
        Self { core: Rc::new(RefCell::new(core)) }
    }

    /// Run `f` against the surface. `None` if the surface is already borrowed.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut EngineCore) -> R) -> Option<R> {
        match self.core.try_borrow_mut() {
            Ok(mut core) => Some(f(&mut core)),
            Err(_) => {
                warn!("drawing surface busy; call ignored");
                None
            }
        }
    }

    fn read<R: Default>(&self, f: impl FnOnce(&EngineCore) -> R) -> R {
        match self.core.try_borrow() {
            Ok(core) => f(&core),
            Err(_) => {
                warn!("drawing surface busy; returning empty result");
                R::default()
            }
        }
    }
}

impl DrawingHandle for SurfaceHandle {
    fn get_paths(&self) -> Vec<Stroke> {
        self.read(|core| core.get_paths())
    }

    fn set_paths(&mut self, strokes: Vec<Stroke>) -> Vec<Action> {
        self.with_core(|core| core.set_paths(strokes)).unwrap_or_default()
    }

    fn clear(&mut self) -> Vec<Action> {
        self.with_core(|core| core.clear()).unwrap_or_default()
    }

    fn selected_paths(&self) -> Vec<Stroke> {
        self.read(|core| core.selected_paths())
    }
}

// =============================================================
// Engine
// =============================================================

/// The full drawing engine. Owns the browser canvas element and a shared core.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    core: SurfaceHandle,
    dpr: f64,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, config: SurfaceConfig) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let engine = Self { canvas, ctx, core: SurfaceHandle::new(EngineCore::new(config)), dpr };
        engine.measure();
        Ok(engine)
    }

    /// A capability handle for other components.
    #[must_use]
    pub fn handle(&self) -> SurfaceHandle {
        self.core.clone()
    }

    /// Re-read the canvas's bounding box, e.g. after a layout change.
    pub fn measure(&self) {
        let r = self.canvas.get_bounding_client_rect();
        let rect = ElementRect::new(r.left(), r.top(), r.width(), r.height());
        if self.core.with_core(|core| core.set_element_rect(rect)).is_none() {
            warn!("element rect not updated");
        }
    }

    pub fn on_change(&self, listener: impl FnMut(&[Stroke]) + 'static) {
        if self.core.with_core(|core| core.on_change(listener)).is_none() {
            warn!("change listener not registered");
        }
    }

    // --- Delegated input ---

    pub fn set_tool(&self, tool: Tool) -> Vec<Action> {
        self.core.with_core(|core| core.set_tool(tool)).unwrap_or_default()
    }

    pub fn set_color(&self, color: &str) {
        if self.core.with_core(|core| core.set_color(color)).is_none() {
            warn!("stroke colour not updated");
        }
    }

    /// # Errors
    ///
    /// `InvalidStrokeWidth` for non-positive or non-finite widths.
    pub fn set_width(&self, width: f64) -> Result<(), ConfigError> {
        self.core.with_core(|core| core.set_width(width)).unwrap_or(Ok(()))
    }

    pub fn on_pointer_down(&self, screen: Point) -> Vec<Action> {
        self.core.with_core(|core| core.on_pointer_down(screen)).unwrap_or_default()
    }

    pub fn on_pointer_move(&self, screen: Point) -> Vec<Action> {
        self.core.with_core(|core| core.on_pointer_move(screen)).unwrap_or_default()
    }

    pub fn on_pointer_up(&self, screen: Point) -> Vec<Action> {
        self.core.with_core(|core| core.on_pointer_up(screen)).unwrap_or_default()
    }

    pub fn on_pointer_leave(&self, screen: Point) -> Vec<Action> {
        self.core.with_core(|core| core.on_pointer_leave(screen)).unwrap_or_default()
    }

    pub fn set_paths_json(&self, data: &Value) -> Vec<Action> {
        self.core.with_core(|core| core.set_paths_json(data)).unwrap_or_default()
    }

    pub fn load_scene(&self, data: &Value) -> Vec<Action> {
        self.core.with_core(|core| core.load_scene(data)).unwrap_or_default()
    }

    #[must_use]
    pub fn serialize_scene(&self) -> Value {
        self.core.read(EngineCore::serialize_scene)
    }

    /// `None` while the surface is busy.
    #[must_use]
    pub fn to_screen(&self, logical: Point) -> Option<Point> {
        self.core.read(|core| Some(core.to_screen(logical)))
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let Some((list, viewport, element)) =
            self.core.with_core(|core| (core.display_list(), core.viewport(), core.element()))
        else {
            return Ok(());
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let backing = |css: f64| (css * self.dpr).round().max(0.0) as u32;
        if self.canvas.width() != backing(element.width) {
            self.canvas.set_width(backing(element.width));
        }
        if self.canvas.height() != backing(element.height) {
            self.canvas.set_height(backing(element.height));
        }
        render::paint(&self.ctx, &list, &viewport, &element, self.dpr)
    }
}
