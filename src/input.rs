//! Input model: tools, the gesture state machine, and UI state.
//!
//! `Tool` is the user's chosen mode. `InputState` is the single gesture being
//! tracked between pointer-down and pointer-up, carrying everything needed to
//! render a live preview and to commit the final scene mutation on release.
//! `UiState` is the persistent, non-serialized state the renderer reads.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::config::SurfaceKind;
use crate::geom::Point;
use crate::scene::Stroke;
use crate::viewport::Viewport;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    /// Freehand drawing (default).
    #[default]
    Draw,
    /// Remove whole strokes by touching them.
    #[serde(alias = "eraser")]
    Erase,
    /// Drag the viewport.
    #[serde(alias = "move")]
    Pan,
    /// Rubber-band multi-select, then drag the selection.
    #[serde(alias = "lasso")]
    LassoSelect,
    /// Click to pick one item and drag or resize it.
    #[serde(alias = "select")]
    SingleSelect,
    /// Click to drop a new post-it.
    #[serde(alias = "postit", alias = "postitCreate")]
    PostItCreate,
}

impl Tool {
    /// Whether this tool exists on the given kind of surface.
    ///
    /// Mini surfaces only draw and erase.
    #[must_use]
    pub fn is_available_on(self, kind: SurfaceKind) -> bool {
        match kind {
            SurfaceKind::Full => true,
            SurfaceKind::Mini => matches!(self, Self::Draw | Self::Erase),
        }
    }

    /// Parse a tool name as sent by the host toolbar.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "draw" => Some(Self::Draw),
            "erase" | "eraser" => Some(Self::Erase),
            "pan" | "move" => Some(Self::Pan),
            "lasso" | "lassoSelect" => Some(Self::LassoSelect),
            "select" | "singleSelect" => Some(Self::SingleSelect),
            "postit" | "postitCreate" | "postItCreate" => Some(Self::PostItCreate),
            _ => None,
        }
    }
}

/// Region shape used by the lasso tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LassoShape {
    /// Axis-aligned rectangle between the start and current point.
    #[default]
    Rect,
    /// Closed polygon traced by the pointer.
    Freeform,
}

/// Where a stroke being drawn will land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeTarget {
    /// The surface's own stroke list.
    Main,
    /// The embedded drawing of the post-it with this id (local coordinates).
    PostIt(String),
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Selected stroke ids. Never serialized.
    pub selected_ids: BTreeSet<String>,
    /// The selected post-it. Post-it ids are a separate namespace from
    /// stroke ids, so a note never shares a slot with `selected_ids`.
    pub selected_post_it: Option<String>,
}

impl UiState {
    /// Replace the selection with exactly one stroke.
    pub fn select_only(&mut self, id: &str) {
        self.selected_ids.clear();
        self.selected_ids.insert(id.to_string());
        self.selected_post_it = None;
    }

    /// Select one post-it and drop any stroke selection.
    pub fn select_post_it(&mut self, id: &str) {
        self.selected_ids.clear();
        self.selected_post_it = Some(id.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
        self.selected_post_it = None;
    }

    /// Whether the stroke with this id is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.contains(id)
    }

    #[must_use]
    pub fn is_post_it_selected(&self, id: &str) -> bool {
        self.selected_post_it.as_deref() == Some(id)
    }
}

/// The active gesture. At most one exists per surface.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A stroke is being captured.
    DrawingStroke {
        target: StrokeTarget,
        /// The in-progress stroke, in the target's coordinate frame.
        stroke: Stroke,
        /// First captured point, used for the mini-surface tap check.
        start: Point,
        /// Whether the pointer ever left the drag threshold around `start`.
        travelled: bool,
    },
    /// The eraser button is held; every move erases again.
    Erasing,
    /// The viewport is being dragged.
    Panning {
        /// Screen position of the pointer-down.
        start_screen: Point,
        /// Viewport at pointer-down; pans are applied relative to it.
        origin: Viewport,
    },
    /// A selection region is being traced.
    LassoRubberBand {
        start: Point,
        current: Point,
        /// Pointer path, used for freeform lassos.
        path: Vec<Point>,
    },
    /// The lasso selection is being dragged. The offset is preview only.
    LassoDraggingSelection { start: Point, dx: f64, dy: f64 },
    /// The select tool is dragging its selected strokes. Preview only.
    SingleSelectDragging { start: Point, dx: f64, dy: f64 },
    /// A post-it is being moved.
    PostItDragging {
        id: String,
        /// Pointer position relative to the note's top-left corner at grab time.
        grab_dx: f64,
        grab_dy: f64,
        /// Preview position.
        x: f64,
        y: f64,
    },
    /// A post-it is being resized from its bottom-right handle.
    PostItResizing {
        id: String,
        start: Point,
        orig_width: f64,
        orig_height: f64,
        /// Preview size, already clamped.
        width: f64,
        height: f64,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DrawingStroke { .. } => "drawing-stroke",
            Self::Erasing => "erasing",
            Self::Panning { .. } => "panning",
            Self::LassoRubberBand { .. } => "lasso-rubber-band",
            Self::LassoDraggingSelection { .. } => "lasso-dragging-selection",
            Self::SingleSelectDragging { .. } => "single-select-dragging",
            Self::PostItDragging { .. } => "postit-dragging",
            Self::PostItResizing { .. } => "postit-resizing",
        }
    }

    /// Live offset applied to selected strokes while dragging, if any.
    #[must_use]
    pub fn selection_offset(&self) -> Option<(f64, f64)> {
        match self {
            Self::LassoDraggingSelection { dx, dy, .. } | Self::SingleSelectDragging { dx, dy, .. } => Some((*dx, *dy)),
            _ => None,
        }
    }
}
