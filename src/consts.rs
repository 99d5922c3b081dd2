//! Shared numeric constants for the drawing surface.

// ── Hit-testing ─────────────────────────────────────────────────

/// Half-width of the square around each stroke point that counts as a hit.
pub const HIT_RADIUS: f64 = 20.0;

/// Side length of the square resize handle in a post-it's bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f64 = 16.0;

// ── Input ───────────────────────────────────────────────────────

/// A pointer-move closer than this to the last recorded point is dropped.
pub const MIN_POINT_DISTANCE: f64 = 2.0;

/// Travel below which a mini-surface stroke collapses back to a dot.
pub const DRAG_THRESHOLD: f64 = 5.0;

// ── Post-its ────────────────────────────────────────────────────

pub const POSTIT_DEFAULT_WIDTH: f64 = 200.0;
pub const POSTIT_DEFAULT_HEIGHT: f64 = 150.0;
pub const POSTIT_MIN_WIDTH: f64 = 60.0;
pub const POSTIT_MIN_HEIGHT: f64 = 40.0;

/// Gap between a post-it's border and its embedded drawing area.
pub const POSTIT_INSET: f64 = 4.0;

// ── Strokes ─────────────────────────────────────────────────────

pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Catmull-Rom samples generated between two captured points.
pub const DEFAULT_SMOOTHING_SAMPLES: usize = 8;

// ── Viewport / grid ─────────────────────────────────────────────

/// Logical size of a full surface's viewport.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 2000.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 900.0;

pub const GRID_SPACING: f64 = 50.0;

/// Upper bound on grid lines drawn per axis, whatever the viewport.
pub const MAX_GRID_LINES: usize = 200;
