//! Rendering: projects the scene and the active gesture into draw commands,
//! then paints them to a 2D context.
//!
//! [`build_display_list`] is pure and works in logical coordinates, so what
//! gets drawn can be tested without a browser. [`paint`] is the only place
//! that touches [`web_sys::CanvasRenderingContext2d`]; it installs the
//! viewport transform and replays the list. Neither mutates application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::config::SurfaceConfig;
use crate::consts::{GRID_SPACING, MAX_GRID_LINES, POSTIT_INSET};
use crate::geom::{Point, Rect};
use crate::input::{InputState, LassoShape, StrokeTarget, UiState};
use crate::scene::{PostIt, Scene, Stroke};
use crate::smooth::smooth;
use crate::theme::Palette;
use crate::viewport::{ElementRect, Viewport, scale};

/// Opacity multiplier for selected strokes.
const SELECTED_STROKE_ALPHA: f64 = 0.5;
/// Opacity of a selected post-it.
const SELECTED_POSTIT_ALPHA: f64 = 0.7;
/// Marquee dash segment length in logical units.
const MARQUEE_DASH: f64 = 6.0;
const GRID_LINE_WIDTH: f64 = 1.0;
const OUTLINE_WIDTH: f64 = 1.0;
/// Blur radius in pixels per degree of average horizontal pen tilt.
const TILT_BLUR: f64 = 0.2;

/// One drawing primitive in logical coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Fill the visible viewport.
    Background { color: String },
    /// A straight grid line.
    Line { from: Point, to: Point, color: String, width: f64 },
    /// A smoothed stroke. `blur` is a filter radius in pixels, 0 for none.
    Polyline { points: Vec<Point>, color: String, width: f64, alpha: f64, blur: f64 },
    /// A single-point stroke.
    Dot { center: Point, radius: f64, color: String, alpha: f64, blur: f64 },
    Box { rect: Rect, fill: Option<String>, stroke: Option<String>, alpha: f64, dashed: bool },
    /// A closed outline, used for the freeform lasso.
    Polygon { points: Vec<Point>, color: String, dashed: bool },
    /// Restrict following commands to `rect` until the matching `PopClip`.
    PushClip(Rect),
    PopClip,
}

/// Everything about appearance that comes from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub palette: Palette,
    pub samples: usize,
    pub show_grid: bool,
    pub lasso: LassoShape,
}

impl RenderStyle {
    #[must_use]
    pub fn from_config(config: &SurfaceConfig) -> Self {
        Self {
            palette: config.theme.palette(),
            samples: config.smoothing_samples,
            show_grid: config.grid_enabled(),
            lasso: config.lasso,
        }
    }
}

/// Build the full frame: background, grid, strokes, post-its, the stroke in
/// progress and the lasso outline, bottom first.
#[must_use]
pub fn build_display_list(
    scene: &Scene,
    viewport: &Viewport,
    ui: &UiState,
    input: &InputState,
    style: &RenderStyle,
) -> Vec<DrawCmd> {
    let mut out = vec![DrawCmd::Background { color: style.palette.background.to_string() }];

    if style.show_grid {
        push_grid(&mut out, viewport, style.palette.grid);
    }

    let (dx, dy) = input.selection_offset().unwrap_or((0.0, 0.0));
    for stroke in scene.strokes() {
        if ui.is_selected(&stroke.id) {
            push_stroke(&mut out, stroke, dx, dy, SELECTED_STROKE_ALPHA, style.samples);
        } else {
            push_stroke(&mut out, stroke, 0.0, 0.0, 1.0, style.samples);
        }
    }

    for note in scene.post_its() {
        let note = preview_post_it(note, input);
        let alpha = if ui.is_post_it_selected(&note.id) { SELECTED_POSTIT_ALPHA } else { 1.0 };
        push_post_it(&mut out, &note, alpha, style);
    }

    if let InputState::DrawingStroke { target, stroke, .. } = input {
        let (ox, oy) = match target {
            StrokeTarget::Main => (0.0, 0.0),
            StrokeTarget::PostIt(id) => scene
                .post_it(id)
                .map(|n| preview_post_it(n, input))
                .map_or((0.0, 0.0), |n| (n.x, n.y)),
        };
        push_stroke(&mut out, stroke, ox, oy, 1.0, style.samples);
    }

    if let InputState::LassoRubberBand { start, current, path } = input {
        let color = style.palette.marquee.to_string();
        match style.lasso {
            LassoShape::Rect => out.push(DrawCmd::Box {
                rect: Rect::from_corners(*start, *current),
                fill: None,
                stroke: Some(color),
                alpha: 1.0,
                dashed: true,
            }),
            LassoShape::Freeform => out.push(DrawCmd::Polygon { points: path.clone(), color, dashed: true }),
        }
    }

    out
}

/// Grid lines on multiples of the spacing that fall inside the viewport.
fn push_grid(out: &mut Vec<DrawCmd>, viewport: &Viewport, color: &str) {
    let right = viewport.x + viewport.width;
    let bottom = viewport.y + viewport.height;

    let mut x = (viewport.x / GRID_SPACING).ceil() * GRID_SPACING;
    let mut count = 0;
    while x <= right && count < MAX_GRID_LINES {
        out.push(DrawCmd::Line {
            from: Point::new(x, viewport.y),
            to: Point::new(x, bottom),
            color: color.to_string(),
            width: GRID_LINE_WIDTH,
        });
        x += GRID_SPACING;
        count += 1;
    }

    let mut y = (viewport.y / GRID_SPACING).ceil() * GRID_SPACING;
    count = 0;
    while y <= bottom && count < MAX_GRID_LINES {
        out.push(DrawCmd::Line {
            from: Point::new(viewport.x, y),
            to: Point::new(right, y),
            color: color.to_string(),
            width: GRID_LINE_WIDTH,
        });
        y += GRID_SPACING;
        count += 1;
    }
}

/// A stroke shifted by `(dx, dy)`. Width follows the average pen pressure and
/// opacity is `0.5 + 0.5 * pressure`, times `alpha`. Tilting the pen softens
/// the edge.
fn push_stroke(out: &mut Vec<DrawCmd>, stroke: &Stroke, dx: f64, dy: f64, alpha: f64, samples: usize) {
    let pressure = stroke.average_pressure();
    let width = stroke.width * pressure;
    let alpha = (0.5 + 0.5 * pressure).min(1.0) * alpha;
    let blur = stroke.average_tilt_x().abs() * TILT_BLUR;
    let color = stroke.color.clone();

    match stroke.points.as_slice() {
        [] => {}
        [only] => out.push(DrawCmd::Dot { center: only.offset(dx, dy), radius: width / 2.0, color, alpha, blur }),
        points => {
            let points = smooth(points, samples).into_iter().map(|p| p.offset(dx, dy)).collect();
            out.push(DrawCmd::Polyline { points, color, width, alpha, blur });
        }
    }
}

fn push_post_it(out: &mut Vec<DrawCmd>, note: &PostIt, alpha: f64, style: &RenderStyle) {
    let palette = &style.palette;
    out.push(DrawCmd::Box {
        rect: note.rect(),
        fill: Some(note.color.clone()),
        stroke: Some(palette.postit_border.to_string()),
        alpha,
        dashed: false,
    });

    let content = Rect::new(
        note.x + POSTIT_INSET,
        note.y + POSTIT_INSET,
        (note.width - 2.0 * POSTIT_INSET).max(0.0),
        (note.height - 2.0 * POSTIT_INSET).max(0.0),
    );
    out.push(DrawCmd::PushClip(content));
    for stroke in &note.drawing {
        push_stroke(out, stroke, note.x, note.y, alpha, style.samples);
    }
    out.push(DrawCmd::PopClip);

    out.push(DrawCmd::Box {
        rect: note.handle_rect(),
        fill: Some(palette.handle_fill.to_string()),
        stroke: Some(palette.handle_stroke.to_string()),
        alpha,
        dashed: false,
    });
}

/// The post-it as it should appear right now, with any live move or resize.
fn preview_post_it(note: &PostIt, input: &InputState) -> PostIt {
    let mut note = note.clone();
    match input {
        InputState::PostItDragging { id, x, y, .. } if *id == note.id => {
            note.x = *x;
            note.y = *y;
        }
        InputState::PostItResizing { id, width, height, .. } if *id == note.id => {
            note.width = *width;
            note.height = *height;
        }
        _ => {}
    }
    note
}

// =============================================================
// Canvas output
// =============================================================

/// Replay `list` onto the canvas with the viewport transform applied.
///
/// `element` is in CSS pixels and `dpr` is the device pixel ratio. Nothing
/// is drawn until both the element and the viewport have a size.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn paint(
    ctx: &CanvasRenderingContext2d,
    list: &[DrawCmd],
    viewport: &Viewport,
    element: &ElementRect,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, element.width, element.height);
    if !element.is_measurable() || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return Ok(());
    }

    // Logical units per CSS pixel; invert to map the viewport onto the element.
    let (sx, sy) = scale(viewport, element);
    let a = dpr / sx;
    let d = dpr / sy;
    ctx.set_transform(a, 0.0, 0.0, d, -viewport.x * a, -viewport.y * d)?;
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    for cmd in list {
        paint_cmd(ctx, cmd, viewport)?;
    }
    ctx.set_global_alpha(1.0);
    Ok(())
}

fn paint_cmd(ctx: &CanvasRenderingContext2d, cmd: &DrawCmd, viewport: &Viewport) -> Result<(), JsValue> {
    match cmd {
        DrawCmd::Background { color } => {
            ctx.set_global_alpha(1.0);
            ctx.set_fill_style_str(color);
            ctx.fill_rect(viewport.x, viewport.y, viewport.width, viewport.height);
        }
        DrawCmd::Line { from, to, color, width } => {
            ctx.set_global_alpha(1.0);
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(*width);
            ctx.begin_path();
            ctx.move_to(from.x, from.y);
            ctx.line_to(to.x, to.y);
            ctx.stroke();
        }
        DrawCmd::Polyline { points, color, width, alpha, blur } => {
            ctx.set_global_alpha(*alpha);
            set_blur(ctx, *blur);
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(*width);
            trace_path(ctx, points);
            ctx.stroke();
            set_blur(ctx, 0.0);
        }
        DrawCmd::Dot { center, radius, color, alpha, blur } => {
            ctx.set_global_alpha(*alpha);
            set_blur(ctx, *blur);
            ctx.set_fill_style_str(color);
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, TAU)?;
            ctx.fill();
            set_blur(ctx, 0.0);
        }
        DrawCmd::Box { rect, fill, stroke, alpha, dashed } => {
            ctx.set_global_alpha(*alpha);
            if let Some(fill) = fill {
                ctx.set_fill_style_str(fill);
                ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
            }
            if let Some(stroke) = stroke {
                set_dashed(ctx, *dashed)?;
                ctx.set_stroke_style_str(stroke);
                ctx.set_line_width(OUTLINE_WIDTH);
                ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
                set_dashed(ctx, false)?;
            }
        }
        DrawCmd::Polygon { points, color, dashed } => {
            ctx.set_global_alpha(1.0);
            set_dashed(ctx, *dashed)?;
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(OUTLINE_WIDTH);
            trace_path(ctx, points);
            ctx.close_path();
            ctx.stroke();
            set_dashed(ctx, false)?;
        }
        DrawCmd::PushClip(rect) => {
            ctx.save();
            ctx.begin_path();
            ctx.rect(rect.x, rect.y, rect.width, rect.height);
            ctx.clip();
        }
        DrawCmd::PopClip => ctx.restore(),
    }
    Ok(())
}

fn trace_path(ctx: &CanvasRenderingContext2d, points: &[Point]) {
    ctx.begin_path();
    if let Some((first, rest)) = points.split_first() {
        ctx.move_to(first.x, first.y);
        for p in rest {
            ctx.line_to(p.x, p.y);
        }
    }
}

fn set_blur(ctx: &CanvasRenderingContext2d, blur: f64) {
    if blur > 0.0 {
        ctx.set_filter(&format!("blur({blur}px)"));
    } else {
        ctx.set_filter("none");
    }
}

fn set_dashed(ctx: &CanvasRenderingContext2d, dashed: bool) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    if dashed {
        dash_array.push(&MARQUEE_DASH.into());
        dash_array.push(&MARQUEE_DASH.into());
    }
    ctx.set_line_dash(&dash_array)
}
