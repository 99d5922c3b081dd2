//! JavaScript-facing wrapper around [`Engine`].
//!
//! The host page creates one `WhiteboardSurface` per `<canvas>`, forwards
//! pointer events to it, and calls `render` whenever a handler reports that
//! the frame is stale. Strokes cross the boundary as JSON strings.

use serde_json::Value;
use tracing::warn;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::config::SurfaceConfig;
use crate::engine::{Action, DrawingHandle, Engine};
use crate::geom::Point;
use crate::input::Tool;
use crate::theme::STROKE_COLORS;

/// One drawing surface bound to a canvas element.
#[wasm_bindgen]
pub struct WhiteboardSurface {
    engine: Engine,
}

#[wasm_bindgen]
impl WhiteboardSurface {
    /// Create a surface from a canvas and a JSON config (`"{}"` for defaults).
    ///
    /// # Errors
    ///
    /// Returns `Err` for an invalid config or a canvas without a 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: &str) -> Result<WhiteboardSurface, JsValue> {
        let config = SurfaceConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { engine: Engine::new(canvas, config)? })
    }

    /// Returns `true` when the surface needs a re-render.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64, pressure: f64, tilt_x: f64, tilt_y: f64) -> bool {
        stale(&self.engine.on_pointer_down(pen_point(x, y, pressure, tilt_x, tilt_y)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64, pressure: f64, tilt_x: f64, tilt_y: f64) -> bool {
        stale(&self.engine.on_pointer_move(pen_point(x, y, pressure, tilt_x, tilt_y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, x: f64, y: f64, pressure: f64, tilt_x: f64, tilt_y: f64) -> bool {
        stale(&self.engine.on_pointer_up(pen_point(x, y, pressure, tilt_x, tilt_y)))
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&self, x: f64, y: f64, pressure: f64, tilt_x: f64, tilt_y: f64) -> bool {
        stale(&self.engine.on_pointer_leave(pen_point(x, y, pressure, tilt_x, tilt_y)))
    }

    /// Switch tools by toolbar name (`draw`, `eraser`, `move`, `lasso`, ...).
    ///
    /// # Errors
    ///
    /// Returns `Err` for an unknown tool name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, name: &str) -> Result<bool, JsValue> {
        let tool = Tool::from_name(name).ok_or_else(|| JsValue::from_str(&format!("unknown tool: {name}")))?;
        Ok(stale(&self.engine.set_tool(tool)))
    }

    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&self, color: &str) {
        self.engine.set_color(color);
    }

    /// # Errors
    ///
    /// Returns `Err` for a non-positive width.
    #[wasm_bindgen(js_name = setWidth)]
    pub fn set_width(&self, width: f64) -> Result<(), JsValue> {
        self.engine.set_width(width).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current strokes as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns `Err` if serialization fails.
    #[wasm_bindgen(js_name = getPaths)]
    pub fn get_paths(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.handle().get_paths()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace strokes from a JSON array. Unparseable input clears them.
    #[wasm_bindgen(js_name = setPaths)]
    pub fn set_paths(&self, json: &str) -> bool {
        stale(&self.engine.set_paths_json(&parse_or_null(json)))
    }

    /// The whole scene, post-its included, as JSON.
    #[wasm_bindgen(js_name = serializeScene)]
    pub fn serialize_scene(&self) -> String {
        self.engine.serialize_scene().to_string()
    }

    #[wasm_bindgen(js_name = loadScene)]
    pub fn load_scene(&self, json: &str) -> bool {
        stale(&self.engine.load_scene(&parse_or_null(json)))
    }

    /// Client `[x, y]` of a logical point; empty while the surface is busy.
    #[wasm_bindgen(js_name = toScreen)]
    pub fn to_screen(&self, x: f64, y: f64) -> Vec<f64> {
        self.engine.to_screen(Point::new(x, y)).map(|p| vec![p.x, p.y]).unwrap_or_default()
    }

    pub fn clear(&self) -> bool {
        stale(&self.engine.handle().clear())
    }

    /// Re-measure the canvas after a layout change.
    pub fn resize(&self) {
        self.engine.measure();
    }

    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        self.engine.render()
    }

    /// Call `callback(pathsJson)` after every committed change.
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&self, callback: js_sys::Function) {
        self.engine.on_change(move |strokes| match serde_json::to_string(strokes) {
            Ok(json) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    warn!(error = ?e, "change callback threw");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize strokes for change callback"),
        });
    }
}

/// The toolbar's stroke colours.
#[wasm_bindgen(js_name = strokeColors)]
#[must_use]
pub fn stroke_colors() -> Vec<String> {
    STROKE_COLORS.iter().map(ToString::to_string).collect()
}

fn pen_point(x: f64, y: f64, pressure: f64, tilt_x: f64, tilt_y: f64) -> Point {
    Point::new(x, y).with_pen(pressure, tilt_x, tilt_y)
}

fn stale(actions: &[Action]) -> bool {
    !actions.is_empty()
}

fn parse_or_null(json: &str) -> Value {
    match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "ignoring unparseable JSON from host");
            Value::Null
        }
    }
}
