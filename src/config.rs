//! Construction-time configuration for a drawing surface.
//!
//! The browser host passes a JSON object; every field is optional. Sizes and
//! grid visibility default differently for full boards and mini surfaces, so
//! those fields stay `Option` and are resolved through accessor methods.
//!
//! ```json
//! { "kind": "mini", "color": "#222", "width": 4, "tool": "draw",
//!   "size": { "fixed": { "width": 400, "height": 120 } },
//!   "initialPaths": [ ... ] }
//! ```

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;
use serde_json::Value;

use crate::consts::{
    DEFAULT_SMOOTHING_SAMPLES, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH,
};
use crate::hit::HitPriority;
use crate::input::{LassoShape, Tool};
use crate::scene::DEFAULT_POSTIT_COLOR;
use crate::theme::ThemeName;

/// Upper bound on smoothing samples, to keep per-frame work bounded.
pub const MAX_SMOOTHING_SAMPLES: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("stroke width must be a positive number, got {0}")]
    InvalidStrokeWidth(f64),
    #[error("surface size must be positive, got {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("smoothing samples must be between 1 and {MAX_SMOOTHING_SAMPLES}, got {0}")]
    InvalidSmoothing(usize),
    #[error("tool {tool:?} is not available on a {kind:?} surface")]
    ToolNotAvailable { tool: Tool, kind: SurfaceKind },
}

/// Full boards carry post-its, panning and selection; mini surfaces only draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    #[default]
    Full,
    Mini,
}

/// Logical size of the surface's viewport.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceSize {
    Fixed { width: f64, height: f64 },
    /// Take the element's measured size the first time it is laid out.
    Flex,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceConfig {
    pub kind: SurfaceKind,
    pub color: String,
    pub width: f64,
    /// Fill for newly created post-its.
    pub postit_color: String,
    pub tool: Tool,
    pub size: Option<SurfaceSize>,
    pub theme: ThemeName,
    pub lasso: LassoShape,
    pub hit_priority: HitPriority,
    pub smoothing_samples: usize,
    pub show_grid: Option<bool>,
    /// Previously saved strokes (or a full scene) to restore on construction.
    pub initial_paths: Value,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            kind: SurfaceKind::Full,
            color: DEFAULT_STROKE_COLOR.to_string(),
            width: DEFAULT_STROKE_WIDTH,
            postit_color: DEFAULT_POSTIT_COLOR.to_string(),
            tool: Tool::Draw,
            size: None,
            theme: ThemeName::Light,
            lasso: LassoShape::Rect,
            hit_priority: HitPriority::SceneOrder,
            smoothing_samples: DEFAULT_SMOOTHING_SAMPLES,
            show_grid: None,
            initial_paths: Value::Null,
        }
    }
}

impl SurfaceConfig {
    /// Defaults for a mini surface.
    #[must_use]
    pub fn mini() -> Self {
        Self { kind: SurfaceKind::Mini, ..Self::default() }
    }

    /// Parse and validate a host-supplied JSON config.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed JSON or unknown enum values, and the validation
    /// errors of [`SurfaceConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check numeric ranges and tool availability.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ConfigError::InvalidStrokeWidth(self.width));
        }
        if let Some(SurfaceSize::Fixed { width, height }) = self.size {
            let valid = |v: f64| v.is_finite() && v > 0.0;
            if !valid(width) || !valid(height) {
                return Err(ConfigError::InvalidSize { width, height });
            }
        }
        if self.smoothing_samples == 0 || self.smoothing_samples > MAX_SMOOTHING_SAMPLES {
            return Err(ConfigError::InvalidSmoothing(self.smoothing_samples));
        }
        if !self.tool.is_available_on(self.kind) {
            return Err(ConfigError::ToolNotAvailable { tool: self.tool, kind: self.kind });
        }
        Ok(())
    }

    /// Viewport size, defaulting to the large board for full surfaces and
    /// flexing to the element for mini ones.
    #[must_use]
    pub fn resolved_size(&self) -> SurfaceSize {
        self.size.unwrap_or(match self.kind {
            SurfaceKind::Full => SurfaceSize::Fixed { width: DEFAULT_VIEWPORT_WIDTH, height: DEFAULT_VIEWPORT_HEIGHT },
            SurfaceKind::Mini => SurfaceSize::Flex,
        })
    }

    /// Grid is drawn on full boards unless turned off.
    #[must_use]
    pub fn grid_enabled(&self) -> bool {
        self.show_grid.unwrap_or(self.kind == SurfaceKind::Full)
    }
}
