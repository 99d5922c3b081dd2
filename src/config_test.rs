#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn empty_object_gives_full_defaults() {
    let cfg = SurfaceConfig::from_json("{}").unwrap();
    assert_eq!(cfg.kind, SurfaceKind::Full);
    assert_eq!(cfg.color, "#000000");
    assert_eq!(cfg.width, 2.0);
    assert_eq!(cfg.tool, Tool::Draw);
    assert_eq!(cfg.resolved_size(), SurfaceSize::Fixed { width: 2000.0, height: 900.0 });
    assert!(cfg.grid_enabled());
    assert!(cfg.initial_paths.is_null());
}

#[test]
fn mini_defaults_flex_without_grid() {
    let cfg = SurfaceConfig::from_json(r#"{"kind": "mini"}"#).unwrap();
    assert_eq!(cfg.resolved_size(), SurfaceSize::Flex);
    assert!(!cfg.grid_enabled());
}

#[test]
fn parses_every_field() {
    let raw = r##"{
        "kind": "mini",
        "color": "#222",
        "width": 4,
        "tool": "eraser",
        "size": {"fixed": {"width": 400, "height": 120}},
        "theme": "dark",
        "lasso": "freeform",
        "hitPriority": "topmost",
        "smoothingSamples": 12,
        "showGrid": true,
        "initialPaths": [{"id": "a", "points": [{"x": 1, "y": 2}]}]
    }"##;
    let cfg = SurfaceConfig::from_json(raw).unwrap();
    assert_eq!(cfg.color, "#222");
    assert_eq!(cfg.width, 4.0);
    assert_eq!(cfg.tool, Tool::Erase);
    assert_eq!(cfg.resolved_size(), SurfaceSize::Fixed { width: 400.0, height: 120.0 });
    assert_eq!(cfg.theme, ThemeName::Dark);
    assert_eq!(cfg.lasso, LassoShape::Freeform);
    assert_eq!(cfg.hit_priority, HitPriority::Topmost);
    assert_eq!(cfg.smoothing_samples, 12);
    assert!(cfg.grid_enabled());
    assert!(cfg.initial_paths.is_array());
}

#[test]
fn flex_size_keyword() {
    let cfg = SurfaceConfig::from_json(r#"{"size": "flex"}"#).unwrap();
    assert_eq!(cfg.resolved_size(), SurfaceSize::Flex);
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(SurfaceConfig::from_json("{nope"), Err(ConfigError::Parse(_))));
}

#[test]
fn unknown_tool_is_a_parse_error() {
    assert!(matches!(SurfaceConfig::from_json(r#"{"tool": "spray"}"#), Err(ConfigError::Parse(_))));
}

#[test]
fn non_positive_width_rejected() {
    assert!(matches!(SurfaceConfig::from_json(r#"{"width": 0}"#), Err(ConfigError::InvalidStrokeWidth(_))));
    assert!(matches!(SurfaceConfig::from_json(r#"{"width": -3}"#), Err(ConfigError::InvalidStrokeWidth(_))));
}

#[test]
fn zero_fixed_size_rejected() {
    let err = SurfaceConfig::from_json(r#"{"size": {"fixed": {"width": 0, "height": 10}}}"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSize { .. }));
}

#[test]
fn smoothing_out_of_range_rejected() {
    assert!(matches!(SurfaceConfig::from_json(r#"{"smoothingSamples": 0}"#), Err(ConfigError::InvalidSmoothing(0))));
    assert!(matches!(
        SurfaceConfig::from_json(r#"{"smoothingSamples": 1000}"#),
        Err(ConfigError::InvalidSmoothing(1000))
    ));
}

#[test]
fn mini_surface_rejects_post_it_tool() {
    let err = SurfaceConfig::from_json(r#"{"kind": "mini", "tool": "postit"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::ToolNotAvailable { tool: Tool::PostItCreate, kind: SurfaceKind::Mini }));
}

#[test]
fn error_messages_are_readable() {
    let err = ConfigError::InvalidStrokeWidth(-1.0);
    assert_eq!(err.to_string(), "stroke width must be a positive number, got -1");
}
