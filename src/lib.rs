//! Freehand vector drawing surface for classroom quiz boards.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It captures
//! pen and mouse strokes, smooths them for display, and lets the teacher pan
//! the board, select and move strokes, erase them, and pin post-it notes that
//! carry their own small drawings. The host page wires DOM pointer events to
//! a [`bindings::WhiteboardSurface`] and persists whatever
//! [`engine::DrawingHandle::get_paths`] returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine, testable [`engine::EngineCore`], and the shared [`engine::SurfaceHandle`] |
//! | [`scene`] | Strokes, post-its, and their tolerant JSON form |
//! | [`input`] | Tools and the gesture state machine |
//! | [`viewport`] | Screen to logical coordinate mapping and panning |
//! | [`smooth`] | Catmull-Rom stroke smoothing |
//! | [`hit`] | Hit-testing strokes, post-its, and lasso regions |
//! | [`render`] | Display-list construction and canvas painting |
//! | [`geom`] | Points, rectangles, and polygon containment |
//! | [`theme`] | Colour palettes and toolbar colours |
//! | [`config`] | Construction-time surface configuration |
//! | [`bindings`] | `wasm-bindgen` class exposed to the host page |
//! | [`consts`] | Shared numeric constants (hit radius, post-it sizes, etc.) |

pub mod bindings;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod input;
pub mod render;
pub mod scene;
pub mod smooth;
pub mod theme;
pub mod viewport;
