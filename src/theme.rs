//! Visual themes as a closed lookup table.
//!
//! Every colour the renderer uses comes from a [`Palette`] selected by
//! [`ThemeName`]. Adding a theme means adding a variant, and the exhaustive
//! `match` in [`ThemeName::palette`] will not compile until it has colours.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use serde::Deserialize;

/// Stroke colours offered by the toolbar, in display order.
pub const STROKE_COLORS: [&str; 8] = ["#000000", "#FF0000", "#00FF00", "#0000FF", "#FFA500", "#800080", "#008080", "#FF69B4"];

/// Deserializes from any string; unknown names become `Light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
    Classroom,
}

impl From<String> for ThemeName {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

/// Colours for everything the renderer draws that is not user content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub grid: &'static str,
    pub postit_border: &'static str,
    pub handle_fill: &'static str,
    pub handle_stroke: &'static str,
    pub marquee: &'static str,
}

impl ThemeName {
    #[must_use]
    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                background: "#FFFFFF",
                grid: "#EEEEEE",
                postit_border: "#000000",
                handle_fill: "#FFFFFF",
                handle_stroke: "#888888",
                marquee: "#1976D2",
            },
            Self::Dark => Palette {
                background: "#1E1E1E",
                grid: "#2C2C2C",
                postit_border: "#DDDDDD",
                handle_fill: "#333333",
                handle_stroke: "#AAAAAA",
                marquee: "#90CAF9",
            },
            Self::Classroom => Palette {
                background: "#2F4F3A",
                grid: "#3B5E47",
                postit_border: "#1F1A17",
                handle_fill: "#F5F5F5",
                handle_stroke: "#1F1A17",
                marquee: "#FFEB3B",
            },
        }
    }

    /// Parse a theme name, falling back to `Light` for anything unknown.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Self::Dark,
            "classroom" | "chalkboard" => Self::Classroom,
            _ => Self::Light,
        }
    }
}
