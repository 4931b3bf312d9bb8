//! Value types shared by several config sections.

use crate::model::Color;
use crate::model::color::BLACK;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - either a CSS color string or RGB values.
///
/// # Examples
/// ```toml
/// # CSS color string (hex, rgb()/rgba(), named, or "transparent")
/// color = "#1c2230"
///
/// # Custom RGB color (0-255 per component)
/// color = [245, 158, 11]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Any color string overlays accept, e.g. "#f59e0b" or "red"
    Name(String),
    /// `[r, g, b]` bytes
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Whether the specification parses to a color.
    pub fn is_valid(&self) -> bool {
        match self {
            ColorSpec::Name(name) => Color::parse(name).is_some(),
            ColorSpec::Rgb(_) => true,
        }
    }

    /// Converts the specification to the string form stored on overlays.
    ///
    /// Strings are passed through unchanged; RGB arrays become `#rrggbb`.
    pub fn to_css(&self) -> String {
        match self {
            ColorSpec::Name(name) => name.clone(),
            ColorSpec::Rgb([r, g, b]) => format!("#{r:02x}{g:02x}{b:02x}"),
        }
    }

    /// Resolves to a [`Color`]. Unknown color strings default to black with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => Color::parse(name).unwrap_or_else(|| {
                warn!("Unknown color '{name}', using black");
                BLACK
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(value: &str) -> Self {
        ColorSpec::Name(value.to_string())
    }
}
