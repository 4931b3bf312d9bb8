//! RGBA color type and CSS-style color parsing.

use log::warn;
use serde::{Deserialize, Serialize};

/// RGBA color resolved from an overlay's CSS color string, channels in 0.0..=1.0.
///
/// ```
/// use pagemark::model::Color;
/// assert_eq!(Color::parse("#ff0000"), Some(Color::from_rgb8(255, 0, 0)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// 0.0 is fully transparent
    pub a: f64,
}

impl Color {
    /// Opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
            a: 1.0,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Parses the color notations overlays carry.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)`, `transparent` and the common CSS color keywords.
    pub fn parse(input: &str) -> Option<Self> {
        let value = input.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }

        let lower = value.to_ascii_lowercase();
        if lower == "transparent" {
            return Some(TRANSPARENT);
        }
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args);
        }

        name_to_color(&lower)
    }

    /// Parses `input`, falling back to `fallback` with a warning.
    pub fn parse_or(input: &str, fallback: Color) -> Self {
        Self::parse(input).unwrap_or_else(|| {
            warn!("Unknown color '{input}', using fallback");
            fallback
        })
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };

    let channel = |index: usize| -> Option<f64> {
        u8::from_str_radix(&expanded[index..index + 2], 16)
            .ok()
            .map(|v| v as f64 / 255.0)
    };

    let a = if expanded.len() == 8 { channel(6)? } else { 1.0 };
    Some(Color {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
        a,
    })
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let component = |s: &str| -> Option<f64> {
        let v: f64 = s.parse().ok()?;
        Some(v.clamp(0.0, 255.0) / 255.0)
    };
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f64>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };

    Some(Color {
        r: component(parts[0])?,
        g: component(parts[1])?,
        b: component(parts[2])?,
        a: alpha,
    })
}

/// CSS keywords accepted for overlay colors, with their sRGB bytes.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("purple", [128, 0, 128]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

/// Looks up a CSS color keyword (case-insensitive).
pub fn name_to_color(name: &str) -> Option<Color> {
    let name = name.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(keyword, _)| *keyword == name)
        .map(|(_, [r, g, b])| Color::from_rgb8(*r, *g, *b))
}

pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

pub const TRANSPARENT: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};
