//! Badge colors and text contrast.

use serde::Serialize;

/// Neutral gray used when a person is missing or has no usable color.
pub const DEFAULT_PERSON_COLOR: &str = "#9ca3af";

/// Luminance used for anything that is not a well-formed hex color.
const FALLBACK_LUMINANCE: f64 = 0.5;

/// Backgrounds darker than this get light text.
const LUMINANCE_THRESHOLD: f64 = 0.179;

/// Text color to draw on top of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Light,
    Dark,
}

impl TextColor {
    pub fn hex(self) -> &'static str {
        match self {
            TextColor::Light => "#ffffff",
            TextColor::Dark => "#111827",
        }
    }
}

/// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb` into channel bytes.
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().trim_start_matches('#');
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// WCAG relative luminance of a hex color, or 0.5 if it does not parse.
pub fn relative_luminance(color: &str) -> f64 {
    let Some([r, g, b]) = parse_hex_color(color) else {
        return FALLBACK_LUMINANCE;
    };
    0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b)
}

/// Light text on dark backgrounds, dark text on light (or malformed) ones.
pub fn contrast_text_color(background: &str) -> TextColor {
    if relative_luminance(background) < LUMINANCE_THRESHOLD {
        TextColor::Light
    } else {
        TextColor::Dark
    }
}

/// `color` if it parses, otherwise `fallback`.
pub fn valid_color_or<'a>(color: &'a str, fallback: &'a str) -> &'a str {
    if parse_hex_color(color).is_some() {
        color
    } else {
        fallback
    }
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
