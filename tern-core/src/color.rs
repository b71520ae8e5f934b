//! Color representation for terminal cells
//!
//! Supports:
//! - Default foreground/background
//! - Indexed colors (256-color palette)
//! - Bright named colors (the historical 90-97/100-107 SGR forms)
//! - 24-bit true color (RGB)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 24-bit RGB color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Color representation supporting all terminal color modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    Default,
    /// Indexed color (0-255)
    /// 0-7: standard colors
    /// 8-15: bright colors
    /// 16-231: 6x6x6 color cube
    /// 232-255: grayscale
    Indexed(u8),
    /// Bright named color (0-7), serialized with the 90+n/100+n SGR forms
    Bright(u8),
    /// 24-bit RGB color
    Rgb(RgbColor),
}

impl Color {
    /// Standard ANSI color indices
    pub const BLACK: u8 = 0;
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const YELLOW: u8 = 3;
    pub const BLUE: u8 = 4;
    pub const MAGENTA: u8 = 5;
    pub const CYAN: u8 = 6;
    pub const WHITE: u8 = 7;

    /// Create a new indexed color
    pub fn indexed(index: u8) -> Self {
        Color::Indexed(index)
    }

    /// Create a new RGB color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(RgbColor::new(r, g, b))
    }

    /// Convert to RGB using the standard xterm palette
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Default => (255, 255, 255),
            Color::Indexed(idx) => index_to_rgb(*idx),
            Color::Bright(n) => index_to_rgb(8 + n.min(&7)),
            Color::Rgb(rgb) => (rgb.r, rgb.g, rgb.b),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl From<RgbColor> for Color {
    fn from(rgb: RgbColor) -> Self {
        Color::Rgb(rgb)
    }
}

/// Convert a 256-color index to RGB values using the xterm palette
fn index_to_rgb(index: u8) -> (u8, u8, u8) {
    match index {
        // Standard colors (0-7)
        0 => (0, 0, 0),
        1 => (205, 0, 0),
        2 => (0, 205, 0),
        3 => (205, 205, 0),
        4 => (0, 0, 238),
        5 => (205, 0, 205),
        6 => (0, 205, 205),
        7 => (229, 229, 229),

        // Bright colors (8-15)
        8 => (127, 127, 127),
        9 => (255, 0, 0),
        10 => (0, 255, 0),
        11 => (255, 255, 0),
        12 => (92, 92, 255),
        13 => (255, 0, 255),
        14 => (0, 255, 255),
        15 => (255, 255, 255),

        // 6x6x6 color cube (16-231)
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (to_val(r), to_val(g), to_val(b))
        }

        // Grayscale (232-255)
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            (gray, gray, gray)
        }
    }
}

/// Error produced by [`parse_color`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("unrecognized color specification: {0:?}")]
    Unrecognized(String),
    #[error("invalid hex digits in color specification: {0:?}")]
    InvalidHex(String),
}

/// Parse a color specification as used by OSC color-setting sequences.
///
/// Accepted forms are `#rrggbb`, `rgb:RRRR/GGGG/BBBB` (X11 style, four hex
/// digits per channel, high byte significant), and a small set of color
/// names. Malformed input yields an error; callers drop the command.
pub fn parse_color(value: &str) -> Result<RgbColor, ColorParseError> {
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |s: &str| u8::from_str_radix(s, 16);
            return match (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])) {
                (Ok(r), Ok(g), Ok(b)) => Ok(RgbColor::new(r, g, b)),
                _ => Err(ColorParseError::InvalidHex(value.to_string())),
            };
        }
        return Err(ColorParseError::Unrecognized(value.to_string()));
    }

    // "rgb:RRRR/GGGG/BBBB"
    if let Some(spec) = value.strip_prefix("rgb:") {
        let parts: Vec<&str> = spec.split('/').collect();
        if parts.len() == 3 && parts.iter().all(|p| p.len() == 4) {
            let channel = |s: &str| u16::from_str_radix(s, 16).map(|v| (v >> 8) as u8);
            return match (channel(parts[0]), channel(parts[1]), channel(parts[2])) {
                (Ok(r), Ok(g), Ok(b)) => Ok(RgbColor::new(r, g, b)),
                _ => Err(ColorParseError::InvalidHex(value.to_string())),
            };
        }
        return Err(ColorParseError::Unrecognized(value.to_string()));
    }

    match value.to_ascii_lowercase().as_str() {
        "black" => Ok(RgbColor::new(0, 0, 0)),
        "red" => Ok(RgbColor::new(205, 0, 0)),
        "green" => Ok(RgbColor::new(0, 205, 0)),
        "yellow" => Ok(RgbColor::new(205, 205, 0)),
        "blue" => Ok(RgbColor::new(0, 0, 238)),
        "magenta" => Ok(RgbColor::new(205, 0, 205)),
        "cyan" => Ok(RgbColor::new(0, 205, 205)),
        "white" => Ok(RgbColor::new(229, 229, 229)),
        _ => Err(ColorParseError::Unrecognized(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default(), Color::Default);
    }

    #[test]
    fn test_standard_colors_to_rgb() {
        assert_eq!(Color::Indexed(0).to_rgb(), (0, 0, 0));
        assert_eq!(Color::Indexed(1).to_rgb(), (205, 0, 0));
        assert_eq!(Color::Indexed(7).to_rgb(), (229, 229, 229));
    }

    #[test]
    fn test_bright_colors_to_rgb() {
        assert_eq!(Color::Bright(0).to_rgb(), (127, 127, 127));
        assert_eq!(Color::Bright(7).to_rgb(), (255, 255, 255));
    }

    #[test]
    fn test_color_cube_to_rgb() {
        assert_eq!(Color::Indexed(16).to_rgb(), (0, 0, 0));
        assert_eq!(Color::Indexed(196).to_rgb(), (255, 0, 0));
    }

    #[test]
    fn test_grayscale_to_rgb() {
        assert_eq!(Color::Indexed(232).to_rgb(), (8, 8, 8));
        assert_eq!(Color::Indexed(255).to_rgb(), (238, 238, 238));
    }

    #[test]
    fn test_parse_hash_color() {
        assert_eq!(parse_color("#ff8040"), Ok(RgbColor::new(255, 128, 64)));
        assert!(parse_color("#ff80").is_err());
        assert!(parse_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_parse_x11_color() {
        assert_eq!(
            parse_color("rgb:ffff/8080/0000"),
            Ok(RgbColor::new(255, 128, 0))
        );
        assert!(parse_color("rgb:ff/ff/ff").is_err());
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("red"), Ok(RgbColor::new(205, 0, 0)));
        assert!(parse_color("mauve-ish").is_err());
    }
}
