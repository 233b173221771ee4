//! Color values and conversion of user color inputs.
//!
//! Colors are normalized to floating point components in `[0, 1]` so they can
//! be uploaded directly as a lookup texture or bucketed for vector output.

use crate::{VizError, VizResult};
use serde::{Deserialize, Serialize};

/// Color value in RGBA format, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        )
    }

    /// Same color with a different opacity.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let t_inv = 1.0 - t;
        Rgba::new(
            self.r * t_inv + other.r * t,
            self.g * t_inv + other.g * t,
            self.b * t_inv + other.b * t,
            self.a * t_inv + other.a * t,
        )
    }

    /// Quantize to 8-bit channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// A color as a user may specify it.
///
/// Deserializes from a CSS-like string (`"#ff8800"`, `"rgb(255, 0, 0)"`,
/// `"steelblue"`), a packed `0xRRGGBB` number, or an object with `r`, `g`,
/// `b` (and optionally `a`) components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorInput {
    Css(String),
    Packed(u32),
    Components {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default)]
        a: Option<f64>,
    },
}

impl From<&str> for ColorInput {
    fn from(s: &str) -> Self {
        ColorInput::Css(s.to_string())
    }
}

impl From<u32> for ColorInput {
    fn from(v: u32) -> Self {
        ColorInput::Packed(v)
    }
}

impl From<Rgba> for ColorInput {
    fn from(c: Rgba) -> Self {
        ColorInput::Components {
            r: c.r,
            g: c.g,
            b: c.b,
            a: Some(c.a),
        }
    }
}

/// Convert any supported color input to an [`Rgba`].
pub fn convert_color(input: &ColorInput) -> VizResult<Rgba> {
    match input {
        ColorInput::Css(s) => parse_css_color(s),
        ColorInput::Packed(v) => {
            if *v > 0xFF_FFFF {
                return Err(VizError::invalid_color(format!("{:#x}", v)));
            }
            Ok(Rgba::from_rgba8(
                ((v >> 16) & 0xFF) as u8,
                ((v >> 8) & 0xFF) as u8,
                (v & 0xFF) as u8,
                255,
            ))
        }
        ColorInput::Components { r, g, b, a } => {
            let c = Rgba::new(*r, *g, *b, a.unwrap_or(1.0));
            if [c.r, c.g, c.b, c.a].iter().all(|v| v.is_finite()) {
                Ok(c)
            } else {
                Err(VizError::invalid_color(format!("{:?}", input)))
            }
        }
    }
}

/// Parse a CSS-like color string.
pub fn parse_css_color(input: &str) -> VizResult<Rgba> {
    let s = input.trim().to_ascii_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| VizError::invalid_color(input));
    }

    let functional = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'));
    if let Some(args) = functional {
        return parse_rgb_args(args).ok_or_else(|| VizError::invalid_color(input));
    }

    named_color(&s).ok_or_else(|| VizError::invalid_color(input))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        3 => Some(Rgba::from_rgba8(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        4 => Some(Rgba::from_rgba8(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Rgba::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |part: &str| -> Option<f64> {
        let value = match part.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
            None => part.parse::<f64>().ok()? / 255.0,
        };
        value.is_finite().then(|| value.clamp(0.0, 1.0))
    };

    let alpha = match parts.get(3) {
        Some(a) => {
            let a = a.parse::<f64>().ok()?;
            if !a.is_finite() {
                return None;
            }
            a.clamp(0.0, 1.0)
        }
        None => 1.0,
    };

    Some(Rgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named_color(name: &str) -> Option<Rgba> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "navy" => (0, 0, 128),
        "olive" => (128, 128, 0),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "brown" => (165, 42, 42),
        "steelblue" => (70, 130, 180),
        "transparent" => return Some(Rgba::TRANSPARENT),
        _ => return None,
    };
    Some(Rgba::from_rgba8(r, g, b, 255))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_css_color("#FF0000").unwrap(), Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(parse_css_color("#0f0").unwrap(), Rgba::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(parse_css_color("#0000ff00").unwrap(), Rgba::new(0.0, 0.0, 1.0, 0.0));
        assert!(parse_css_color("#GGGGGG").is_err());
        assert!(parse_css_color("#12345").is_err());
    }

    #[test]
    fn test_parse_rgb_function() {
        let c = parse_css_color("rgba(255, 0, 0, 0.5)").unwrap();
        assert_eq!(c, Rgba::new(1.0, 0.0, 0.0, 0.5));
        let c = parse_css_color("rgb(100%, 0%, 50%)").unwrap();
        assert_eq!(c, Rgba::new(1.0, 0.0, 0.5, 1.0));
        assert!(parse_css_color("rgb(1, 2)").is_err());
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_css_color(" Black ").unwrap(), Rgba::BLACK);
        assert_eq!(parse_css_color("transparent").unwrap(), Rgba::TRANSPARENT);
        assert!(parse_css_color("not-a-color").is_err());
    }

    #[test]
    fn test_packed_color() {
        let c = convert_color(&ColorInput::Packed(0x00FF00)).unwrap();
        assert_eq!(c, Rgba::new(0.0, 1.0, 0.0, 1.0));
        assert!(convert_color(&ColorInput::Packed(0x1000000)).is_err());
    }

    #[test]
    fn test_to_rgba8_round_trip_of_channels() {
        assert_eq!(Rgba::from_rgba8(10, 20, 30, 40).to_rgba8(), [10, 20, 30, 40]);
    }
}
