//! Color descriptor parsing.
//!
//! Every place that accepts a color from a caller (red-eye replacement,
//! rotation fill, colorize tint and opacity) takes a string descriptor and
//! resolves it here. Accepted forms:
//!
//! - `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` (leading `#` required)
//! - `rgb(r, g, b)` / `rgba(r, g, b, a)`: components `0-255` or `N%`, alpha `0-1`
//! - `hsl(h, s%, l%)`: hue in degrees
//! - CSS3 color names, plus `none` and `transparent`

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a color descriptor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The descriptor matched no known syntax.
    #[error("unrecognized color {0:?}")]
    Unrecognized(String),

    /// A functional descriptor (`rgb(...)`, `hsl(...)`) had a bad component.
    #[error("invalid component {component:?} in color {input:?}")]
    InvalidComponent { input: String, component: String },

    /// A functional descriptor had the wrong number of components.
    #[error("color {input:?} expects {expected} components, got {actual}")]
    ComponentCount {
        input: String,
        expected: usize,
        actual: usize,
    },
}

/// An 8-bit sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Channels normalized to `0.0..=1.0`, in `[r, g, b, a]` order.
    pub fn normalized(self) -> [f64; 4] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            self.a as f64 / 255.0,
        ]
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl std::str::FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

/// Parse a color descriptor.
pub fn parse_color(input: &str) -> Result<Color, ColorError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ColorError::Unrecognized(input.to_string()));
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorError::Unrecognized(input.to_string()));
    }

    if let Some((name, args)) = split_function(s) {
        let args: Vec<&str> = args.split(',').map(str::trim).collect();
        return match name.to_ascii_lowercase().as_str() {
            "rgb" => parse_rgb(input, &args, false),
            "rgba" => parse_rgb(input, &args, true),
            "hsl" => parse_hsl(input, &args),
            _ => Err(ColorError::Unrecognized(input.to_string())),
        };
    }

    lookup_named(s).ok_or_else(|| ColorError::Unrecognized(input.to_string()))
}

/// Split `name(args)` into its parts.
fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    Some((s[..open].trim(), inner))
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex.as_bytes();
    match hex.len() {
        3 => Some(Color::rgb(
            expand_nibble(bytes[0])?,
            expand_nibble(bytes[1])?,
            expand_nibble(bytes[2])?,
        )),
        4 => Some(Color::rgba(
            expand_nibble(bytes[0])?,
            expand_nibble(bytes[1])?,
            expand_nibble(bytes[2])?,
            expand_nibble(bytes[3])?,
        )),
        6 => Some(Color::rgb(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        8 => Some(Color::rgba(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
            u8::from_str_radix(&hex[6..8], 16).ok()?,
        )),
        _ => None,
    }
}

/// Expand a single hex nibble: 'f' → 0xFF, 'a' → 0xAA.
fn expand_nibble(ch: u8) -> Option<u8> {
    let n = (ch as char).to_digit(16)? as u8;
    Some(n << 4 | n)
}

fn invalid(input: &str, component: &str) -> ColorError {
    ColorError::InvalidComponent {
        input: input.to_string(),
        component: component.to_string(),
    }
}

/// Parse an `rgb()` channel: `0-255` or a percentage.
fn parse_channel(input: &str, component: &str) -> Result<u8, ColorError> {
    let value = match component.strip_suffix('%') {
        Some(pct) => {
            let pct: f64 = pct.trim().parse().map_err(|_| invalid(input, component))?;
            pct * 255.0 / 100.0
        }
        None => component.parse().map_err(|_| invalid(input, component))?,
    };
    if !(0.0..=255.0).contains(&value) {
        return Err(invalid(input, component));
    }
    Ok(value.round() as u8)
}

/// Parse an alpha component in `0-1`.
fn parse_alpha(input: &str, component: &str) -> Result<u8, ColorError> {
    let value: f64 = component.parse().map_err(|_| invalid(input, component))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(input, component));
    }
    Ok((value * 255.0).round() as u8)
}

/// Parse a required percentage in `0-100`, returned as a fraction.
fn parse_percent(input: &str, component: &str) -> Result<f64, ColorError> {
    let pct = component
        .strip_suffix('%')
        .ok_or_else(|| invalid(input, component))?;
    let value: f64 = pct.trim().parse().map_err(|_| invalid(input, component))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(invalid(input, component));
    }
    Ok(value / 100.0)
}

fn parse_rgb(input: &str, args: &[&str], with_alpha: bool) -> Result<Color, ColorError> {
    let expected = if with_alpha { 4 } else { 3 };
    if args.len() != expected {
        return Err(ColorError::ComponentCount {
            input: input.to_string(),
            expected,
            actual: args.len(),
        });
    }
    let a = if with_alpha {
        parse_alpha(input, args[3])?
    } else {
        255
    };
    Ok(Color::rgba(
        parse_channel(input, args[0])?,
        parse_channel(input, args[1])?,
        parse_channel(input, args[2])?,
        a,
    ))
}

fn parse_hsl(input: &str, args: &[&str]) -> Result<Color, ColorError> {
    if args.len() != 3 {
        return Err(ColorError::ComponentCount {
            input: input.to_string(),
            expected: 3,
            actual: args.len(),
        });
    }
    let hue: f64 = args[0].parse().map_err(|_| invalid(input, args[0]))?;
    let saturation = parse_percent(input, args[1])?;
    let lightness = parse_percent(input, args[2])?;

    let (r, g, b) = hsl_to_rgb(hue.rem_euclid(360.0) / 360.0, saturation, lightness);
    Ok(Color::rgb(to_u8(r), to_u8(g), to_u8(b)))
}

#[inline]
fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// HSL (all in `0..=1`) to RGB (all in `0..=1`).
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn lookup_named(name: &str) -> Option<Color> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by_key(&lower.as_str(), |&(n, _)| n)
        .ok()
        .map(|idx| {
            let [r, g, b, a] = NAMED_COLORS[idx].1;
            Color::rgba(r, g, b, a)
        })
}

/// Named colors, sorted alphabetically for binary search.
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("aqua", [0, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("brown", [165, 42, 42, 255]),
    ("crimson", [220, 20, 60, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("darkgray", [169, 169, 169, 255]),
    ("darkgrey", [169, 169, 169, 255]),
    ("darkred", [139, 0, 0, 255]),
    ("fuchsia", [255, 0, 255, 255]),
    ("gold", [255, 215, 0, 255]),
    ("gray", [128, 128, 128, 255]),
    ("green", [0, 128, 0, 255]),
    ("grey", [128, 128, 128, 255]),
    ("lightgray", [211, 211, 211, 255]),
    ("lightgrey", [211, 211, 211, 255]),
    ("lime", [0, 255, 0, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("none", [0, 0, 0, 0]),
    ("olive", [128, 128, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("pink", [255, 192, 203, 255]),
    ("purple", [128, 0, 128, 255]),
    ("red", [255, 0, 0, 255]),
    ("silver", [192, 192, 192, 255]),
    ("teal", [0, 128, 128, 255]),
    ("transparent", [0, 0, 0, 0]),
    ("white", [255, 255, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_table_is_sorted() {
        for pair in NAMED_COLORS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color("#f00"), Ok(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("#f008"), Ok(Color::rgba(255, 0, 0, 0x88)));
        assert_eq!(parse_color("#102030"), Ok(Color::rgb(0x10, 0x20, 0x30)));
        assert_eq!(
            parse_color("#10203040"),
            Ok(Color::rgba(0x10, 0x20, 0x30, 0x40))
        );
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_color("white"), Ok(Color::WHITE));
        assert_eq!(parse_color("WHITE"), Ok(Color::WHITE));
        assert_eq!(parse_color("none"), Ok(Color::TRANSPARENT));
        assert_eq!(parse_color("transparent"), Ok(Color::TRANSPARENT));
        assert!(matches!(
            parse_color("notacolor"),
            Err(ColorError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_rgb_function() {
        assert_eq!(parse_color("rgb(255,0,0)"), Ok(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("rgb( 10 , 20 , 30 )"), Ok(Color::rgb(10, 20, 30)));
        assert_eq!(parse_color("rgb(100%,50%,0%)"), Ok(Color::rgb(255, 128, 0)));
        assert_eq!(
            parse_color("rgba(0,0,0,0.5)"),
            Ok(Color::rgba(0, 0, 0, 128))
        );
    }

    #[test]
    fn test_rgb_rejects_out_of_range() {
        assert!(matches!(
            parse_color("rgb(256,0,0)"),
            Err(ColorError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse_color("rgb(-1,0,0)"),
            Err(ColorError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse_color("rgb(1,2)"),
            Err(ColorError::ComponentCount {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_hsl_grays() {
        assert_eq!(parse_color("hsl(0, 0%, 0%)"), Ok(Color::BLACK));
        assert_eq!(parse_color("hsl(0, 0%, 100%)"), Ok(Color::WHITE));
        assert_eq!(parse_color("hsl(0,0%,50%)"), Ok(Color::rgb(128, 128, 128)));
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(parse_color("hsl(0, 100%, 50%)"), Ok(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("hsl(120, 100%, 50%)"), Ok(Color::rgb(0, 255, 0)));
        assert_eq!(parse_color("hsl(240, 100%, 50%)"), Ok(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn test_hsl_requires_percentages() {
        assert!(parse_color("hsl(0, 0, 50)").is_err());
        assert!(parse_color("hsl(0, 0%, 150%)").is_err());
    }

    #[test]
    fn test_error_names_input() {
        let err = parse_color("bogus").unwrap_err();
        assert_eq!(err.to_string(), "unrecognized color \"bogus\"");
    }

    #[test]
    fn test_normalized() {
        let [r, g, b, a] = Color::rgba(255, 0, 51, 255).normalized();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0.2).abs() < 1e-9);
        assert_eq!(a, 1.0);
    }
}
