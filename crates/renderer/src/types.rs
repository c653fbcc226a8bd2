use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoaderError;
use crate::geometry::round_half_up;

/// Side length of the offscreen favicon surface in pixels.
pub const ICON_SIZE: u32 = 32;

/// Title template used when the caller does not supply one.
pub const DEFAULT_MESSAGE: &str = "Loading {{percent}}";

/// Initial `max` value of a freshly constructed loader.
pub const DEFAULT_MAX: f64 = 100.0;

/// Background ring drawn underneath the donut progress arc.
pub const TRACK_COLOR: Color = Color::rgba(75, 75, 75, 51);

const DEFAULT_RAMP: [(u8, u8, u8); 20] = [
    (0xc2, 0x00, 0x00),
    (0xc2, 0x10, 0x00),
    (0xc2, 0x20, 0x00),
    (0xc2, 0x30, 0x00),
    (0xc2, 0x41, 0x00),
    (0xc2, 0x51, 0x00),
    (0xc2, 0x61, 0x00),
    (0xc2, 0x71, 0x00),
    (0xc2, 0x81, 0x00),
    (0xc2, 0x91, 0x00),
    (0xc2, 0xa2, 0x00),
    (0xc2, 0xb2, 0x00),
    (0xc2, 0xc2, 0x00),
    (0xb2, 0xc2, 0x00),
    (0xa1, 0xc2, 0x00),
    (0x91, 0xc2, 0x00),
    (0x81, 0xc2, 0x00),
    (0x71, 0xc2, 0x00),
    (0x61, 0xc2, 0x00),
    (0x51, 0xc2, 0x00),
];

/// Geometry drawn into the favicon on every redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Filled wedge growing clockwise from three o'clock.
    #[default]
    Pie,
    /// Stroked ring over a faint background track.
    Donut,
}

impl FromStr for Shape {
    type Err = LoaderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pie" => Ok(Shape::Pie),
            "donut" | "ring" => Ok(Shape::Donut),
            _ => Err(LoaderError::InvalidShape(value.to_string())),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Pie => f.write_str("pie"),
            Shape::Donut => f.write_str("donut"),
        }
    }
}

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = LoaderError;

    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and
    /// `rgba(r, g, b, a)` with `a` in `[0, 1]`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || LoaderError::InvalidColor(value.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let lowered = trimmed.to_ascii_lowercase();
        let (body, has_alpha) = if let Some(rest) = lowered.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = lowered.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(invalid());
        }

        let channel = |raw: &str| -> Option<u8> {
            let parsed: f64 = raw.parse().ok()?;
            if !parsed.is_finite() {
                return None;
            }
            Some(round_half_up(parsed.clamp(0.0, 255.0)) as u8)
        };
        let r = channel(parts[0]).ok_or_else(invalid)?;
        let g = channel(parts[1]).ok_or_else(invalid)?;
        let b = channel(parts[2]).ok_or_else(invalid)?;
        let a = if has_alpha {
            let alpha: f64 = parts[3].parse().map_err(|_| invalid())?;
            if !alpha.is_finite() {
                return Err(invalid());
            }
            round_half_up(alpha.clamp(0.0, 1.0) * 255.0) as u8
        } else {
            255
        };
        Ok(Color::rgba(r, g, b, a))
    }
}

impl TryFrom<String> for Color {
    type Error = LoaderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |index: usize| u8::from_str_radix(&hex[index..index + 1], 16).ok().map(|v| v * 17);
    let byte = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Non-empty ordered list of colors indexed by progress ratio.
///
/// A one-entry palette behaves as a fixed color: it is returned for every
/// progress value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Wraps `colors`, rejecting an empty list.
    pub fn new(colors: Vec<Color>) -> Result<Self, LoaderError> {
        if colors.is_empty() {
            return Err(LoaderError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Palette that always resolves to `color`.
    pub fn fixed(color: Color) -> Self {
        Self {
            colors: vec![color],
        }
    }

    /// Parses every entry as a color string.
    pub fn parse<I, T>(entries: I) -> Result<Self, LoaderError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let colors = entries
            .into_iter()
            .map(|entry| entry.as_ref().parse())
            .collect::<Result<Vec<Color>, _>>()?;
        Self::new(colors)
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Never true for a palette built through [`Palette::new`].
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index selected for `progress` out of `max`.
    ///
    /// `round(len * progress / max)` reaches `len` once progress hits `max`,
    /// so the result is clamped into `[0, len - 1]`.
    pub fn index_for(&self, progress: f64, max: f64) -> usize {
        let len = self.colors.len();
        if len == 1 {
            return 0;
        }
        let raw = round_half_up(len as f64 * progress / max);
        if !raw.is_finite() || raw <= 0.0 {
            return 0;
        }
        (raw as usize).min(len - 1)
    }

    /// Color selected for `progress` out of `max`.
    pub fn resolve(&self, progress: f64, max: f64) -> Color {
        self.colors[self.index_for(progress, max)]
    }

    pub fn into_colors(self) -> Vec<Color> {
        self.colors
    }
}

impl Default for Palette {
    /// The 20-step red to green ramp.
    fn default() -> Self {
        Self {
            colors: DEFAULT_RAMP
                .iter()
                .map(|&(r, g, b)| Color::rgb(r, g, b))
                .collect(),
        }
    }
}

/// Activation state of the favicon slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// Original icons are in the head; the loader's own link is detached.
    Inactive,
    /// The loader's own link is the only icon link in the head.
    Active,
}

/// Options accepted when constructing a loader.
///
/// `max` and `palette` seed the initial state so callers do not need a second
/// redraw right after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoaderOptions {
    /// Geometry drawn on every redraw.
    pub shape: Shape,
    /// Title template; `None` selects [`DEFAULT_MESSAGE`].
    pub message: Option<String>,
    /// Initial max; `None` selects [`DEFAULT_MAX`].
    pub max: Option<f64>,
    /// Initial palette; `None` selects the default ramp.
    pub palette: Option<Vec<Color>>,
}

impl LoaderOptions {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = Some(palette);
        self
    }
}
