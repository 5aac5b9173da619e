use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Lighten, Srgb};
use serde::{Serialize, Serializer};

use crate::data::model::Sex;
use crate::error::ConfigError;

/// Default chart colours: sea green, light green, goldenrod, dark orange.
pub const ECOLOGICAL: [&str; 4] = ["#2E8B57", "#90EE90", "#DAA520", "#FF8C00"];

// ---------------------------------------------------------------------------
// Color – an sRGB colour serialised as `#RRGGBB`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(Srgb<u8>);

impl Color {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Color(Srgb::new(red, green, blue))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0.red, self.0.green, self.0.blue)
    }

    /// Move the colour towards white by `factor` (0.0 – 1.0) of the
    /// remaining lightness.
    pub fn lighten(&self, factor: f32) -> Self {
        let rgb: Srgb<f32> = self.0.into_format();
        let hsl: Hsl = rgb.into_color();
        let lighter: Srgb = hsl.lighten(factor).into_color();
        Color(lighter.into_format())
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Srgb<u8>>()
            .map(Color)
            .map_err(|_| ConfigError::Color(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color(rgb.into_format())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Palette – the configured colour sequence
// ---------------------------------------------------------------------------

/// Ordered chart colours shared by every chart so that a category keeps
/// its colour across chart types.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::ecological()
    }
}

impl Palette {
    pub fn ecological() -> Self {
        Palette {
            colors: vec![
                Color::rgb(0x2E, 0x8B, 0x57),
                Color::rgb(0x90, 0xEE, 0x90),
                Color::rgb(0xDA, 0xA5, 0x20),
                Color::rgb(0xFF, 0x8C, 0x00),
            ],
        }
    }

    pub fn new(colors: Vec<Color>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Palette { colors })
    }

    /// Parse a comma-separated list of hex colours.
    pub fn parse_list(list: &str) -> Result<Self, ConfigError> {
        let colors = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Color>())
            .collect::<Result<Vec<Color>, _>>()?;
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The first `n` colours, extended with generated hues when the palette
    /// is shorter than `n`.
    pub fn take(&self, n: usize) -> Vec<Color> {
        let mut out: Vec<Color> = self.colors.iter().copied().take(n).collect();
        if n > out.len() {
            out.extend(generate_palette(n - out.len()));
        }
        out
    }

    /// Colour at position `i` of [`Palette::take`].
    pub fn color(&self, i: usize) -> Color {
        self.colors
            .get(i)
            .copied()
            .unwrap_or_else(|| self.take(i + 1)[i])
    }

    pub fn primary(&self) -> Color {
        self.color(0)
    }

    /// Males use the first colour, females the fourth.
    pub fn sex_color(&self, sex: &Sex) -> Color {
        match sex {
            Sex::Male => self.color(0),
            Sex::Female => self.color(3),
            Sex::Other(_) => self.color(4),
        }
    }
}
