//! The canonical cube record and its wire format.
//!
//! ```text
//! Cube  := { x: integer, y: integer, z: integer, color: "#RRGGBB" }
//! Model := Cube[]
//! ```
//!
//! The engine only ever sees [`Cube`]. Loosely shaped external data goes
//! through [`crate::import`] first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An 8-bit sRGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Rejected color string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color {0:?}: expected #RRGGBB or #RGB")]
pub struct ColorParseError(pub String);

impl Color {
    /// Creates a color from channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pure red.
    pub const RED: Self = Self::rgb(0xff, 0x00, 0x00);
    /// Pure yellow, the default highlight.
    pub const YELLOW: Self = Self::rgb(0xff, 0xff, 0x00);
    /// White.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    /// Normalized `[r, g, b, 1.0]` for upload.
    #[must_use]
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            1.0,
        ]
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let err = || ColorParseError(s.to_owned());

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
                Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                // #RGB expands each nibble: #f80 == #ff8800
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..=i], 16)
                        .map(|n| n * 17)
                        .map_err(|_| err())
                };
                Ok(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(err()),
        }
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

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One unit cube on the integer grid.
///
/// Duplicated coordinates are allowed; they render as overlapping
/// instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cube {
    /// Grid X.
    pub x: i32,
    /// Grid Y (up).
    pub y: i32,
    /// Grid Z.
    pub z: i32,
    /// Face color. Accepts the short key `c` on input.
    #[serde(alias = "c")]
    pub color: Color,
}

impl Cube {
    /// Creates a cube.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32, color: Color) -> Self {
        Self { x, y, z, color }
    }

    /// Same cube with a different color.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// A whole model: an ordered cube list. Order defines instance indices.
pub type Model = Vec<Cube>;
