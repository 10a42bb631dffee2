//! Display colors for requirements

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGB color, written as `#RRGGBB` in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 200, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color '{}', expected #RRGGBB", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Colors used for each requirement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    #[serde(default = "default_satisfied")]
    pub satisfied: Color,
    #[serde(default = "default_unsatisfied")]
    pub unsatisfied: Color,
    /// Used for recommended requirements that are not met
    #[serde(default = "default_recommended")]
    pub recommended: Color,
}

fn default_satisfied() -> Color {
    Color::GREEN
}

fn default_unsatisfied() -> Color {
    Color::RED
}

fn default_recommended() -> Color {
    Color::ORANGE
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            satisfied: default_satisfied(),
            unsatisfied: default_unsatisfied(),
            recommended: default_recommended(),
        }
    }
}
