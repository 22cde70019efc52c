//! Color handling for tree annotations.
//!
//! This module provides the [`Color`] type. Colors are parsed from any CSS
//! color string understood by the `color` crate (`"#ff0000"`,
//! `"rgb(255, 0, 0)"`, `"red"`, ...) and always serialize as a lowercase
//! `#rrggbb` hex string, the form the tree documents use in `fill` and
//! `stroke` style properties.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};

/// An opaque sRGB color that serializes as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Create a new `Color` from a CSS color string.
    ///
    /// # Examples
    ///
    /// ```
    /// use phylosvg_core::color::Color;
    ///
    /// let red = Color::new("rgb(255, 0, 0)").unwrap();
    /// assert_eq!(red.to_string(), "#ff0000");
    ///
    /// let blue = Color::new("blue").unwrap();
    /// assert_eq!(blue.to_string(), "#0000ff");
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        let color = DynamicColor::from_str(color_str.trim())
            .map_err(|err| format!("invalid color `{color_str}`: {err}"))?;
        let rgba = color.to_alpha_color::<Srgb>().to_rgba8();
        Ok(Self::from_rgb(rgba.r, rgba.g, rgba.b))
    }

    /// Create a color from its red, green and blue channels.
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns the `(red, green, blue)` channels.
    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb(0, 0, 0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl From<Color> for svg::node::Value {
    fn from(color: Color) -> Self {
        Self::from(color.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_new() {
        let red = Color::new("#ff0000");
        assert_eq!(red, Ok(Color::from_rgb(255, 0, 0)));

        let invalid = Color::new("not-a-color");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_color_from_rgb_function() {
        let color = Color::new("rgb(12, 200, 7)").unwrap();
        assert_eq!(color.rgb(), (12, 200, 7));
        assert_eq!(color.to_string(), "#0cc807");
    }

    #[test]
    fn test_color_trims_whitespace() {
        let color = Color::new("  #00ff00 ").unwrap();
        assert_eq!(color.to_string(), "#00ff00");
    }

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default().to_string(), "#000000");
    }

    #[test]
    fn test_color_display_pads_channels() {
        assert_eq!(Color::from_rgb(1, 2, 3).to_string(), "#010203");
    }
}
