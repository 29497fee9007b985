//! CSS colours for fills, strokes and palettes.
//!
//! [`Color`] wraps [`DynamicColor`] from the `color` crate so that any CSS
//! colour string (`"red"`, `"#ff8000"`, `"rgb(0 0 255 / 50%)"`) can be used
//! wherever a fill or stroke is configured.

use std::{fmt, str::FromStr};

use color::{AlphaColor, DynamicColor, Srgb};

/// A parsed CSS colour.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parses a CSS colour string.
    ///
    /// # Errors
    ///
    /// Returns a message naming the rejected input when it is not a valid
    /// CSS colour.
    ///
    /// # Examples
    ///
    /// ```
    /// use plotweave_core::color::Color;
    ///
    /// assert!(Color::new("#ff0000").is_ok());
    /// assert!(Color::new("teal").is_ok());
    /// assert!(Color::new("not-a-colour").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        DynamicColor::from_str(color_str)
            .map(|color| Self { color })
            .map_err(|err| format!("invalid color `{color_str}`: {err}"))
    }

    /// Returns this colour with its alpha channel replaced.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Alpha channel in `[0, 1]`
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }

    /// Linear blend of two colours in sRGB space.
    ///
    /// `t = 0` yields `self`, `t = 1` yields `other`; `t` is clamped to
    /// `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use plotweave_core::color::Color;
    ///
    /// let black = Color::new("black").unwrap();
    /// let white = Color::new("white").unwrap();
    /// let grey = black.lerp(white, 0.5);
    /// assert!((grey.alpha() - 1.0).abs() < 1e-6);
    /// ```
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let from = self.color.to_alpha_color::<Srgb>().components;
        let to = other.color.to_alpha_color::<Srgb>().components;
        let mut mixed = [0.0f32; 4];
        for (i, component) in mixed.iter_mut().enumerate() {
            *component = from[i] + (to[i] - from[i]) * t;
        }
        Self {
            color: DynamicColor::from_alpha_color(AlphaColor::<Srgb>::new(mixed)),
        }
    }

    /// sRGB components `[r, g, b, a]` in `[0, 1]`
    pub fn to_srgb(self) -> [f32; 4] {
        self.color.to_alpha_color::<Srgb>().components
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_string())
    }
}
