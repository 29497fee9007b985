//! Text styling and SVG `<text>` construction.
//!
//! - [`FontAttributes`] - family, weight and style; the key used by the
//!   font metrics service
//! - [`TextDefinition`] - font attributes plus size, colour and anchor
//!
//! Measuring text is not done here; see [`crate::fonts::TextMeasurer`].

use std::fmt;

use serde::Deserialize;
use svg::node::{Text as SvgText, element as svg_element};

use crate::{color::Color, geometry::Point};

/// Font weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }
}

/// Identifies a font face.
///
/// Two attributes with the same family, weight and style share glyph
/// metrics, so this is the cache key of the font registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct FontAttributes {
    family: String,
    weight: FontWeight,
    style: FontStyle,
}

impl FontAttributes {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }
}

impl Default for FontAttributes {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
        }
    }
}

impl fmt::Display for FontAttributes {
    /// Formats as `family-weight-style`, e.g. `sans-serif-bold-normal`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.family,
            self.weight.as_str(),
            self.style.as_str()
        )
    }
}

/// Horizontal anchoring of a text node relative to its x-coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Visual style for a piece of text.
///
/// # Examples
///
/// ```
/// # use plotweave_core::draw::{FontAttributes, FontWeight, TextDefinition};
/// # use plotweave_core::geometry::Point;
/// let title = TextDefinition::new(18.0)
///     .with_font(FontAttributes::new("serif").with_weight(FontWeight::Bold));
///
/// let node = title.render_line(Point::new(10.0, 10.0), "Rainfall");
/// assert!(node.to_string().contains("font-weight=\"bold\""));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefinition {
    font: FontAttributes,
    font_height: f32,
    color: Option<Color>,
    anchor: TextAnchor,
}

impl TextDefinition {
    /// A default-styled definition with the given font height in pixels
    pub fn new(font_height: f32) -> Self {
        Self {
            font_height,
            ..Self::default()
        }
    }

    pub fn with_font(mut self, font: FontAttributes) -> Self {
        self.font = font;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn font(&self) -> &FontAttributes {
        &self.font
    }

    pub fn font_height(&self) -> f32 {
        self.font_height
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn anchor(&self) -> TextAnchor {
        self.anchor
    }

    /// Line advance used for multi-line text
    pub fn line_height(&self) -> f32 {
        self.font_height * 1.2
    }

    /// Builds a single-line `<text>` whose vertical center is `position.y`.
    pub fn render_line(&self, position: Point, content: &str) -> svg_element::Text {
        self.text_node(position).add(SvgText::new(content))
    }

    /// Builds a `<text>` with one `<tspan>` per line, vertically centered
    /// on `position`.
    pub fn render_lines(&self, position: Point, lines: &[&str]) -> svg_element::Text {
        let line_height = self.line_height();
        let total = line_height * lines.len() as f32;
        let first_center = position.y() - total / 2.0 + line_height / 2.0;

        let mut node = self.text_node(position.with_y(first_center));
        for (index, line) in lines.iter().enumerate() {
            let dy = if index == 0 { 0.0 } else { line_height };
            let tspan = svg_element::TSpan::new("")
                .set("x", position.x())
                .set("dy", dy)
                .add(SvgText::new(*line));
            node = node.add(tspan);
        }
        node
    }

    fn text_node(&self, position: Point) -> svg_element::Text {
        let mut node = svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y())
            .set("text-anchor", self.anchor.to_svg_value())
            .set("dominant-baseline", "central")
            .set("font-family", self.font.family())
            .set("font-size", self.font_height)
            .set("font-weight", self.font.weight().as_str())
            .set("font-style", self.font.style().as_str());

        if let Some(color) = self.color {
            node = node
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
        }
        node
    }
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font: FontAttributes::default(),
            font_height: 12.0,
            color: None,
            anchor: TextAnchor::Middle,
        }
    }
}
