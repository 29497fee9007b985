//! Line styling for borders, axis lines, separators and polygon outlines.
//!
//! | Property | SVG attribute |
//! |----------|---------------|
//! | `color` | `stroke`, `stroke-opacity` |
//! | `width` | `stroke-width` |
//! | `style` | `stroke-dasharray` |
//! | `cap` | `stroke-linecap` |
//!
//! Use [`apply_stroke!`](crate::apply_stroke!) to copy a definition onto any
//! `svg` element.

use std::str::FromStr;

use crate::color::Color;

/// Dash pattern of a stroke.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum StrokeStyle {
    #[default]
    Solid,
    /// `5,5`
    Dashed,
    /// `2,3`
    Dotted,
    /// Raw SVG dasharray such as `"10,5,2,5"`
    Custom(String),
}

impl StrokeStyle {
    /// The `stroke-dasharray` value, `None` for solid lines
    pub fn to_svg_value(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5".to_string()),
            Self::Dotted => Some("2,3".to_string()),
            Self::Custom(pattern) => Some(pattern.clone()),
        }
    }
}

impl FromStr for StrokeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            pattern if pattern.chars().all(|c| c.is_ascii_digit() || ", .".contains(c)) => {
                Ok(Self::Custom(pattern.to_string()))
            }
            _ => Err(format!(
                "invalid stroke style `{s}`, expected solid, dashed, dotted or a dash array"
            )),
        }
    }
}

/// Line end rendering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl StrokeCap {
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// Colour, width and pattern of a line.
///
/// # Examples
///
/// ```
/// use plotweave_core::{color::Color, draw::StrokeDefinition};
///
/// let axis_line = StrokeDefinition::solid(Color::default(), 1.0);
/// let graticule = StrokeDefinition::dashed(Color::new("grey").unwrap(), 0.5);
/// assert_eq!(graticule.width(), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
    cap: StrokeCap,
}

impl StrokeDefinition {
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width)
    }

    pub fn dashed(color: Color, width: f32) -> Self {
        Self::new(color, width).with_style(StrokeStyle::Dashed)
    }

    pub fn dotted(color: Color, width: f32) -> Self {
        Self::new(color, width).with_style(StrokeStyle::Dotted)
    }

    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_cap(mut self, cap: StrokeCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn cap(&self) -> StrokeCap {
        self.cap
    }
}

impl Default for StrokeDefinition {
    /// Black, 1px, solid, butt caps
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 1.0,
            style: StrokeStyle::Solid,
            cap: StrokeCap::Butt,
        }
    }
}

/// Copies a [`StrokeDefinition`] onto an SVG element.
///
/// ```
/// use plotweave_core::{color::Color, draw::StrokeDefinition};
/// use svg::node::element::Line;
///
/// let stroke = StrokeDefinition::dotted(Color::default(), 2.0);
/// let line = plotweave_core::apply_stroke!(Line::new(), &stroke);
/// assert!(line.to_string().contains("stroke-dasharray"));
/// ```
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let stroke: &$crate::draw::StrokeDefinition = $stroke;
        let mut elem = $element
            .set("stroke", stroke.color().to_string())
            .set("stroke-opacity", stroke.color().alpha())
            .set("stroke-width", stroke.width())
            .set("stroke-linecap", stroke.cap().to_svg_value());

        if let Some(dasharray) = stroke.style().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}

#[cfg(test)]
mod tests {
    use svg::node::element::Rectangle;

    use super::*;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.color().to_string(), "black");
        assert_eq!(*stroke.style(), StrokeStyle::Solid);
        assert_eq!(stroke.cap(), StrokeCap::Butt);
    }

    #[test]
    fn test_stroke_style_from_str() {
        assert_eq!("dashed".parse::<StrokeStyle>(), Ok(StrokeStyle::Dashed));
        assert_eq!(
            "4, 2".parse::<StrokeStyle>(),
            Ok(StrokeStyle::Custom("4, 2".to_string()))
        );
        assert!("wiggly".parse::<StrokeStyle>().is_err());
    }

    #[test]
    fn test_apply_stroke_solid_has_no_dasharray() {
        let stroke = StrokeDefinition::solid(Color::new("red").unwrap(), 3.0);
        let rendered = crate::apply_stroke!(Rectangle::new(), &stroke).to_string();
        assert!(rendered.contains("stroke-width=\"3\""));
        assert!(!rendered.contains("stroke-dasharray"));
    }

    #[test]
    fn test_apply_stroke_dashed() {
        let stroke = StrokeDefinition::dashed(Color::default(), 1.0).with_cap(StrokeCap::Round);
        let rendered = crate::apply_stroke!(Rectangle::new(), &stroke).to_string();
        assert!(rendered.contains("stroke-dasharray=\"5,5\""));
        assert!(rendered.contains("stroke-linecap=\"round\""));
    }
}
