//! Point markers and their size scaling.

use std::{fmt, str::FromStr};

use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition},
    geometry::Point,
};

use crate::{error::PlotweaveError, surface::Surface};

/// Marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerType {
    #[default]
    Circle,
    /// A map pin whose tip sits on the point
    Pin,
}

impl FromStr for MarkerType {
    type Err = PlotweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circle" => Ok(Self::Circle),
            "pin" => Ok(Self::Pin),
            other => Err(PlotweaveError::config(format!(
                "unknown marker type: {other}"
            ))),
        }
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "circle"),
            Self::Pin => write!(f, "pin"),
        }
    }
}

/// A sized marker ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    kind: MarkerType,
    radius: f32,
    stroke: StrokeDefinition,
}

impl Marker {
    pub fn kind(&self) -> MarkerType {
        self.kind
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Draws the marker at `at` filled with `fill`.
    pub fn draw(&self, surface: &mut Surface, at: Point, fill: Color, tooltip: Option<&str>) {
        let r = self.radius;
        match self.kind {
            MarkerType::Circle => {
                let mut node = svg_element::Circle::new()
                    .set("cx", at.x())
                    .set("cy", at.y())
                    .set("r", r)
                    .set("fill", fill.to_string());
                if let Some(tooltip) = tooltip {
                    node = node.add(svg_element::Title::new(tooltip));
                }
                surface.add(RenderLayer::Marker, apply_stroke!(node, &self.stroke));
            }
            MarkerType::Pin => {
                let half_chord = r * 0.866;
                let shoulder = at.y() - 1.5 * r;
                let data = svg_element::path::Data::new()
                    .move_to((at.x(), at.y()))
                    .line_to((at.x() - half_chord, shoulder))
                    .elliptical_arc_to((r, r, 0.0, 1.0, 1.0, at.x() + half_chord, shoulder))
                    .close();
                let mut node = svg_element::Path::new()
                    .set("d", data)
                    .set("fill", fill.to_string());
                if let Some(tooltip) = tooltip {
                    node = node.add(svg_element::Title::new(tooltip));
                }
                surface.add(RenderLayer::Marker, apply_stroke!(node, &self.stroke));
            }
        }
    }
}

/// Scales marker radii by a size value.
///
/// Once sizes have been noted, a marker for size `s` has radius
/// `min_radius + (max_radius - min_radius) * s / largest_size`. Markers
/// without a size use the default radius.
#[derive(Debug, Clone)]
pub struct MarkerManager {
    min_radius: f32,
    max_radius: f32,
    default_radius: f32,
    stroke: StrokeDefinition,
    kind: MarkerType,
    largest_size: Option<f64>,
}

impl MarkerManager {
    pub fn new() -> Self {
        Self {
            min_radius: 1.0,
            max_radius: 10.0,
            default_radius: 3.0,
            stroke: StrokeDefinition::solid(Color::default(), 1.0),
            kind: MarkerType::Circle,
            largest_size: None,
        }
    }

    pub fn with_radius_range(mut self, min_radius: f32, max_radius: f32) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    pub fn with_default_radius(mut self, radius: f32) -> Self {
        self.default_radius = radius;
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_marker_type(mut self, kind: MarkerType) -> Self {
        self.kind = kind;
        self
    }

    pub fn marker_type(&self) -> MarkerType {
        self.kind
    }

    pub fn default_radius(&self) -> f32 {
        self.default_radius
    }

    /// Records a size value so later radii scale against the largest one.
    pub fn note_size(&mut self, size: f64) {
        if size.is_finite() {
            self.largest_size = Some(self.largest_size.map_or(size, |s| s.max(size)));
        }
    }

    pub fn radius(&self, size: Option<f64>) -> f32 {
        match (size, self.largest_size) {
            (Some(size), Some(largest)) if largest != 0.0 => {
                self.min_radius + (self.max_radius - self.min_radius) * (size / largest) as f32
            }
            _ => self.default_radius,
        }
    }

    pub fn marker(&self, size: Option<f64>) -> Marker {
        Marker {
            kind: self.kind,
            radius: self.radius(size),
            stroke: self.stroke.clone(),
        }
    }

    /// Largest radius a marker can get
    pub fn max_extent(&self) -> f32 {
        let largest = if self.largest_size.is_some() {
            self.max_radius.max(self.min_radius)
        } else {
            self.default_radius
        };
        largest + self.stroke.width()
    }
}

impl Default for MarkerManager {
    fn default() -> Self {
        Self::new()
    }
}
