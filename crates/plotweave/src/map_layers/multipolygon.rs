use svg::node::element::{self as svg_element, path::Data};

use plotweave_core::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition},
    geometry::Point,
};

use crate::{
    error::Result,
    geo::{GeoBounds, LonLat, bounding_box},
    map_layers::{MapFrame, MapLayer},
    surface::Surface,
};

/// A ring of positions; the last point connects back to the first.
pub type Ring = Vec<LonLat>;

/// One or more polygons, each an outer ring followed by its holes.
#[derive(Debug, Clone)]
pub struct Multipolygon {
    polygons: Vec<Vec<Ring>>,
    fill: Color,
    stroke: StrokeDefinition,
    tooltip: Option<String>,
}

impl Multipolygon {
    pub fn new(polygons: Vec<Vec<Ring>>) -> Self {
        Self {
            polygons,
            fill: Color::new("red").unwrap_or_default(),
            stroke: StrokeDefinition::solid(Color::default(), 1.0),
            tooltip: None,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    fn path_data(&self, rings: &[Ring], frame: &MapFrame, origin: Point) -> Option<Data> {
        let mut data = Data::new();
        let mut drawn = false;
        for ring in rings.iter().filter(|ring| ring.len() >= 3) {
            let mut points = ring
                .iter()
                .map(|p| frame.to_pixel(*p).add_point(origin));
            let Some(first) = points.next() else {
                continue;
            };
            data = data.move_to((first.x(), first.y()));
            for point in points {
                data = data.line_to((point.x(), point.y()));
            }
            data = data.close();
            drawn = true;
        }
        drawn.then_some(data)
    }
}

impl MapLayer for Multipolygon {
    fn boundaries(&self) -> Option<GeoBounds> {
        let points: Vec<LonLat> = self.polygons.iter().flatten().flatten().copied().collect();
        bounding_box(&points, 0.0)
    }

    fn draw(&self, surface: &mut Surface, frame: &MapFrame, origin: Point) -> Result<()> {
        for rings in &self.polygons {
            let Some(data) = self.path_data(rings, frame, origin) else {
                continue;
            };
            let mut path = svg_element::Path::new()
                .set("d", data)
                .set("fill", self.fill.to_string())
                .set("fill-rule", "evenodd");
            if let Some(tooltip) = &self.tooltip {
                path = path.add(svg_element::Title::new(tooltip.as_str()));
            }
            surface.add(RenderLayer::Content, apply_stroke!(path, &self.stroke));
        }
        Ok(())
    }
}
