use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition},
    geometry::Point,
};

use crate::{
    error::{PlotweaveError, Result},
    geo::LonLat,
    map_layers::{MapFrame, MapLayer},
    surface::Surface,
};

/// Graticule: meridians and parallels every `spacing` degrees.
#[derive(Debug, Clone)]
pub struct GridSquares {
    spacing: f64,
    stroke: StrokeDefinition,
}

impl GridSquares {
    /// # Errors
    ///
    /// Returns a configuration error unless `spacing` is positive.
    pub fn new(spacing: f64) -> Result<Self> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(PlotweaveError::config(format!(
                "grid spacing must be positive, got {spacing}"
            )));
        }
        let grey = Color::new("grey").unwrap_or_default();
        Ok(Self {
            spacing,
            stroke: StrokeDefinition::solid(grey, 0.5),
        })
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }

    /// Multiples of the spacing inside `[from, to]`
    fn steps(&self, from: f64, to: f64) -> impl Iterator<Item = f64> + '_ {
        let first = (from / self.spacing).ceil() as i64;
        let last = (to / self.spacing).floor() as i64;
        (first..=last).map(move |i| i as f64 * self.spacing)
    }

    fn line(&self, surface: &mut Surface, from: Point, to: Point) {
        let line = svg_element::Line::new()
            .set("x1", from.x())
            .set("y1", from.y())
            .set("x2", to.x())
            .set("y2", to.y());
        surface.add(RenderLayer::Grid, apply_stroke!(line, &self.stroke));
    }
}

impl MapLayer for GridSquares {
    fn draw(&self, surface: &mut Surface, frame: &MapFrame, origin: Point) -> Result<()> {
        let bounds = frame.bounds();
        let sw = bounds.southwest();
        let ne = bounds.northeast();
        let west = sw.lon;
        let east = sw.lon + bounds.lon_span();

        for lon in self.steps(west, east) {
            let lon = if lon > 180.0 { lon - 360.0 } else { lon };
            let top = frame.to_pixel(LonLat::new(lon, ne.lat)).add_point(origin);
            let bottom = frame.to_pixel(LonLat::new(lon, sw.lat)).add_point(origin);
            self.line(surface, top, bottom);
        }
        for lat in self.steps(sw.lat, ne.lat) {
            let left = frame.to_pixel(LonLat::new(west, lat)).add_point(origin);
            let right = Point::new(origin.x() + frame.width(), left.y());
            self.line(surface, left, right);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{element::Format, geo::{Equirectangular, GeoBounds}};

    #[test]
    fn test_spacing_must_be_positive() {
        assert!(GridSquares::new(0.0).unwrap_err().is_config());
        assert!(GridSquares::new(-1.0).is_err());
    }

    #[test]
    fn test_lines_every_spacing() {
        let bounds = GeoBounds::new(LonLat::new(0.5, 0.5), LonLat::new(3.5, 2.5));
        let frame = MapFrame::new(300.0, bounds, Rc::new(Equirectangular::default()));
        let grid = GridSquares::new(1.0).unwrap();
        assert_eq!(grid.steps(0.5, 3.5).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);

        let mut surface = Surface::new(Format::Svg);
        grid.draw(&mut surface, &frame, Point::default()).unwrap();
        let svg = surface.finish().unwrap().nodes[0].to_string();
        // three meridians, two parallels
        assert_eq!(svg.matches("<line").count(), 5);
    }
}
