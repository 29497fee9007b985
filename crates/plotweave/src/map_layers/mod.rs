//! Layers drawn inside a [`Map`](crate::containers::Map).
//!
//! A map fixes its geographic boundaries and pixel size first, then hands
//! every layer the resulting [`MapFrame`] through
//! [`MapLayer::configure`] before building and drawing them in order.

mod grid_squares;
mod kde;
mod multipolygon;

pub use grid_squares::GridSquares;
pub use kde::{CellRenderer, ContourRenderer, KdeLayer};
pub use multipolygon::Multipolygon;

use std::{fmt, rc::Rc};

use plotweave_core::geometry::{Point, Size};

use crate::{
    element::BuildContext,
    error::Result,
    geo::{GeoBounds, LonLat, PlanarPoint, Projection},
    surface::Surface,
};

/// One layer of a map.
pub trait MapLayer: fmt::Debug {
    /// Area the layer wants visible. The map shows the union of all layer
    /// boundaries unless it has explicit ones.
    fn boundaries(&self) -> Option<GeoBounds> {
        None
    }

    /// Receives the final boundaries, pixel size and projection.
    fn configure(&mut self, _frame: &MapFrame) -> Result<()> {
        Ok(())
    }

    fn build(&mut self, _ctx: &BuildContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Draws the layer. `origin` is the top-left corner of the map.
    fn draw(&self, surface: &mut Surface, frame: &MapFrame, origin: Point) -> Result<()>;
}

/// Pixel geometry of a map: where each lon/lat lands.
#[derive(Debug, Clone)]
pub struct MapFrame {
    size: Size,
    bounds: GeoBounds,
    projection: Rc<dyn Projection>,
    southwest: PlanarPoint,
    northeast: PlanarPoint,
}

impl MapFrame {
    /// A frame `width` pixels wide whose height follows the projected
    /// aspect ratio of `bounds`.
    pub fn new(width: f32, bounds: GeoBounds, projection: Rc<dyn Projection>) -> Self {
        let southwest = projection.from_lon_lat(bounds.southwest());
        let mut northeast_corner = bounds.northeast();
        if bounds.crosses_antimeridian() {
            northeast_corner.lon += 360.0;
        }
        let northeast = projection.from_lon_lat(northeast_corner);

        let planar_width = northeast.x - southwest.x;
        let planar_height = northeast.y - southwest.y;
        let height = if planar_width > 0.0 {
            (f64::from(width) * planar_height / planar_width) as f32
        } else {
            width
        };

        Self {
            size: Size::new(width, height.max(0.0)),
            bounds,
            projection,
            southwest,
            northeast,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.width()
    }

    pub fn height(&self) -> f32 {
        self.size.height()
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    /// Pixel position relative to the map's top-left corner, north up.
    pub fn to_pixel(&self, position: LonLat) -> Point {
        let p = self.projection.from_lon_lat(self.bounds.unwrap_lon(position));
        let x = scale(p.x - self.southwest.x, self.northeast.x - self.southwest.x, self.width());
        let y = scale(self.northeast.y - p.y, self.northeast.y - self.southwest.y, self.height());
        Point::new(x, y)
    }

    /// Inverse of [`to_pixel`](Self::to_pixel)
    pub fn to_lon_lat(&self, pixel: Point) -> LonLat {
        let x_frac = if self.width() > 0.0 { f64::from(pixel.x() / self.width()) } else { 0.0 };
        let y_frac = if self.height() > 0.0 { f64::from(pixel.y() / self.height()) } else { 0.0 };
        let planar = PlanarPoint::new(
            self.southwest.x + x_frac * (self.northeast.x - self.southwest.x),
            self.northeast.y - y_frac * (self.northeast.y - self.southwest.y),
        );
        let mut position = self.projection.to_lon_lat(planar);
        if position.lon > 180.0 {
            position.lon -= 360.0;
        }
        position
    }
}

fn scale(offset: f64, span: f64, pixels: f32) -> f32 {
    if span == 0.0 {
        return pixels / 2.0;
    }
    (offset / span) as f32 * pixels
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::geo::{Equirectangular, WebMercator};

    #[test]
    fn test_frame_height_follows_aspect() {
        let bounds = GeoBounds::new(LonLat::new(0.0, 0.0), LonLat::new(20.0, 10.0));
        let frame = MapFrame::new(400.0, bounds, Rc::new(Equirectangular::default()));
        assert_approx_eq!(f32, frame.height(), 200.0, epsilon = 1e-3);
    }

    #[test]
    fn test_corners_map_to_pixel_corners() {
        let bounds = GeoBounds::new(LonLat::new(-10.0, 40.0), LonLat::new(10.0, 60.0));
        let frame = MapFrame::new(500.0, bounds, Rc::new(WebMercator));

        let nw = frame.to_pixel(LonLat::new(-10.0, 60.0));
        assert_approx_eq!(f32, nw.x(), 0.0, epsilon = 1e-3);
        assert_approx_eq!(f32, nw.y(), 0.0, epsilon = 1e-3);

        let se = frame.to_pixel(LonLat::new(10.0, 40.0));
        assert_approx_eq!(f32, se.x(), 500.0, epsilon = 1e-3);
        assert_approx_eq!(f32, se.y(), frame.height(), epsilon = 1e-3);

        let back = frame.to_lon_lat(Point::new(250.0, frame.height() / 2.0));
        assert_approx_eq!(f64, back.lon, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_antimeridian_frame_keeps_east_side_to_the_right() {
        let bounds = GeoBounds::new(LonLat::new(170.0, -10.0), LonLat::new(-170.0, 10.0));
        let frame = MapFrame::new(200.0, bounds, Rc::new(Equirectangular::default()));
        assert_approx_eq!(f32, frame.height(), 200.0, epsilon = 1e-3);

        let date_line = frame.to_pixel(LonLat::new(180.0, 0.0));
        let east = frame.to_pixel(LonLat::new(-175.0, 0.0));
        assert_approx_eq!(f32, date_line.x(), 100.0, epsilon = 1e-3);
        assert_approx_eq!(f32, east.x(), 150.0, epsilon = 1e-3);
        assert_approx_eq!(f64, frame.to_lon_lat(east).lon, -175.0, epsilon = 1e-6);
    }
}
