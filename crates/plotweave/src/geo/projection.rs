//! Geographic to planar projections.

use std::{
    f64::consts::{FRAC_PI_2, FRAC_PI_4},
    fmt,
};

use super::LonLat;

/// A position on the projected plane, in metres.
///
/// `y` grows northwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Maps lon/lat onto a plane and back.
pub trait Projection: fmt::Debug {
    /// Short identifier, used in logs
    fn name(&self) -> &'static str;

    fn from_lon_lat(&self, position: LonLat) -> PlanarPoint;

    fn to_lon_lat(&self, point: PlanarPoint) -> LonLat;
}

const WGS84_RADIUS_M: f64 = 6_378_137.0;

/// Spherical Web Mercator (EPSG:3857).
///
/// Latitudes are clamped to ±85.0511°, where the projected map becomes
/// square.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
}

impl Projection for WebMercator {
    fn name(&self) -> &'static str {
        "EPSG:3857"
    }

    fn from_lon_lat(&self, position: LonLat) -> PlanarPoint {
        let lat = position
            .lat
            .clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE)
            .to_radians();
        PlanarPoint::new(
            WGS84_RADIUS_M * position.lon.to_radians(),
            WGS84_RADIUS_M * (FRAC_PI_4 + lat / 2.0).tan().ln(),
        )
    }

    fn to_lon_lat(&self, point: PlanarPoint) -> LonLat {
        let lat = 2.0 * (point.y / WGS84_RADIUS_M).exp().atan() - FRAC_PI_2;
        LonLat::new((point.x / WGS84_RADIUS_M).to_degrees(), lat.to_degrees())
    }
}

/// Plate carrée with an optional standard parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular {
    standard_parallel: f64,
}

impl Equirectangular {
    /// Keeps distances true along latitude `parallel`
    pub fn with_standard_parallel(parallel: f64) -> Self {
        Self {
            standard_parallel: parallel,
        }
    }
}

impl Projection for Equirectangular {
    fn name(&self) -> &'static str {
        "equirectangular"
    }

    fn from_lon_lat(&self, position: LonLat) -> PlanarPoint {
        let scale = self.standard_parallel.to_radians().cos();
        PlanarPoint::new(
            WGS84_RADIUS_M * position.lon.to_radians() * scale,
            WGS84_RADIUS_M * position.lat.to_radians(),
        )
    }

    fn to_lon_lat(&self, point: PlanarPoint) -> LonLat {
        let scale = self.standard_parallel.to_radians().cos();
        LonLat::new(
            (point.x / (WGS84_RADIUS_M * scale)).to_degrees(),
            (point.y / WGS84_RADIUS_M).to_degrees(),
        )
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_web_mercator_known_values() {
        let origin = WebMercator.from_lon_lat(LonLat::new(0.0, 0.0));
        assert_approx_eq!(f64, origin.x, 0.0);
        assert_approx_eq!(f64, origin.y, 0.0, epsilon = 1e-9);

        let edge = WebMercator.from_lon_lat(LonLat::new(180.0, WebMercator::MAX_LATITUDE));
        assert_approx_eq!(f64, edge.x, 20_037_508.342_789_244, epsilon = 1e-6);
        // the clamped map is square
        assert_approx_eq!(f64, edge.y, edge.x, epsilon = 1e-3);
    }

    #[test]
    fn test_web_mercator_inverse() {
        let london = LonLat::new(-0.1276, 51.5072);
        let back = WebMercator.to_lon_lat(WebMercator.from_lon_lat(london));
        assert_approx_eq!(f64, back.lon, london.lon, epsilon = 1e-9);
        assert_approx_eq!(f64, back.lat, london.lat, epsilon = 1e-9);
    }

    #[test]
    fn test_equirectangular_scales_longitude() {
        let projection = Equirectangular::with_standard_parallel(60.0);
        let point = projection.from_lon_lat(LonLat::new(10.0, 10.0));
        assert_approx_eq!(f64, point.x * 2.0, point.y, epsilon = 1e-6);
        let back = projection.to_lon_lat(point);
        assert_approx_eq!(f64, back.lon, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_planar_distance() {
        let a = PlanarPoint::new(0.0, 0.0);
        assert_approx_eq!(f64, a.distance(&PlanarPoint::new(3.0, 4.0)), 5.0);
    }
}
