//! Spherical earth geometry: boundaries, bounding boxes and distances.
//!
//! All angles are in degrees and distances in metres. The earth is a
//! sphere of radius [`EARTH_RADIUS_M`], which is accurate to a fraction of
//! a percent and good enough for drawing maps.

mod geocoder;
mod projection;

pub use geocoder::{Geocoder, StaticGeocoder};
pub use projection::{Equirectangular, PlanarPoint, Projection, WebMercator};

use std::f64::consts::PI;

use log::warn;

/// Mean earth radius used by the distance and boundary calculations
pub const EARTH_RADIUS_M: f64 = 6_372_800.0;

/// Extent given to a zero range bounding box, in degrees
const MIN_RANGE: f64 = 0.1;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<(f64, f64)> for LonLat {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

/// A lon/lat rectangle given by its south-west and north-east corners.
///
/// `southwest.lon > northeast.lon` means the rectangle crosses the
/// antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    southwest: LonLat,
    northeast: LonLat,
}

impl GeoBounds {
    pub fn new(southwest: LonLat, northeast: LonLat) -> Self {
        Self {
            southwest,
            northeast,
        }
    }

    pub fn southwest(&self) -> LonLat {
        self.southwest
    }

    pub fn northeast(&self) -> LonLat {
        self.northeast
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.southwest.lon > self.northeast.lon
    }

    /// East-west extent in degrees, across the antimeridian when needed
    pub fn lon_span(&self) -> f64 {
        let span = self.northeast.lon - self.southwest.lon;
        if span < 0.0 { span + 360.0 } else { span }
    }

    pub fn lat_span(&self) -> f64 {
        self.northeast.lat - self.southwest.lat
    }

    pub fn center(&self) -> LonLat {
        let mut lon = self.southwest.lon + self.lon_span() / 2.0;
        if lon > 180.0 {
            lon -= 360.0;
        }
        LonLat::new(lon, (self.southwest.lat + self.northeast.lat) / 2.0)
    }

    /// Moves `point` east by 360° when it lies past the antimeridian of a
    /// crossing rectangle, so longitudes increase monotonically from the
    /// western edge. Other points are returned unchanged.
    pub fn unwrap_lon(&self, point: LonLat) -> LonLat {
        if self.crosses_antimeridian() && point.lon < self.southwest.lon {
            LonLat::new(point.lon + 360.0, point.lat)
        } else {
            point
        }
    }

    pub fn contains(&self, point: LonLat) -> bool {
        let lat_inside = point.lat >= self.southwest.lat && point.lat <= self.northeast.lat;
        let lon_inside = if self.crosses_antimeridian() {
            point.lon >= self.southwest.lon || point.lon <= self.northeast.lon
        } else {
            point.lon >= self.southwest.lon && point.lon <= self.northeast.lon
        };
        lat_inside && lon_inside
    }

    /// Smallest rectangle covering both. Rectangles crossing the
    /// antimeridian are merged on their raw corner values.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            southwest: LonLat::new(
                self.southwest.lon.min(other.southwest.lon),
                self.southwest.lat.min(other.southwest.lat),
            ),
            northeast: LonLat::new(
                self.northeast.lon.max(other.northeast.lon),
                self.northeast.lat.max(other.northeast.lat),
            ),
        }
    }
}

/// Rectangle around `center` whose edges are `distance` metres away.
///
/// Longitudes past ±180° wrap around, giving bounds that cross the
/// antimeridian. When the latitude band would pass a pole the latitudes
/// are clamped to ±90° and the full longitude range is returned.
pub fn compute_boundaries(center: LonLat, distance: f64) -> GeoBounds {
    let angular = distance / EARTH_RADIUS_M;
    let (min_lat_limit, max_lat_limit) = (-PI / 2.0, PI / 2.0);
    let (min_lon_limit, max_lon_limit) = (-PI, PI);

    let lat = center.lat.to_radians();
    let lon = center.lon.to_radians();
    let mut min_lat = lat - angular;
    let mut max_lat = lat + angular;

    let (min_lon, max_lon) = if min_lat > min_lat_limit && max_lat < max_lat_limit {
        let delta = (angular.sin() / lat.cos()).asin();
        let mut min_lon = lon - delta;
        if min_lon < min_lon_limit {
            min_lon += 2.0 * PI;
        }
        let mut max_lon = lon + delta;
        if max_lon > max_lon_limit {
            max_lon -= 2.0 * PI;
        }
        (min_lon, max_lon)
    } else {
        warn!(lat = center.lat, distance; "Boundary reaches a pole, using the full longitude range");
        min_lat = min_lat.max(min_lat_limit);
        max_lat = max_lat.min(max_lat_limit);
        (min_lon_limit, max_lon_limit)
    };

    GeoBounds::new(
        LonLat::new(min_lon.to_degrees(), min_lat.to_degrees()),
        LonLat::new(max_lon.to_degrees(), max_lat.to_degrees()),
    )
}

/// Axis-aligned box around `points`, widened by `margin` times its
/// range on every side.
///
/// A zero range is widened to 0.1 degrees around the points before the
/// margin is applied, so the box never has zero size.
/// Returns `None` for an empty point set.
pub fn bounding_box(points: &[LonLat], margin: f64) -> Option<GeoBounds> {
    let first = points.first()?;
    let (mut lon_min, mut lon_max, mut lat_min, mut lat_max) =
        points
            .iter()
            .fold((first.lon, first.lon, first.lat, first.lat), |(a, b, c, d), p| {
                (a.min(p.lon), b.max(p.lon), c.min(p.lat), d.max(p.lat))
            });

    let lon_range = widen_degenerate(&mut lon_min, &mut lon_max);
    let lat_range = widen_degenerate(&mut lat_min, &mut lat_max);

    lon_min -= lon_range * margin;
    lon_max += lon_range * margin;
    lat_min -= lat_range * margin;
    lat_max += lat_range * margin;

    Some(GeoBounds::new(
        LonLat::new(lon_min, lat_min),
        LonLat::new(lon_max, lat_max),
    ))
}

/// Gives a zero range the minimum 0.1 degree extent around its value.
fn widen_degenerate(min: &mut f64, max: &mut f64) -> f64 {
    if *max - *min > 0.0 {
        return *max - *min;
    }
    warn!(value = *min; "Zero range bounding box, widening to 0.1 degrees");
    *min -= MIN_RANGE / 2.0;
    *max += MIN_RANGE / 2.0;
    MIN_RANGE
}

/// Great circle distance in metres.
pub fn haversine(a: LonLat, b: LonLat) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_haversine_one_degree_on_equator() {
        let d = haversine(LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0));
        assert_approx_eq!(f64, d, EARTH_RADIUS_M * PI / 180.0, epsilon = 1e-6);
        assert_approx_eq!(f64, haversine(LonLat::new(3.0, 4.0), LonLat::new(3.0, 4.0)), 0.0);
    }

    #[test]
    fn test_boundaries_edges_are_at_distance() {
        let center = LonLat::new(-0.1, 51.5);
        let bounds = compute_boundaries(center, 5_000.0);

        let north = LonLat::new(center.lon, bounds.northeast().lat);
        let south = LonLat::new(center.lon, bounds.southwest().lat);
        let east = LonLat::new(bounds.northeast().lon, center.lat);
        assert_approx_eq!(f64, haversine(center, north), 5_000.0, epsilon = 1e-6);
        assert_approx_eq!(f64, haversine(center, south), 5_000.0, epsilon = 1e-6);
        assert!((haversine(center, east) / 5_000.0 - 1.0).abs() < 1e-3);
        assert!(!bounds.crosses_antimeridian());
    }

    #[test]
    fn test_boundaries_wrap_at_antimeridian() {
        let bounds = compute_boundaries(LonLat::new(179.9, 0.0), 50_000.0);
        assert!(bounds.crosses_antimeridian());
        assert!(bounds.northeast().lon < -179.0);
        assert!(bounds.contains(LonLat::new(180.0, 0.0)));
        assert!(bounds.contains(LonLat::new(-179.95, 0.0)));
        assert!(bounds.lon_span() < 1.0);

        let east = bounds.unwrap_lon(LonLat::new(-179.95, 1.0));
        assert_approx_eq!(f64, east.lon, 180.05, epsilon = 1e-9);
        assert_approx_eq!(f64, east.lat, 1.0);
        assert_eq!(bounds.unwrap_lon(LonLat::new(179.95, 1.0)), LonLat::new(179.95, 1.0));
    }

    #[test]
    fn test_boundaries_near_pole_use_full_longitude() {
        let bounds = compute_boundaries(LonLat::new(20.0, 89.9), 100_000.0);
        assert_approx_eq!(f64, bounds.northeast().lat, 90.0, epsilon = 1e-9);
        assert_approx_eq!(f64, bounds.southwest().lon, -180.0, epsilon = 1e-9);
        assert_approx_eq!(f64, bounds.northeast().lon, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bounding_box_degenerate_range() {
        let bounds = bounding_box(&[LonLat::new(10.0, 20.0)], 0.5).unwrap();
        assert_approx_eq!(f64, bounds.lon_span(), 0.2, epsilon = 1e-9);
        assert_approx_eq!(f64, bounds.southwest().lon, 9.9, epsilon = 1e-9);
        assert_approx_eq!(f64, bounds.northeast().lat, 20.1, epsilon = 1e-9);

        let tight = bounding_box(&[LonLat::new(10.0, 20.0)], 0.0).unwrap();
        assert_approx_eq!(f64, tight.lat_span(), 0.1, epsilon = 1e-9);
        assert!(bounding_box(&[], 0.05).is_none());
    }

    #[test]
    fn test_merge_covers_both() {
        let a = GeoBounds::new(LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0));
        let b = GeoBounds::new(LonLat::new(-2.0, 0.5), LonLat::new(0.5, 3.0));
        let merged = a.merge(&b);
        assert_eq!(merged.southwest(), LonLat::new(-2.0, 0.0));
        assert_eq!(merged.northeast(), LonLat::new(1.0, 3.0));
    }

    fn lon_lat() -> impl Strategy<Value = LonLat> {
        (-170.0f64..170.0, -80.0f64..80.0).prop_map(|(lon, lat)| LonLat::new(lon, lat))
    }

    proptest! {
        #[test]
        fn bounding_box_contains_points(
            points in prop::collection::vec(lon_lat(), 1..20),
            margin in 0.0f64..0.5,
        ) {
            let bounds = bounding_box(&points, margin).unwrap();
            for p in &points {
                prop_assert!(bounds.contains(*p));
            }
        }

        #[test]
        fn smaller_margin_never_grows_box(
            points in prop::collection::vec(lon_lat(), 2..20),
            margin in 0.0f64..0.5,
        ) {
            let wide = bounding_box(&points, margin).unwrap();
            let tight = bounding_box(&points, margin / 2.0).unwrap();
            prop_assert!(tight.lon_span() <= wide.lon_span());
            prop_assert!(tight.lat_span() <= wide.lat_span());
        }

        #[test]
        fn boundaries_latitude_edges_match_distance(
            center in (-170.0f64..170.0, -60.0f64..60.0),
            distance in 100.0f64..200_000.0,
        ) {
            let center = LonLat::new(center.0, center.1);
            let bounds = compute_boundaries(center, distance);
            let north = LonLat::new(center.lon, bounds.northeast().lat);
            prop_assert!((haversine(center, north) / distance - 1.0).abs() < 1e-6);
        }
    }
}
