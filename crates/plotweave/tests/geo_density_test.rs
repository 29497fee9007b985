//! Integration tests for the geographic pipeline: boundaries, projection,
//! density grid and map rendering.

use float_cmp::assert_approx_eq;

use plotweave::{
    BuildContext, Element, Format, Surface,
    containers::Map,
    density::{DensityGridBuilder, Kernel},
    fonts::HeuristicMeasurer,
    geo::{LonLat, Projection, WebMercator, bounding_box, compute_boundaries, haversine},
    geometry::Point,
    map_layers::{GridSquares, KdeLayer},
};

#[test]
fn test_boundaries_match_haversine_distance() {
    for (lon, lat) in [(2.35, 48.85), (-73.98, 40.75), (151.2, -33.87)] {
        let center = LonLat::new(lon, lat);
        let radius = 10_000.0;
        let bounds = compute_boundaries(center, radius);

        let edges = [
            LonLat::new(lon, bounds.northeast().lat),
            LonLat::new(lon, bounds.southwest().lat),
            LonLat::new(bounds.northeast().lon, lat),
            LonLat::new(bounds.southwest().lon, lat),
        ];
        for edge in edges {
            let relative = (haversine(center, edge) - radius).abs() / radius;
            assert!(relative < 1e-3, "edge {edge:?} is off by {relative}");
        }
    }
}

#[test]
fn test_bounding_box_contains_points() {
    let points = [
        LonLat::new(-0.12, 51.50),
        LonLat::new(-0.10, 51.52),
        LonLat::new(-0.14, 51.49),
    ];
    let bounds = bounding_box(&points, 0.1).unwrap();
    assert!(points.iter().all(|p| bounds.contains(*p)));
    assert_approx_eq!(f64, bounds.lon_span(), 0.04 * 1.2, epsilon = 1e-9);
}

#[test]
fn test_single_point_density_is_local() {
    let center = LonLat::new(13.4, 52.52);
    let bandwidth = 1_500.0;
    let kernel = Kernel::custom("step", bandwidth, |d| if d <= 1.0 { 1.0 } else { 0.0 }).unwrap();
    let grid = DensityGridBuilder::new(kernel)
        .with_samples(16, 16)
        .build(&[center], compute_boundaries(center, 4_000.0), &WebMercator);

    let origin = WebMercator.from_lon_lat(center);
    let mut nonzero = 0;
    for row in 0..grid.row_count() {
        for column in 0..grid.columns() {
            let value = grid.value(row, column).unwrap();
            let distance = WebMercator
                .from_lon_lat(grid.cell_lon_lat(row, column))
                .distance(&origin);
            if value > 0.0 {
                nonzero += 1;
                assert!(distance <= bandwidth);
            }
        }
    }
    assert!(nonzero > 0);
    assert_approx_eq!(f64, grid.max(), grid.value(8, 8).unwrap());
}

#[test]
fn test_density_map_renders_cells_and_graticule() {
    let points: Vec<LonLat> = (0..25)
        .map(|i| LonLat::new(4.88 + 0.002 * f64::from(i % 5), 52.36 + 0.002 * f64::from(i / 5)))
        .collect();

    let mut map = Map::new(400.0);
    map.add_layer(KdeLayer::new(points, Kernel::gaussian(300.0).unwrap()).with_samples_across(12))
        .add_layer(GridSquares::new(0.005).unwrap());

    let measurer = HeuristicMeasurer::default();
    map.build(&BuildContext::new(Format::Svg, &measurer)).unwrap();
    assert_approx_eq!(f32, map.width(), 400.0);
    assert!(map.height() > 0.0);

    let mut surface = Surface::new(Format::Svg);
    map.draw(&mut surface, Point::new(200.0, map.height() / 2.0))
        .unwrap();
    let svg: String = surface
        .finish()
        .unwrap()
        .nodes
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(svg.contains("<rect"));
    assert!(svg.contains("<line"));
}
