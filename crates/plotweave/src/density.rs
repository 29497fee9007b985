//! Kernel density estimation over a geographic lattice.
//!
//! [`DensityGridBuilder`] samples a regular lattice spanning a boundary
//! and sums the kernel weight of every data point at every lattice node.
//! The cost is `O(nodes × points)` with no spatial index, which limits it
//! to a few thousand points at the default resolution.

use std::{f64::consts::PI, fmt, sync::Arc};

use log::debug;

use crate::{
    error::{PlotweaveError, Result},
    geo::{GeoBounds, LonLat, PlanarPoint, Projection},
};

type KernelFn = dyn Fn(f64) -> f64 + Send + Sync;

/// Weight of a point as a function of its normalized distance.
///
/// The kernel only ever sees `distance / bandwidth`; dividing by the
/// bandwidth is the grid builder's job.
#[derive(Clone)]
pub struct Kernel {
    name: String,
    bandwidth: f64,
    f: Arc<KernelFn>,
}

impl Kernel {
    /// 0.5 within one bandwidth, 0 beyond.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `bandwidth` is positive.
    pub fn uniform(bandwidth: f64) -> Result<Self> {
        Self::custom("uniform", bandwidth, |d| if d <= 1.0 { 0.5 } else { 0.0 })
    }

    /// Standard normal density at the normalized distance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `bandwidth` is positive.
    pub fn gaussian(bandwidth: f64) -> Result<Self> {
        Self::custom("gaussian", bandwidth, |d| {
            (-0.5 * d * d).exp() / (2.0 * PI).sqrt()
        })
    }

    /// A caller supplied kernel. `f` should not increase with distance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `bandwidth` is positive.
    pub fn custom(
        name: impl Into<String>,
        bandwidth: f64,
        f: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Result<Self> {
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return Err(PlotweaveError::config(format!(
                "kernel bandwidth must be positive, got {bandwidth}"
            )));
        }
        Ok(Self {
            name: name.into(),
            bandwidth,
            f: Arc::new(f),
        })
    }

    /// Looks up `uniform` or `gaussian`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for other names or a non positive
    /// bandwidth.
    pub fn from_name(name: &str, bandwidth: f64) -> Result<Self> {
        match name {
            "uniform" => Self::uniform(bandwidth),
            "gaussian" => Self::gaussian(bandwidth),
            other => Err(PlotweaveError::config(format!(
                "unknown kernel `{other}`, expected uniform or gaussian"
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bandwidth in metres
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn weight(&self, normalized_distance: f64) -> f64 {
        (self.f)(normalized_distance)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("name", &self.name)
            .field("bandwidth", &self.bandwidth)
            .finish_non_exhaustive()
    }
}

/// Rows for a lattice `samples_across` columns wide over a `width` ×
/// `height` area, at least one.
pub fn samples_down_for(samples_across: usize, width: f32, height: f32) -> usize {
    if width <= 0.0 {
        return 1;
    }
    ((samples_across as f32 * height / width) as usize).max(1)
}

/// Density values on a `(samples_down + 1) × (samples_across + 1)` lattice.
///
/// Row 0 is the northern edge, column 0 the western edge.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    values: Vec<f64>,
    max: f64,
    samples_across: usize,
    samples_down: usize,
    bounds: GeoBounds,
}

impl DensityGrid {
    pub fn samples_across(&self) -> usize {
        self.samples_across
    }

    pub fn samples_down(&self) -> usize {
        self.samples_down
    }

    /// Number of lattice columns
    pub fn columns(&self) -> usize {
        self.samples_across + 1
    }

    /// Number of lattice rows
    pub fn row_count(&self) -> usize {
        self.samples_down + 1
    }

    /// Largest value on the lattice
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.row_count() || column >= self.columns() {
            return None;
        }
        self.values.get(row * self.columns() + column).copied()
    }

    /// Geographic position of a lattice node, longitude in [-180, 180]
    pub fn cell_lon_lat(&self, row: usize, column: usize) -> LonLat {
        let mut position =
            lattice_position(&self.bounds, row, column, self.samples_down, self.samples_across);
        if position.lon > 180.0 {
            position.lon -= 360.0;
        }
        position
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.columns())
    }
}

/// Node position with the longitude counted east from the western edge,
/// past 180° for bounds crossing the antimeridian.
fn lattice_position(bounds: &GeoBounds, row: usize, column: usize, down: usize, across: usize) -> LonLat {
    let sw = bounds.southwest();
    let ne = bounds.northeast();
    let x_frac = column as f64 / across as f64;
    let y_frac = row as f64 / down as f64;

    LonLat::new(
        sw.lon + x_frac * bounds.lon_span(),
        ne.lat + y_frac * (sw.lat - ne.lat),
    )
}

/// Evaluates a [`Kernel`] over a lattice.
#[derive(Debug, Clone)]
pub struct DensityGridBuilder {
    kernel: Kernel,
    samples_across: usize,
    samples_down: usize,
}

impl DensityGridBuilder {
    /// A 20 × 20 lattice
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            samples_across: 20,
            samples_down: 20,
        }
    }

    /// Lattice resolution; zero is raised to one.
    pub fn with_samples(mut self, across: usize, down: usize) -> Self {
        self.samples_across = across.max(1);
        self.samples_down = down.max(1);
        self
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Computes the density of `points` over `bounds`.
    ///
    /// Each node value is `Σ kernel(distance / bandwidth) / (n × bandwidth)`
    /// with distances measured on the projected plane. An empty point set
    /// gives an all-zero grid.
    pub fn build(&self, points: &[LonLat], bounds: GeoBounds, projection: &dyn Projection) -> DensityGrid {
        let across = self.samples_across;
        let down = self.samples_down;
        let bandwidth = self.kernel.bandwidth();

        // points and nodes share the unwrapped longitude range
        let projected: Vec<PlanarPoint> = points
            .iter()
            .map(|p| projection.from_lon_lat(bounds.unwrap_lon(*p)))
            .collect();
        let norm = projected.len() as f64 * bandwidth;

        let mut values = Vec::with_capacity((across + 1) * (down + 1));
        let mut max = 0.0f64;
        for row in 0..=down {
            for column in 0..=across {
                let node = projection.from_lon_lat(lattice_position(&bounds, row, column, down, across));
                let value = if projected.is_empty() {
                    0.0
                } else {
                    let sum: f64 = projected
                        .iter()
                        .map(|p| self.kernel.weight(node.distance(p) / bandwidth))
                        .sum();
                    sum / norm
                };
                max = max.max(value);
                values.push(value);
            }
        }

        debug!(
            kernel = self.kernel.name(),
            points = points.len(),
            across,
            down,
            max;
            "Density grid built"
        );

        DensityGrid {
            values,
            max,
            samples_across: across,
            samples_down: down,
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::geo::{WebMercator, compute_boundaries};

    #[test]
    fn test_named_kernels() {
        let gaussian = Kernel::from_name("gaussian", 500.0).unwrap();
        assert_approx_eq!(f64, gaussian.weight(0.0), 0.398_942_280_401_432_7, epsilon = 1e-12);
        assert!(gaussian.weight(1.0) < gaussian.weight(0.5));

        let uniform = Kernel::from_name("uniform", 500.0).unwrap();
        assert_approx_eq!(f64, uniform.weight(1.0), 0.5);
        assert_approx_eq!(f64, uniform.weight(1.01), 0.0);
        assert_approx_eq!(f64, uniform.bandwidth(), 500.0);
    }

    #[test]
    fn test_kernel_configuration_errors() {
        assert!(Kernel::from_name("epanechnikov", 1.0).unwrap_err().is_config());
        assert!(Kernel::gaussian(0.0).unwrap_err().is_config());
        assert!(Kernel::uniform(f64::NAN).unwrap_err().is_config());
    }

    #[test]
    fn test_samples_down_follows_aspect() {
        assert_eq!(samples_down_for(20, 800.0, 400.0), 10);
        assert_eq!(samples_down_for(20, 800.0, 10.0), 1);
        assert_eq!(samples_down_for(20, 0.0, 10.0), 1);
    }

    #[test]
    fn test_single_point_step_kernel() {
        let center = LonLat::new(2.35, 48.85);
        let bounds = compute_boundaries(center, 5_000.0);
        let bandwidth = 2_000.0;
        let kernel = Kernel::custom("step", bandwidth, |d| if d <= 1.0 { 1.0 } else { 0.0 }).unwrap();
        let grid = DensityGridBuilder::new(kernel)
            .with_samples(20, 20)
            .build(&[center], bounds, &WebMercator);

        assert_eq!(grid.rows().count(), 21);
        assert!(grid.rows().all(|row| row.len() == 21));

        let origin = WebMercator.from_lon_lat(center);
        for row in 0..grid.row_count() {
            for column in 0..grid.columns() {
                let node = WebMercator.from_lon_lat(grid.cell_lon_lat(row, column));
                let value = grid.value(row, column).unwrap();
                assert_eq!(value > 0.0, node.distance(&origin) <= bandwidth);
            }
        }
        assert_approx_eq!(f64, grid.max(), 1.0 / bandwidth);
        assert_approx_eq!(f64, grid.value(10, 10).unwrap(), grid.max());
    }

    #[test]
    fn test_empty_points_give_zero_grid() {
        let bounds = compute_boundaries(LonLat::new(0.0, 0.0), 1_000.0);
        let grid = DensityGridBuilder::new(Kernel::gaussian(100.0).unwrap())
            .with_samples(4, 2)
            .build(&[], bounds, &WebMercator);
        assert_eq!(grid.max(), 0.0);
        assert_eq!(grid.rows().count(), 3);
        assert!(grid.rows().flatten().all(|v| *v == 0.0));
        assert_eq!(grid.value(3, 0), None);
    }

    #[test]
    fn test_density_is_symmetric_across_antimeridian() {
        let center = LonLat::new(179.999, 0.0);
        let bounds = compute_boundaries(center, 5_000.0);
        assert!(bounds.crosses_antimeridian());

        let grid = DensityGridBuilder::new(Kernel::uniform(3_000.0).unwrap())
            .with_samples(20, 20)
            .build(&[center], bounds, &WebMercator);

        for offset in 1..=10 {
            let west = grid.value(10, 10 - offset).unwrap();
            let east = grid.value(10, 10 + offset).unwrap();
            assert_eq!(west > 0.0, east > 0.0, "columns {} and {}", 10 - offset, 10 + offset);
        }
        assert!(grid.value(10, 14).unwrap() > 0.0);
        assert_approx_eq!(f64, grid.max(), grid.value(10, 10).unwrap());

        let east_node = grid.cell_lon_lat(10, 15);
        assert!(east_node.lon < -179.9 && east_node.lon >= -180.0);
    }

    #[test]
    fn test_lattice_rows_run_north_to_south() {
        let bounds = GeoBounds::new(LonLat::new(0.0, 0.0), LonLat::new(4.0, 2.0));
        let grid = DensityGridBuilder::new(Kernel::gaussian(100.0).unwrap())
            .with_samples(4, 2)
            .build(&[], bounds, &WebMercator);
        assert_eq!(grid.cell_lon_lat(0, 0), LonLat::new(0.0, 2.0));
        assert_eq!(grid.cell_lon_lat(2, 4), LonLat::new(4.0, 0.0));
    }
}
