use std::fmt;

use log::info;
use svg::node::element as svg_element;

use plotweave_core::{draw::RenderLayer, geometry::Point};

use crate::{
    density::{DensityGrid, DensityGridBuilder, Kernel, samples_down_for},
    error::{LayoutError, Result},
    geo::{GeoBounds, LonLat, bounding_box},
    map_layers::{MapFrame, MapLayer},
    palette::{ContinuousPalette, SharedPalette, shared},
    surface::Surface,
};

/// Turns a density grid into drawing primitives.
pub trait ContourRenderer: fmt::Debug {
    fn render(
        &self,
        surface: &mut Surface,
        grid: &DensityGrid,
        frame: &MapFrame,
        origin: Point,
        palette: &ContinuousPalette,
    ) -> Result<()>;
}

/// Fills one rectangle per lattice node, coloured by its value.
///
/// Nodes below `threshold × max` are left empty.
#[derive(Debug, Clone)]
pub struct CellRenderer {
    opacity: f32,
    threshold: f64,
}

impl CellRenderer {
    pub fn new() -> Self {
        Self {
            opacity: 0.7,
            threshold: 0.1,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for CellRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContourRenderer for CellRenderer {
    fn render(
        &self,
        surface: &mut Surface,
        grid: &DensityGrid,
        frame: &MapFrame,
        origin: Point,
        palette: &ContinuousPalette,
    ) -> Result<()> {
        let cell_width = frame.width() / grid.samples_across() as f32;
        let cell_height = frame.height() / grid.samples_down() as f32;
        let cutoff = grid.max() * self.threshold;

        for (row, values) in grid.rows().enumerate() {
            for (column, value) in values.iter().enumerate() {
                if *value <= 0.0 || *value < cutoff {
                    continue;
                }
                let center = frame.to_pixel(grid.cell_lon_lat(row, column));
                // edge cells are cut at the map border
                let x0 = (center.x() - cell_width / 2.0).max(0.0);
                let y0 = (center.y() - cell_height / 2.0).max(0.0);
                let x1 = (center.x() + cell_width / 2.0).min(frame.width());
                let y1 = (center.y() + cell_height / 2.0).min(frame.height());
                if x1 <= x0 || y1 <= y0 {
                    continue;
                }

                let rect = svg_element::Rectangle::new()
                    .set("x", origin.x() + x0)
                    .set("y", origin.y() + y0)
                    .set("width", x1 - x0)
                    .set("height", y1 - y0)
                    .set("fill", palette.color(*value).to_string())
                    .set("fill-opacity", self.opacity);
                surface.add(RenderLayer::Area, rect);
            }
        }
        Ok(())
    }
}

/// Kernel density estimate of a point set.
///
/// The grid is computed when the map configures the layer, with as many
/// rows as the map's aspect ratio gives for the configured columns. The
/// palette is calibrated with 0 and the grid maximum; an all-zero grid
/// leaves the palette untouched.
#[derive(Debug)]
pub struct KdeLayer {
    points: Vec<LonLat>,
    kernel: Kernel,
    samples_across: usize,
    margin: f64,
    palette: SharedPalette<ContinuousPalette>,
    renderer: Box<dyn ContourRenderer>,
    grid: Option<DensityGrid>,
}

impl KdeLayer {
    pub fn new(points: Vec<LonLat>, kernel: Kernel) -> Self {
        Self {
            points,
            kernel,
            samples_across: 20,
            margin: 0.05,
            palette: shared(ContinuousPalette::new()),
            renderer: Box::new(CellRenderer::new()),
            grid: None,
        }
    }

    pub fn with_samples_across(mut self, samples: usize) -> Self {
        self.samples_across = samples.max(1);
        self
    }

    /// Margin fraction around the points when the layer picks the map
    /// boundaries
    pub fn with_bounds_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_palette(mut self, palette: SharedPalette<ContinuousPalette>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_renderer(mut self, renderer: impl ContourRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Grid computed by the last configure
    pub fn grid(&self) -> Option<&DensityGrid> {
        self.grid.as_ref()
    }

    pub fn palette(&self) -> &SharedPalette<ContinuousPalette> {
        &self.palette
    }
}

impl MapLayer for KdeLayer {
    fn boundaries(&self) -> Option<GeoBounds> {
        bounding_box(&self.points, self.margin)
    }

    fn configure(&mut self, frame: &MapFrame) -> Result<()> {
        let samples_down = samples_down_for(self.samples_across, frame.width(), frame.height());
        let grid = DensityGridBuilder::new(self.kernel.clone())
            .with_samples(self.samples_across, samples_down)
            .build(&self.points, frame.bounds(), frame.projection());

        info!(
            points = self.points.len(),
            across = self.samples_across,
            down = samples_down,
            max = grid.max();
            "Density layer configured"
        );

        if !self.points.is_empty() && grid.max() > 0.0 {
            let mut palette = self.palette.borrow_mut();
            palette.allocate(0.0);
            palette.allocate(grid.max());
        }
        self.grid = Some(grid);
        Ok(())
    }

    fn draw(&self, surface: &mut Surface, frame: &MapFrame, origin: Point) -> Result<()> {
        let grid = self
            .grid
            .as_ref()
            .ok_or(LayoutError::NotBuilt { element: "KdeLayer" })?;
        let palette = self.palette.borrow();
        self.renderer.render(surface, grid, frame, origin, &palette)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        element::Format,
        geo::{WebMercator, compute_boundaries},
    };

    fn layer() -> KdeLayer {
        let points = vec![
            LonLat::new(-0.12, 51.50),
            LonLat::new(-0.10, 51.51),
            LonLat::new(-0.11, 51.49),
        ];
        KdeLayer::new(points, Kernel::gaussian(500.0).unwrap()).with_samples_across(10)
    }

    #[test]
    fn test_boundaries_wrap_points() {
        let layer = layer();
        let bounds = layer.boundaries().unwrap();
        assert!(bounds.contains(LonLat::new(-0.12, 51.50)));
        assert!(bounds.contains(LonLat::new(-0.10, 51.51)));
    }

    #[test]
    fn test_configure_calibrates_palette() {
        let mut layer = layer();
        let frame = MapFrame::new(300.0, layer.boundaries().unwrap(), Rc::new(WebMercator));
        layer.configure(&frame).unwrap();

        let grid = layer.grid().unwrap();
        assert_eq!(grid.samples_across(), 10);
        assert_eq!(
            grid.samples_down(),
            samples_down_for(10, frame.width(), frame.height())
        );
        assert!(grid.max() > 0.0);
        assert_eq!(layer.palette().borrow().range(), (0.0, grid.max()));
    }

    #[test]
    fn test_empty_layer_keeps_palette_range() {
        let mut layer = KdeLayer::new(vec![], Kernel::gaussian(100.0).unwrap());
        let bounds = compute_boundaries(LonLat::new(2.35, 48.85), 10_000.0);
        let frame = MapFrame::new(300.0, bounds, Rc::new(WebMercator));
        layer.configure(&frame).unwrap();

        assert_eq!(layer.grid().unwrap().max(), 0.0);
        assert_eq!(layer.palette().borrow().range(), (0.0, 1.0));

        let mut surface = Surface::new(Format::Svg);
        layer.draw(&mut surface, &frame, Point::default()).unwrap();
    }

    #[test]
    fn test_draw_before_configure_fails() {
        let layer = layer();
        let frame = MapFrame::new(300.0, layer.boundaries().unwrap(), Rc::new(WebMercator));
        let mut surface = Surface::new(Format::Svg);
        assert!(layer.draw(&mut surface, &frame, Point::default()).is_err());
    }

    #[test]
    fn test_cells_are_drawn_inside_map() {
        let mut layer = layer();
        let frame = MapFrame::new(300.0, layer.boundaries().unwrap(), Rc::new(WebMercator));
        layer.configure(&frame).unwrap();

        let mut surface = Surface::new(Format::Svg);
        layer.draw(&mut surface, &frame, Point::new(10.0, 10.0)).unwrap();
        let output = surface.finish().unwrap();
        let svg = output.nodes[0].to_string();
        assert!(svg.contains("data-layer=\"area\""));
        assert!(svg.matches("<rect").count() > 0);
    }
}
