use plotweave_core::geometry::Orientation;

use crate::{
    axis::Axis,
    chart::{ChartArea, Plot},
    element::BuildContext,
    error::Result,
    marker::MarkerManager,
    palette::{DiscretePalette, SharedPalette, shared},
    surface::Surface,
};

/// One point of a scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    x: f64,
    y: f64,
    category: Option<String>,
    size: Option<f64>,
    label: Option<String>,
}

impl ScatterPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            category: None,
            size: None,
            label: None,
        }
    }

    /// Category used to pick the marker colour
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Value scaled into the marker radius
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    fn tooltip(&self) -> String {
        let prefix = [self.label.as_deref(), self.category.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if prefix.is_empty() {
            format!("({:.2}, {:.2})", self.x, self.y)
        } else {
            format!("{prefix}: ({:.2}, {:.2})", self.x, self.y)
        }
    }
}

/// Points coloured by category and sized by value.
///
/// An empty data set plots nothing over the unit square.
#[derive(Debug)]
pub struct ScatterPlot {
    points: Vec<ScatterPoint>,
    palette: SharedPalette<DiscretePalette>,
    markers: MarkerManager,
    x_label: String,
    y_label: String,
}

impl ScatterPlot {
    pub fn new(points: Vec<ScatterPoint>) -> Self {
        Self {
            points,
            palette: shared(DiscretePalette::new()),
            markers: MarkerManager::new(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
        }
    }

    pub fn with_palette(mut self, palette: SharedPalette<DiscretePalette>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_marker_manager(mut self, markers: MarkerManager) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn palette(&self) -> &SharedPalette<DiscretePalette> {
        &self.palette
    }

    /// `[x_min, x_max, y_min, y_max]` of the data, the unit square when empty
    pub fn data_range(&self) -> [f64; 4] {
        let Some(first) = self.points.first() else {
            return [0.0, 1.0, 0.0, 1.0];
        };
        self.points.iter().fold(
            [first.x, first.x, first.y, first.y],
            |[x0, x1, y0, y1], p| [x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)],
        )
    }
}

impl Plot for ScatterPlot {
    fn axes(&self) -> Result<(Axis, Axis)> {
        let [x_min, x_max, y_min, y_max] = self.data_range();
        Ok((
            Axis::continuous(0.0, Orientation::Horizontal, x_min, x_max)?.with_label(&self.x_label),
            Axis::continuous(0.0, Orientation::Vertical, y_min, y_max)?.with_label(&self.y_label),
        ))
    }

    fn build(&mut self, _ctx: &BuildContext<'_>) -> Result<()> {
        let mut palette = self.palette.borrow_mut();
        for point in &self.points {
            if let Some(category) = &point.category {
                palette.allocate(category);
            }
            if let Some(size) = point.size {
                self.markers.note_size(size);
            }
        }
        Ok(())
    }

    fn draw_plot(&self, surface: &mut Surface, area: &ChartArea<'_>) -> Result<()> {
        let palette = self.palette.borrow();
        for point in &self.points {
            let fill = match &point.category {
                Some(category) => palette.color(category),
                None => palette.default_color(),
            };
            let tooltip = point.tooltip();
            self.markers.marker(point.size).draw(
                surface,
                area.to_pixel(point.x, point.y),
                fill,
                Some(&tooltip),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use plotweave_core::{fonts::HeuristicMeasurer, geometry::Point};

    use super::*;
    use crate::{
        chart::Chart,
        element::{Element, Format},
    };

    #[test]
    fn test_empty_scatter_uses_unit_range() {
        let plot = ScatterPlot::new(Vec::new());
        assert_eq!(plot.data_range(), [0.0, 1.0, 0.0, 1.0]);
        let (x, y) = plot.axes().unwrap();
        assert_eq!(x.min_value(), Some(0.0));
        assert_eq!(y.max_value(), Some(1.0));
    }

    #[test]
    fn test_data_range() {
        let plot = ScatterPlot::new(vec![
            ScatterPoint::new(1.0, -2.0),
            ScatterPoint::new(-3.0, 5.0),
            ScatterPoint::new(2.0, 0.0),
        ]);
        assert_eq!(plot.data_range(), [-3.0, 2.0, -2.0, 5.0]);
    }

    #[test]
    fn test_tooltip_text() {
        let point = ScatterPoint::new(1.0, 2.5).with_label("a").with_category("b");
        assert_eq!(point.tooltip(), "a b: (1.00, 2.50)");
        assert_eq!(ScatterPoint::new(0.0, 0.0).tooltip(), "(0.00, 0.00)");
    }

    #[test]
    fn test_scatter_draws_one_marker_per_point() {
        let measurer = HeuristicMeasurer::default();
        let ctx = BuildContext::new(Format::Svg, &measurer);
        let plot = ScatterPlot::new(vec![
            ScatterPoint::new(0.0, 0.0).with_category("a"),
            ScatterPoint::new(1.0, 1.0).with_category("b").with_size(4.0),
        ]);
        let palette = plot.palette().clone();
        let mut chart = Chart::new(plot, 300.0, 200.0).unwrap();
        chart.build(&ctx).unwrap();
        assert_eq!(palette.borrow().len(), 2);

        let mut surface = Surface::new(Format::Svg);
        chart.draw(&mut surface, Point::new(150.0, 100.0)).unwrap();
        let svg: String = surface
            .finish()
            .unwrap()
            .nodes
            .iter()
            .map(|node| node.to_string())
            .collect();
        assert_eq!(svg.matches("<circle").count(), 2);
    }
}
