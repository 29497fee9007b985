//! Charts: a plot strategy framed by an x and a y axis.
//!
//! A [`Chart`] has a fixed outer size. Building it lets the axes and the
//! plot area share that space (see [`ChartArea::negotiate`]); drawing
//! hands the resulting [`ChartArea`] to the [`Plot`].

mod bar;
mod scatter;

pub use bar::BarPlot;
pub use scatter::{ScatterPlot, ScatterPoint};

use std::fmt;

use log::debug;
use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition},
    geometry::{Bounds, Point, Size},
};

use crate::{
    axis::Axis,
    element::{BuildContext, Element},
    error::{LayoutError, Result},
    surface::Surface,
};

/// What a chart draws inside its axes.
pub trait Plot: fmt::Debug {
    /// Creates the x and y axes for the plotted data. Lengths are set by
    /// the chart during build.
    fn axes(&self) -> Result<(Axis, Axis)>;

    /// Prepares data dependent state such as palette allocation.
    fn build(&mut self, _ctx: &BuildContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Draws the data inside `area`.
    fn draw_plot(&self, surface: &mut Surface, area: &ChartArea<'_>) -> Result<()>;
}

/// The plot region of a chart and the axes mapping values into it.
#[derive(Debug, Clone, Copy)]
pub struct ChartArea<'a> {
    bounds: Bounds,
    x_axis: &'a Axis,
    y_axis: &'a Axis,
}

impl<'a> ChartArea<'a> {
    pub fn new(bounds: Bounds, x_axis: &'a Axis, y_axis: &'a Axis) -> Self {
        Self {
            bounds,
            x_axis,
            y_axis,
        }
    }

    /// Fits both axes into `outer` minus `margin` on each side.
    ///
    /// The axes are first built at full length to learn their footprints,
    /// then shortened by the other axis' footprint and built again. The
    /// second build may change a footprint slightly (different ticks); that
    /// difference is not fed back, so a chart can overflow its margins by
    /// a few pixels.
    pub fn negotiate(
        ctx: &BuildContext<'_>,
        outer: Size,
        margin: Size,
        x_axis: &mut Axis,
        y_axis: &mut Axis,
        visible: (bool, bool),
    ) -> Result<()> {
        let inner_width = (outer.width() - 2.0 * margin.width()).max(0.0);
        let inner_height = (outer.height() - 2.0 * margin.height()).max(0.0);

        x_axis.set_length(inner_width);
        y_axis.set_length(inner_height);
        x_axis.build(ctx)?;
        y_axis.build(ctx)?;

        let (x_footprint, y_footprint) = visible_footprints(x_axis, y_axis, visible);
        x_axis.set_length((inner_width - y_footprint).max(0.0));
        y_axis.set_length((inner_height - x_footprint).max(0.0));
        x_axis.build(ctx)?;
        y_axis.build(ctx)?;

        debug!(
            x_length = x_axis.length(),
            y_length = y_axis.length(),
            x_footprint,
            y_footprint;
            "Chart axes negotiated"
        );
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn x_axis(&self) -> &'a Axis {
        self.x_axis
    }

    pub fn y_axis(&self) -> &'a Axis {
        self.y_axis
    }

    /// Horizontal pixel position of a continuous x value
    pub fn x_pixel(&self, value: f64) -> f32 {
        self.x_axis.point_position(self.bounds.min_x(), value)
    }

    /// Vertical pixel position of a continuous y value. Values grow
    /// upwards.
    pub fn y_pixel(&self, value: f64) -> f32 {
        self.bounds.max_y() - self.y_axis.point_position(0.0, value)
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> Point {
        Point::new(self.x_pixel(x), self.y_pixel(y))
    }

    /// Horizontal extent of the x category band at `index`
    pub fn x_band(&self, index: usize) -> Option<(f32, f32)> {
        self.x_axis.category_band(self.bounds.min_x(), index)
    }
}

fn visible_footprints(x_axis: &Axis, y_axis: &Axis, visible: (bool, bool)) -> (f32, f32) {
    let x = if visible.0 { x_axis.footprint() } else { 0.0 };
    let y = if visible.1 { y_axis.footprint() } else { 0.0 };
    (x, y)
}

/// A fixed size chart element.
#[derive(Debug)]
pub struct Chart {
    plot: Box<dyn Plot>,
    size: Size,
    margin: Size,
    grid: Option<StrokeDefinition>,
    show_x_axis: bool,
    show_y_axis: bool,
    x_axis: Axis,
    y_axis: Axis,
    built: bool,
}

impl Chart {
    /// Creates a `width` × `height` chart of `plot`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Plot::axes`], for example a discrete axis
    /// without categories.
    pub fn new(plot: impl Plot + 'static, width: f32, height: f32) -> Result<Self> {
        let (x_axis, y_axis) = plot.axes()?;
        Ok(Self {
            plot: Box::new(plot),
            size: Size::new(width, height),
            margin: Size::default(),
            grid: None,
            show_x_axis: true,
            show_y_axis: true,
            x_axis,
            y_axis,
            built: false,
        })
    }

    /// Space kept free on the left/right and top/bottom edges
    pub fn with_margins(mut self, horizontal: f32, vertical: f32) -> Self {
        self.margin = Size::new(horizontal, vertical);
        self
    }

    /// Draws grid lines at the ticks of continuous axes
    pub fn with_grid(mut self, stroke: StrokeDefinition) -> Self {
        self.grid = Some(stroke);
        self
    }

    /// Grey one pixel grid
    pub fn with_default_grid(self) -> Self {
        let grey = Color::new("grey").unwrap_or_default();
        self.with_grid(StrokeDefinition::solid(grey, 1.0))
    }

    /// Hides axes. Hidden axes still map values but take no space.
    pub fn with_axes_visible(mut self, x: bool, y: bool) -> Self {
        self.show_x_axis = x;
        self.show_y_axis = y;
        self
    }

    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    fn plot_bounds(&self, center: Point) -> Bounds {
        let (_, y_footprint) = visible_footprints(
            &self.x_axis,
            &self.y_axis,
            (self.show_x_axis, self.show_y_axis),
        );
        let outer = center.to_bounds(self.size).min_point();
        let top_left = Point::new(
            outer.x() + self.margin.width() + y_footprint,
            outer.y() + self.margin.height(),
        );
        Bounds::new_from_top_left(
            top_left,
            Size::new(self.x_axis.length(), self.y_axis.length()),
        )
    }

    fn draw_grid(&self, surface: &mut Surface, area: &ChartArea<'_>, stroke: &StrokeDefinition) {
        let bounds = area.bounds();
        if !self.y_axis.is_discrete() {
            for offset in self.y_axis.tick_positions(0.0) {
                let y = bounds.max_y() - offset;
                let line = svg_element::Line::new()
                    .set("x1", bounds.min_x())
                    .set("y1", y)
                    .set("x2", bounds.max_x())
                    .set("y2", y);
                surface.add(RenderLayer::Grid, apply_stroke!(line, stroke));
            }
        }
        if !self.x_axis.is_discrete() {
            for x in self.x_axis.tick_positions(bounds.min_x()) {
                let line = svg_element::Line::new()
                    .set("x1", x)
                    .set("y1", bounds.min_y())
                    .set("x2", x)
                    .set("y2", bounds.max_y());
                surface.add(RenderLayer::Grid, apply_stroke!(line, stroke));
            }
        }
    }
}

impl Element for Chart {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        self.plot.build(ctx)?;
        ChartArea::negotiate(
            ctx,
            self.size,
            self.margin,
            &mut self.x_axis,
            &mut self.y_axis,
            (self.show_x_axis, self.show_y_axis),
        )?;
        self.built = true;
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        if !self.built {
            return Err(LayoutError::NotBuilt { element: "Chart" }.into());
        }

        let bounds = self.plot_bounds(center);
        let area = ChartArea::new(bounds, &self.x_axis, &self.y_axis);
        let corner = Point::new(bounds.min_x(), bounds.max_y());

        if self.show_x_axis {
            self.x_axis.draw_along(surface, corner)?;
        }
        if self.show_y_axis {
            self.y_axis.draw_along(surface, corner)?;
        }
        if let Some(stroke) = &self.grid {
            self.draw_grid(surface, &area, stroke);
        }
        self.plot.draw_plot(surface, &area)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use plotweave_core::{fonts::HeuristicMeasurer, geometry::Orientation};

    use super::*;
    use crate::element::Format;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: std::cell::Cell<Option<(f32, f32, f32, f32)>>,
    }

    impl Plot for Recorder {
        fn axes(&self) -> Result<(Axis, Axis)> {
            Ok((
                Axis::continuous(0.0, Orientation::Horizontal, 0.0, 10.0)?,
                Axis::continuous(0.0, Orientation::Vertical, 0.0, 100.0)?,
            ))
        }

        fn draw_plot(&self, _surface: &mut Surface, area: &ChartArea<'_>) -> Result<()> {
            let b = area.bounds();
            self.seen.set(Some((b.min_x(), b.min_y(), b.width(), b.height())));
            Ok(())
        }
    }

    #[test]
    fn test_negotiation_shortens_axes_by_footprints() {
        let measurer = HeuristicMeasurer::default();
        let ctx = BuildContext::new(Format::Svg, &measurer);
        let mut chart = Chart::new(Recorder::default(), 400.0, 300.0)
            .unwrap()
            .with_margins(10.0, 20.0);
        chart.build(&ctx).unwrap();

        let x = chart.x_axis();
        let y = chart.y_axis();
        assert_approx_eq!(f32, x.length(), 400.0 - 20.0 - y.footprint(), epsilon = 1e-3);
        assert_approx_eq!(f32, y.length(), 300.0 - 40.0 - x.footprint(), epsilon = 1e-3);
        assert_approx_eq!(f32, chart.width(), 400.0);
    }

    #[test]
    fn test_plot_area_sits_right_of_y_axis() {
        let measurer = HeuristicMeasurer::default();
        let ctx = BuildContext::new(Format::Svg, &measurer);
        let recorder = Recorder::default();
        let mut chart = Chart::new(recorder, 400.0, 300.0).unwrap().with_margins(10.0, 20.0);
        chart.build(&ctx).unwrap();

        let mut surface = Surface::new(Format::Svg);
        chart.draw(&mut surface, Point::new(200.0, 150.0)).unwrap();

        let bounds = chart.plot_bounds(Point::new(200.0, 150.0));
        assert_approx_eq!(f32, bounds.min_x(), 10.0 + chart.y_axis().footprint(), epsilon = 1e-3);
        assert_approx_eq!(f32, bounds.min_y(), 20.0);
        assert_approx_eq!(f32, bounds.width(), chart.x_axis().length());
    }

    #[test]
    fn test_hidden_axes_take_no_space() {
        let measurer = HeuristicMeasurer::default();
        let ctx = BuildContext::new(Format::Svg, &measurer);
        let mut chart = Chart::new(Recorder::default(), 200.0, 100.0)
            .unwrap()
            .with_axes_visible(false, false);
        chart.build(&ctx).unwrap();
        assert_approx_eq!(f32, chart.x_axis().length(), 200.0);
        assert_approx_eq!(f32, chart.y_axis().length(), 100.0);
    }

    #[test]
    fn test_y_pixel_grows_upwards() {
        let x = Axis::continuous(100.0, Orientation::Horizontal, 0.0, 10.0).unwrap();
        let y = Axis::continuous(50.0, Orientation::Vertical, 0.0, 5.0).unwrap();
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(100.0, 50.0));
        let area = ChartArea::new(bounds, &x, &y);
        assert_approx_eq!(f32, area.y_pixel(0.0), 60.0);
        assert_approx_eq!(f32, area.y_pixel(5.0), 10.0);
        assert_approx_eq!(f32, area.x_pixel(10.0), 110.0);
    }

    #[test]
    fn test_draw_before_build_fails() {
        let chart = Chart::new(Recorder::default(), 100.0, 100.0).unwrap();
        let mut surface = Surface::new(Format::Svg);
        assert!(chart.draw(&mut surface, Point::new(0.0, 0.0)).is_err());
    }
}
