use svg::node::element as svg_element;

use plotweave_core::{draw::RenderLayer, geometry::Orientation};

use crate::{
    axis::Axis,
    chart::{ChartArea, Plot},
    element::BuildContext,
    error::{PlotweaveError, Result},
    palette::{DiscretePalette, SharedPalette, shared},
    surface::Surface,
};

/// One bar per category, coloured by category.
///
/// The value axis always includes zero so bars grow from the baseline,
/// downwards for negative values.
#[derive(Debug)]
pub struct BarPlot {
    bars: Vec<(String, f64)>,
    palette: SharedPalette<DiscretePalette>,
    bar_fraction: f32,
    value_label: Option<String>,
}

impl BarPlot {
    pub fn new<I, S>(bars: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            bars: bars.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            palette: shared(DiscretePalette::new()),
            bar_fraction: 0.8,
            value_label: None,
        }
    }

    pub fn with_palette(mut self, palette: SharedPalette<DiscretePalette>) -> Self {
        self.palette = palette;
        self
    }

    /// Share of each category band covered by its bar
    pub fn with_bar_fraction(mut self, fraction: f32) -> Self {
        self.bar_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_value_label(mut self, label: impl Into<String>) -> Self {
        self.value_label = Some(label.into());
        self
    }

    pub fn palette(&self) -> &SharedPalette<DiscretePalette> {
        &self.palette
    }
}

impl Plot for BarPlot {
    fn axes(&self) -> Result<(Axis, Axis)> {
        if self.bars.is_empty() {
            return Err(PlotweaveError::config("a bar plot needs at least one bar"));
        }
        let (low, high) = self
            .bars
            .iter()
            .fold((0.0f64, 0.0f64), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));

        let x_axis = Axis::discrete(
            0.0,
            Orientation::Horizontal,
            self.bars.iter().map(|(k, _)| k.as_str()),
        )?;
        let mut y_axis = Axis::continuous(0.0, Orientation::Vertical, low, high)?;
        if let Some(label) = &self.value_label {
            y_axis = y_axis.with_label(label);
        }
        Ok((x_axis, y_axis))
    }

    fn build(&mut self, _ctx: &BuildContext<'_>) -> Result<()> {
        let mut palette = self.palette.borrow_mut();
        for (category, _) in &self.bars {
            palette.allocate(category);
        }
        Ok(())
    }

    fn draw_plot(&self, surface: &mut Surface, area: &ChartArea<'_>) -> Result<()> {
        let palette = self.palette.borrow();
        let baseline = area.y_pixel(0.0);
        for (category, value) in &self.bars {
            let Some(index) = area.x_axis().category_index(category) else {
                continue;
            };
            let Some((start, end)) = area.x_band(index) else {
                continue;
            };

            let band = end - start;
            let width = band * self.bar_fraction;
            let top = area.y_pixel(*value);
            let rect = svg_element::Rectangle::new()
                .set("x", start + (band - width) / 2.0)
                .set("y", top.min(baseline))
                .set("width", width)
                .set("height", (top - baseline).abs())
                .set("fill", palette.color(category).to_string())
                .add(svg_element::Title::new(format!("{category}: {value}")));
            surface.add(RenderLayer::Content, rect);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use plotweave_core::{
        fonts::HeuristicMeasurer,
        geometry::{Bounds, Point, Size},
    };

    use super::*;
    use crate::element::{Element, Format};

    #[test]
    fn test_value_axis_includes_zero() {
        let plot = BarPlot::new([("a", 3.0), ("b", 7.0)]);
        let (x, y) = plot.axes().unwrap();
        assert!(x.is_discrete());
        assert_eq!(y.min_value(), Some(0.0));
        assert_eq!(y.max_value(), Some(7.0));

        let plot = BarPlot::new([("a", -4.0), ("b", 2.0)]);
        let (_, y) = plot.axes().unwrap();
        assert_eq!(y.min_value(), Some(-4.0));
    }

    #[test]
    fn test_empty_bar_plot_is_config_error() {
        let plot = BarPlot::new(Vec::<(String, f64)>::new());
        assert!(plot.axes().unwrap_err().is_config());
    }

    #[test]
    fn test_negative_bar_hangs_below_baseline() {
        let measurer = HeuristicMeasurer::default();
        let ctx = BuildContext::new(Format::Svg, &measurer);
        let mut plot = BarPlot::new([("up", 10.0), ("down", -10.0)]);
        plot.build(&ctx).unwrap();

        let (mut x, mut y) = plot.axes().unwrap();
        x.set_length(100.0);
        y.set_length(100.0);
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
        let area = ChartArea::new(bounds, &x, &y);
        assert_approx_eq!(f32, area.y_pixel(0.0), 50.0);

        let mut surface = Surface::new(Format::Svg);
        plot.draw_plot(&mut surface, &area).unwrap();
        let svg = surface.finish().unwrap().nodes[0].to_string();
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("height=\"50\""));
        assert!(svg.contains("down: -10"));
    }
}
