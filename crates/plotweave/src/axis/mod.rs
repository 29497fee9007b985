//! Chart axes: value to pixel mapping, tick selection and drawing.
//!
//! An [`Axis`] maps a domain onto a pixel length along one orientation.
//! Continuous domains map linearly, discrete domains split the length into
//! equal bands, one per category. Building an axis picks the ticks and
//! measures their labels, which fixes the axis footprint: the extent it
//! needs perpendicular to its own direction.

mod ticks;

use indexmap::IndexSet;
use log::{debug, warn};
use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    draw::{FontAttributes, RenderLayer, StrokeDefinition, TextAnchor, TextDefinition},
    geometry::{Orientation, Point, Size},
};

use crate::{
    element::{BuildContext, Element},
    error::{LayoutError, PlotweaveError, Result},
    surface::Surface,
};

pub(crate) use ticks::format_tick;
use ticks::ticks_within;

const DEFAULT_TICK_LENGTH: f32 = 5.0;
const LABEL_GAP: f32 = 4.0;
const MIN_TICK_SPACING: f32 = 50.0;
const MAX_TICKS: usize = 10;

/// Values an axis spans.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisDomain {
    Continuous { min: f64, max: f64 },
    /// Ordered, distinct categories
    Discrete(Vec<String>),
}

/// A tick mark placed by [`Axis::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    value: Option<f64>,
    offset: f32,
    label: Option<String>,
}

impl Tick {
    /// Domain value for continuous axes
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Distance from the axis origin in pixels
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// `None` when the label was dropped to avoid overlap
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

#[derive(Debug, Clone)]
struct AxisLayout {
    ticks: Vec<Tick>,
    footprint: f32,
    text: TextDefinition,
}

/// A horizontal or vertical chart axis.
///
/// Horizontal axes grow to the right with labels below the line. Vertical
/// axes grow upwards with labels to the left of the line.
#[derive(Debug, Clone)]
pub struct Axis {
    domain: AxisDomain,
    orientation: Orientation,
    length: f32,
    label: Option<String>,
    integer_ticks: bool,
    font_height: f32,
    tick_length: f32,
    stroke: StrokeDefinition,
    layout: Option<AxisLayout>,
}

impl Axis {
    /// Creates a continuous axis over `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a bound is not finite or when
    /// `min > max`. `min == max` is accepted and yields a single tick.
    pub fn continuous(length: f32, orientation: Orientation, min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(PlotweaveError::config(format!(
                "axis bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(PlotweaveError::config(format!(
                "axis minimum {min} is greater than maximum {max}"
            )));
        }
        Ok(Self::with_domain(
            AxisDomain::Continuous { min, max },
            length,
            orientation,
        ))
    }

    /// Creates a discrete axis with one band per distinct category, in
    /// first-seen order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `categories` is empty.
    pub fn discrete<I, S>(length: f32, orientation: Orientation, categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: IndexSet<String> = categories.into_iter().map(Into::into).collect();
        if distinct.is_empty() {
            return Err(PlotweaveError::config("discrete axis needs at least one category"));
        }
        Ok(Self::with_domain(
            AxisDomain::Discrete(distinct.into_iter().collect()),
            length,
            orientation,
        ))
    }

    fn with_domain(domain: AxisDomain, length: f32, orientation: Orientation) -> Self {
        Self {
            domain,
            orientation,
            length,
            label: None,
            integer_ticks: false,
            font_height: 12.0,
            tick_length: DEFAULT_TICK_LENGTH,
            stroke: StrokeDefinition::default(),
            layout: None,
        }
    }

    /// Axis title drawn beyond the tick labels
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.layout = None;
        self
    }

    /// Restricts continuous ticks to whole numbers
    pub fn with_integer_ticks(mut self, integer_ticks: bool) -> Self {
        self.integer_ticks = integer_ticks;
        self.layout = None;
        self
    }

    pub fn with_font_height(mut self, font_height: f32) -> Self {
        self.font_height = font_height;
        self.layout = None;
        self
    }

    pub fn with_tick_length(mut self, tick_length: f32) -> Self {
        self.tick_length = tick_length;
        self.layout = None;
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn domain(&self) -> &AxisDomain {
        &self.domain
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.domain, AxisDomain::Discrete(_))
    }

    /// Lower bound of a continuous domain
    pub fn min_value(&self) -> Option<f64> {
        match self.domain {
            AxisDomain::Continuous { min, .. } => Some(min),
            AxisDomain::Discrete(_) => None,
        }
    }

    /// Upper bound of a continuous domain
    pub fn max_value(&self) -> Option<f64> {
        match self.domain {
            AxisDomain::Continuous { max, .. } => Some(max),
            AxisDomain::Discrete(_) => None,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Changes the pixel length. The axis must be built again before it is
    /// drawn.
    pub fn set_length(&mut self, length: f32) {
        self.length = length;
        self.layout = None;
    }

    pub fn is_built(&self) -> bool {
        self.layout.is_some()
    }

    /// Pixel position of a continuous `value`, measured from `origin` along
    /// the axis.
    ///
    /// On a discrete axis `value` is read as a category index and the band
    /// center is returned. A degenerate continuous domain maps every value
    /// to the middle of the axis.
    pub fn point_position(&self, origin: f32, value: f64) -> f32 {
        match &self.domain {
            AxisDomain::Continuous { min, max } => {
                let span = max - min;
                if span <= 0.0 {
                    return origin + self.length / 2.0;
                }
                origin + self.length * ((value - min) / span) as f32
            }
            AxisDomain::Discrete(categories) => {
                origin + (value as f32 + 0.5) * self.length / categories.len() as f32
            }
        }
    }

    /// Center of the band for `category`, or `None` on a continuous axis
    /// or for an unknown category.
    pub fn category_position(&self, origin: f32, category: &str) -> Option<f32> {
        let index = self.category_index(category)?;
        self.category_band(origin, index)
            .map(|(start, end)| (start + end) / 2.0)
    }

    /// Start and end of the band at `index`.
    pub fn category_band(&self, origin: f32, index: usize) -> Option<(f32, f32)> {
        let AxisDomain::Discrete(categories) = &self.domain else {
            return None;
        };
        if index >= categories.len() {
            return None;
        }
        let band = self.band_width();
        let start = origin + index as f32 * band;
        Some((start, start + band))
    }

    pub fn category_index(&self, category: &str) -> Option<usize> {
        match &self.domain {
            AxisDomain::Discrete(categories) => categories.iter().position(|c| c == category),
            AxisDomain::Continuous { .. } => None,
        }
    }

    /// Width of one category band, zero on a continuous axis
    pub fn band_width(&self) -> f32 {
        match &self.domain {
            AxisDomain::Discrete(categories) => self.length / categories.len() as f32,
            AxisDomain::Continuous { .. } => 0.0,
        }
    }

    /// Ticks chosen by the last build
    pub fn ticks(&self) -> &[Tick] {
        self.layout
            .as_ref()
            .map(|layout| layout.ticks.as_slice())
            .unwrap_or_default()
    }

    /// Tick positions measured from `origin`
    pub fn tick_positions(&self, origin: f32) -> Vec<f32> {
        self.ticks().iter().map(|tick| origin + tick.offset).collect()
    }

    /// Extent perpendicular to the axis taken by ticks, labels and title.
    /// Zero until built.
    pub fn footprint(&self) -> f32 {
        self.layout.as_ref().map_or(0.0, |layout| layout.footprint)
    }

    /// Draws the axis starting at `start`.
    ///
    /// `start` is the left end of a horizontal axis or the bottom end of a
    /// vertical one.
    pub fn draw_along(&self, surface: &mut Surface, start: Point) -> Result<()> {
        let layout = self
            .layout
            .as_ref()
            .ok_or(LayoutError::NotBuilt { element: "Axis" })?;

        let end = self.advance(start, self.length);
        let line = svg_element::Line::new()
            .set("x1", start.x())
            .set("y1", start.y())
            .set("x2", end.x())
            .set("y2", end.y());
        surface.add(RenderLayer::Axis, apply_stroke!(line, &self.stroke));

        let horizontal = self.orientation.is_horizontal();
        let label_distance = self.tick_length + LABEL_GAP;
        for tick in &layout.ticks {
            let base = self.advance(start, tick.offset);
            let (outer, label_at) = if horizontal {
                (
                    base.with_y(base.y() + self.tick_length),
                    base.with_y(base.y() + label_distance + self.font_height / 2.0),
                )
            } else {
                (
                    base.with_x(base.x() - self.tick_length),
                    base.with_x(base.x() - label_distance),
                )
            };

            let mark = svg_element::Line::new()
                .set("x1", base.x())
                .set("y1", base.y())
                .set("x2", outer.x())
                .set("y2", outer.y());
            surface.add(RenderLayer::Axis, apply_stroke!(mark, &self.stroke));

            if let Some(label) = &tick.label {
                surface.add(RenderLayer::Text, layout.text.render_line(label_at, label));
            }
        }

        if let Some(title) = &self.label {
            let title_height = layout.text.line_height();
            let title_text = layout.text.clone().with_anchor(TextAnchor::Middle);
            let middle = self.advance(start, self.length / 2.0);
            if horizontal {
                let at = middle.with_y(start.y() + layout.footprint - title_height / 2.0);
                surface.add(RenderLayer::Text, title_text.render_line(at, title));
            } else {
                let at = middle.with_x(start.x() - layout.footprint + title_height / 2.0);
                let node = title_text
                    .render_line(at, title)
                    .set("transform", format!("rotate(-90 {} {})", at.x(), at.y()));
                surface.add(RenderLayer::Text, node);
            }
        }
        Ok(())
    }

    /// Point `distance` pixels from `start` in the growth direction.
    fn advance(&self, start: Point, distance: f32) -> Point {
        if self.orientation.is_horizontal() {
            start.with_x(start.x() + distance)
        } else {
            start.with_y(start.y() - distance)
        }
    }

    /// Extent of a label along the axis
    fn along_extent(&self, ctx: &BuildContext<'_>, font: &FontAttributes, label: &str) -> Result<f32> {
        if self.orientation.is_horizontal() {
            ctx.text_width(font, label, self.font_height)
        } else {
            Ok(self.font_height)
        }
    }

    fn continuous_ticks(
        &self,
        ctx: &BuildContext<'_>,
        font: &FontAttributes,
        min: f64,
        max: f64,
    ) -> Result<Vec<Tick>> {
        if max <= min {
            warn!(value = min; "Degenerate axis domain, drawing a single tick");
            return Ok(vec![Tick {
                value: Some(min),
                offset: self.length / 2.0,
                label: Some(format!("{min}")),
            }]);
        }

        let mut target = ((self.length / MIN_TICK_SPACING).floor() as usize).clamp(2, MAX_TICKS);
        loop {
            let (values, step) = ticks_within(min, max, target, self.integer_ticks);
            let ticks: Vec<Tick> = values
                .into_iter()
                .map(|value| Tick {
                    value: Some(value),
                    offset: self.point_position(0.0, value),
                    label: Some(format_tick(value, step)),
                })
                .collect();

            if target <= 1 || !self.labels_overlap(ctx, font, &ticks)? {
                debug!(count = ticks.len(), step = step; "Axis ticks selected");
                return Ok(ticks);
            }
            target -= 1;
        }
    }

    fn discrete_ticks(
        &self,
        ctx: &BuildContext<'_>,
        font: &FontAttributes,
        categories: &[String],
    ) -> Result<Vec<Tick>> {
        let mut stride = 1;
        loop {
            let ticks: Vec<Tick> = categories
                .iter()
                .enumerate()
                .map(|(index, category)| Tick {
                    value: None,
                    offset: self.point_position(0.0, index as f64),
                    label: (index % stride == 0).then(|| category.clone()),
                })
                .collect();

            if stride >= categories.len() || !self.labels_overlap(ctx, font, &ticks)? {
                debug!(count = ticks.len(), stride = stride; "Axis categories labelled");
                return Ok(ticks);
            }
            stride += 1;
        }
    }

    fn labels_overlap(&self, ctx: &BuildContext<'_>, font: &FontAttributes, ticks: &[Tick]) -> Result<bool> {
        let mut shown = Vec::with_capacity(ticks.len());
        for tick in ticks {
            if let Some(label) = &tick.label {
                shown.push((tick.offset, self.along_extent(ctx, font, label)?));
            }
        }
        Ok(shown
            .windows(2)
            .any(|pair| (pair[1].0 - pair[0].0).abs() < (pair[0].1 + pair[1].1) / 2.0 + LABEL_GAP))
    }

    fn compute_footprint(&self, ctx: &BuildContext<'_>, font: &FontAttributes, ticks: &[Tick]) -> Result<f32> {
        let mut label_extent = 0.0f32;
        for label in ticks.iter().filter_map(|tick| tick.label.as_deref()) {
            let extent = if self.orientation.is_horizontal() {
                self.font_height
            } else {
                ctx.text_width(font, label, self.font_height)?
            };
            label_extent = label_extent.max(extent);
        }

        let mut footprint = self.tick_length;
        if label_extent > 0.0 {
            footprint += LABEL_GAP + label_extent;
        }
        if self.label.is_some() {
            footprint += LABEL_GAP + self.font_height * 1.2;
        }
        Ok(footprint)
    }
}

impl Element for Axis {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        let font = ctx.default_font().clone();
        let ticks = match &self.domain {
            AxisDomain::Continuous { min, max } => self.continuous_ticks(ctx, &font, *min, *max)?,
            AxisDomain::Discrete(categories) => self.discrete_ticks(ctx, &font, categories)?,
        };
        let footprint = self.compute_footprint(ctx, &font, &ticks)?;

        let anchor = if self.orientation.is_horizontal() {
            TextAnchor::Middle
        } else {
            TextAnchor::End
        };
        let text = TextDefinition::new(self.font_height)
            .with_font(font)
            .with_anchor(anchor);

        self.layout = Some(AxisLayout {
            ticks,
            footprint,
            text,
        });
        Ok(())
    }

    fn size(&self) -> Size {
        if self.layout.is_none() {
            return Size::default();
        }
        Size::from_axes(self.orientation, self.length, self.footprint())
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let footprint = self.footprint();
        let start = if self.orientation.is_horizontal() {
            Point::new(center.x() - self.length / 2.0, center.y() - footprint / 2.0)
        } else {
            Point::new(center.x() + footprint / 2.0, center.y() + self.length / 2.0)
        };
        self.draw_along(surface, start)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use plotweave_core::fonts::HeuristicMeasurer;
    use proptest::prelude::*;

    use super::*;
    use crate::element::Format;

    fn built(mut axis: Axis) -> Axis {
        let measurer = HeuristicMeasurer::default();
        let ctx = BuildContext::new(Format::Svg, &measurer);
        axis.build(&ctx).unwrap();
        axis
    }

    #[test]
    fn test_continuous_positions_are_linear() {
        let axis = Axis::continuous(500.0, Orientation::Horizontal, 0.0, 100.0).unwrap();
        assert_approx_eq!(f32, axis.point_position(10.0, 0.0), 10.0);
        assert_approx_eq!(f32, axis.point_position(10.0, 50.0), 260.0);
        assert_approx_eq!(f32, axis.point_position(10.0, 100.0), 510.0);
    }

    #[test]
    fn test_invalid_domains_are_config_errors() {
        let err = Axis::continuous(100.0, Orientation::Vertical, 5.0, 1.0).unwrap_err();
        assert!(err.is_config());
        let err = Axis::continuous(100.0, Orientation::Vertical, f64::NAN, 1.0).unwrap_err();
        assert!(err.is_config());
        let err = Axis::discrete(100.0, Orientation::Vertical, Vec::<String>::new()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_discrete_bands() {
        let axis = Axis::discrete(300.0, Orientation::Horizontal, ["a", "b", "a", "c"]).unwrap();
        assert_eq!(axis.domain(), &AxisDomain::Discrete(vec!["a".into(), "b".into(), "c".into()]));
        assert_approx_eq!(f32, axis.band_width(), 100.0);
        assert_approx_eq!(f32, axis.category_position(0.0, "b").unwrap(), 150.0);
        assert_eq!(axis.category_band(0.0, 2), Some((200.0, 300.0)));
        assert_eq!(axis.category_band(0.0, 3), None);
        assert_eq!(axis.category_position(0.0, "z"), None);
    }

    #[test]
    fn test_degenerate_domain_has_single_centered_tick() {
        let axis = built(Axis::continuous(200.0, Orientation::Horizontal, 3.0, 3.0).unwrap());
        assert_eq!(axis.ticks().len(), 1);
        assert_approx_eq!(f32, axis.ticks()[0].offset(), 100.0);
        assert_eq!(axis.ticks()[0].label(), Some("3"));
        assert_approx_eq!(f32, axis.point_position(0.0, 7.0), 100.0);
    }

    #[test]
    fn test_vertical_footprint_is_widest_label() {
        let axis = built(Axis::continuous(500.0, Orientation::Vertical, 0.0, 100.0).unwrap());
        assert_eq!(axis.ticks().len(), 11);
        // "100" at 12px with 0.6em glyphs
        assert_approx_eq!(f32, axis.footprint(), 5.0 + 4.0 + 21.6, epsilon = 1e-3);
        assert_approx_eq!(f32, axis.width(), axis.footprint());
        assert_approx_eq!(f32, axis.height(), 500.0);
    }

    #[test]
    fn test_crowded_labels_reduce_tick_count() {
        let axis = built(Axis::continuous(60.0, Orientation::Horizontal, 0.0, 100_000.0).unwrap());
        let labels: Vec<_> = axis.ticks().iter().filter_map(Tick::label).collect();
        assert_eq!(labels, vec!["0", "100000"]);
    }

    #[test]
    fn test_crowded_categories_skip_labels() {
        let axis = built(
            Axis::discrete(100.0, Orientation::Horizontal, ["alpha", "beta", "gamma", "delta"]).unwrap(),
        );
        assert_eq!(axis.ticks().len(), 4);
        let labels: Vec<_> = axis.ticks().iter().filter_map(Tick::label).collect();
        assert_eq!(labels, vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_integer_ticks() {
        let axis = built(
            Axis::continuous(500.0, Orientation::Horizontal, 0.0, 4.0)
                .unwrap()
                .with_integer_ticks(true),
        );
        assert!(
            axis.ticks()
                .iter()
                .all(|tick| tick.value().is_some_and(|v| v.fract() == 0.0))
        );
    }

    #[test]
    fn test_crowded_integer_ticks_thin_to_wider_steps() {
        // at 24px, five digit labels are 72px wide and collide 50px apart
        let axis = built(
            Axis::continuous(500.0, Orientation::Horizontal, 0.0, 100_000.0)
                .unwrap()
                .with_integer_ticks(true)
                .with_font_height(24.0),
        );
        let labels: Vec<_> = axis.ticks().iter().filter_map(Tick::label).collect();
        assert_eq!(labels, vec!["0", "20000", "40000", "60000", "80000", "100000"]);

        let tight = built(
            Axis::continuous(40.0, Orientation::Horizontal, 0.0, 10_000.0)
                .unwrap()
                .with_integer_ticks(true),
        );
        let values: Vec<_> = tight.ticks().iter().filter_map(Tick::value).collect();
        assert_eq!(values, vec![0.0, 10_000.0]);
    }

    #[test]
    fn test_rebuild_keeps_ticks_and_footprint() {
        let mut axis = built(
            Axis::continuous(320.0, Orientation::Vertical, -2.5, 17.0)
                .unwrap()
                .with_label("Depth"),
        );
        let ticks = axis.ticks().to_vec();
        let footprint = axis.footprint();

        let measurer = HeuristicMeasurer::default();
        let ctx = BuildContext::new(Format::Svg, &measurer);
        for _ in 0..3 {
            axis.build(&ctx).unwrap();
            assert_eq!(axis.ticks(), ticks.as_slice());
            assert_approx_eq!(f32, axis.footprint(), footprint);
        }

        axis.set_length(160.0);
        axis.build(&ctx).unwrap();
        axis.set_length(320.0);
        axis.build(&ctx).unwrap();
        assert_eq!(axis.ticks(), ticks.as_slice());
        assert_approx_eq!(f32, axis.footprint(), footprint);
    }

    #[test]
    fn test_set_length_requires_rebuild() {
        let mut axis = built(Axis::continuous(500.0, Orientation::Horizontal, 0.0, 1.0).unwrap());
        assert!(axis.is_built());
        axis.set_length(250.0);
        assert!(!axis.is_built());

        let mut surface = Surface::new(Format::Svg);
        let err = axis.draw(&mut surface, Point::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            PlotweaveError::Layout(LayoutError::NotBuilt { element: "Axis" })
        ));
    }

    #[test]
    fn test_title_extends_footprint() {
        let plain = built(Axis::continuous(300.0, Orientation::Horizontal, 0.0, 1.0).unwrap());
        let titled = built(
            Axis::continuous(300.0, Orientation::Horizontal, 0.0, 1.0)
                .unwrap()
                .with_label("Share"),
        );
        assert_approx_eq!(f32, plain.footprint(), 5.0 + 4.0 + 12.0);
        assert_approx_eq!(f32, titled.footprint(), plain.footprint() + 4.0 + 14.4, epsilon = 1e-3);
    }

    proptest! {
        #[test]
        fn test_continuous_positions_are_monotonic(
            min in -1.0e6f64..1.0e6,
            span in 1.0e-3f64..1.0e6,
            length in 10.0f32..2000.0,
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let axis = Axis::continuous(length, Orientation::Horizontal, min, min + span).unwrap();

            let first = axis.point_position(0.0, min + low * span);
            let second = axis.point_position(0.0, min + high * span);
            prop_assert!(first <= second);
            prop_assert!(axis.point_position(0.0, min).abs() < 1e-3);
            prop_assert!((axis.point_position(0.0, min + span) - length).abs() < 1e-2 * length.max(1.0));
        }
    }
}
