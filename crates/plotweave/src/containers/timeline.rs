//! Children placed along a time axis.

use chrono::NaiveDateTime;
use log::debug;
use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    draw::{RenderLayer, StrokeDefinition, TextAnchor, TextDefinition},
    geometry::{Orientation, Point, Size},
};

use crate::{
    element::{BuildContext, Element},
    error::{LayoutError, Result},
    marker::MarkerManager,
    palette::{DiscretePalette, SharedPalette, shared},
    surface::Surface,
};

/// One event of a [`TimeLine`].
///
/// Dated entries are placed proportionally along the axis and get a
/// marker. Undated entries follow the entry inserted before them.
#[derive(Debug)]
pub struct TimeLineEntry {
    instant: Option<NaiveDateTime>,
    element: Option<Box<dyn Element>>,
    label: Option<String>,
    category: Option<String>,
    offset: f32,
}

impl TimeLineEntry {
    /// An entry at `instant`
    pub fn at(instant: NaiveDateTime) -> Self {
        Self {
            instant: Some(instant),
            ..Self::undated()
        }
    }

    /// An entry without an instant
    pub fn undated() -> Self {
        Self {
            instant: None,
            element: None,
            label: None,
            category: None,
            offset: 10.0,
        }
    }

    pub fn with_element(mut self, element: impl Element + 'static) -> Self {
        self.element = Some(Box::new(element));
        self
    }

    /// Text drawn on the label side. Dated entries without one show their
    /// formatted instant.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Category used to colour the marker
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Distance between the axis and the element
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset.max(0.0);
        self
    }

    pub fn instant(&self) -> Option<NaiveDateTime> {
        self.instant
    }
}

#[derive(Debug)]
struct ResolvedLabel {
    definition: TextDefinition,
    text: String,
    size: Size,
}

#[derive(Debug)]
struct TimeLineLayout {
    /// Along-axis center of every entry, by insertion index
    positions: Vec<f32>,
    labels: Vec<Option<ResolvedLabel>>,
    axis_start: f32,
    /// Cross extent on the label side, axis included up to its center
    label_side: f32,
    size: Size,
}

/// Positions entries along a time axis.
///
/// The axis spans the earliest to the latest dated entry over `length`
/// pixels. An entry whose proportional position would overlap the entry
/// before it is pushed further along, so the axis is proportional only
/// where there is room. Labels go on one side of the axis and elements on
/// the other, `offset` pixels away.
///
/// Marker colours come from a [`DiscretePalette`], which can be shared
/// with other timelines or charts to keep category colours consistent.
#[derive(Debug)]
pub struct TimeLine {
    entries: Vec<TimeLineEntry>,
    orientation: Orientation,
    length: f32,
    spacing: f32,
    font_height: f32,
    date_format: String,
    stroke: StrokeDefinition,
    markers: MarkerManager,
    palette: SharedPalette<DiscretePalette>,
    layout: Option<TimeLineLayout>,
}

impl TimeLine {
    const LABEL_GAP: f32 = 4.0;

    /// An empty horizontal timeline 600px long
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            orientation: Orientation::Horizontal,
            length: 600.0,
            spacing: 10.0,
            font_height: 12.0,
            date_format: "%Y-%m-%d".to_string(),
            stroke: StrokeDefinition::default(),
            markers: MarkerManager::new().with_default_radius(5.0),
            palette: shared(DiscretePalette::new()),
            layout: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length.max(0.0);
        self
    }

    /// Minimum gap between neighbouring entries
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_font_height(mut self, font_height: f32) -> Self {
        self.font_height = font_height;
        self
    }

    /// `strftime` format for labels derived from instants
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_marker_radius(mut self, radius: f32) -> Self {
        self.markers = self.markers.with_default_radius(radius);
        self
    }

    pub fn with_palette(mut self, palette: SharedPalette<DiscretePalette>) -> Self {
        self.palette = palette;
        self
    }

    pub fn palette(&self) -> &SharedPalette<DiscretePalette> {
        &self.palette
    }

    pub fn add(&mut self, entry: TimeLineEntry) -> &mut Self {
        self.entries.push(entry);
        self.layout = None;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Along-axis centers of the entries, in insertion order, measured
    /// from the leading edge of the timeline
    pub fn positions(&self) -> Option<&[f32]> {
        self.layout.as_ref().map(|layout| layout.positions.as_slice())
    }

    /// Entry indices in drawing order: by instant, with undated entries
    /// kept right after the entry inserted before them.
    fn drawing_order(&self) -> Vec<usize> {
        let mut last = None;
        let mut keyed: Vec<(Option<NaiveDateTime>, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.instant.is_some() {
                    last = entry.instant;
                }
                (last, index)
            })
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        keyed.into_iter().map(|(_, index)| index).collect()
    }

    fn proportional(&self, instant: NaiveDateTime, first: NaiveDateTime, last: NaiveDateTime) -> f32 {
        let span = (last - first).num_milliseconds();
        if span <= 0 {
            return self.length / 2.0;
        }
        let elapsed = (instant - first).num_milliseconds();
        (elapsed as f64 / span as f64) as f32 * self.length
    }

    fn resolve_label(&self, entry: &TimeLineEntry, ctx: &BuildContext<'_>) -> Result<Option<ResolvedLabel>> {
        let text = match (&entry.label, entry.instant) {
            (Some(label), _) => label.clone(),
            (None, Some(instant)) => instant.format(&self.date_format).to_string(),
            (None, None) => return Ok(None),
        };
        let anchor = match self.orientation {
            Orientation::Horizontal => TextAnchor::Middle,
            Orientation::Vertical => TextAnchor::End,
        };
        let definition = TextDefinition::new(self.font_height)
            .with_font(ctx.default_font().clone())
            .with_anchor(anchor);
        let width = ctx.text_width(definition.font(), &text, self.font_height)?;
        let height = definition.line_height() * text.split('\n').count() as f32;
        Ok(Some(ResolvedLabel {
            definition,
            text,
            size: Size::new(width, height),
        }))
    }
}

impl Default for TimeLine {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for TimeLine {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        let orientation = self.orientation;
        let radius = self.markers.default_radius();

        let labels = self
            .entries
            .iter()
            .map(|entry| self.resolve_label(entry, ctx))
            .collect::<Result<Vec<_>>>()?;
        for element in self.entries.iter_mut().filter_map(|entry| entry.element.as_mut()) {
            element.build(ctx)?;
        }
        // children may share the palette, so allocate after they are built
        {
            let mut palette = self.palette.borrow_mut();
            for category in self.entries.iter().filter_map(|entry| entry.category.as_deref()) {
                palette.allocate(category);
            }
        }

        let dated = self.entries.iter().filter_map(|entry| entry.instant);
        let first = dated.clone().min();
        let last = dated.max();

        // along extents and the proportional sweep
        let mut positions = vec![0.0f32; self.entries.len()];
        let mut cursor = f32::NEG_INFINITY;
        let mut leading = 0.0f32;
        let mut trailing = self.length;
        for index in self.drawing_order() {
            let entry = &self.entries[index];
            let element_extent = entry.element.as_ref().map_or(0.0, |e| e.size().along(orientation));
            let label_extent = labels[index]
                .as_ref()
                .map_or(0.0, |label| label.size.along(orientation));
            let marker_extent = if entry.instant.is_some() { 2.0 * radius } else { 0.0 };
            let half = element_extent.max(label_extent).max(marker_extent) / 2.0;

            let earliest = if cursor.is_finite() { cursor + half } else { f32::NEG_INFINITY };
            let position = match (entry.instant, first, last) {
                (Some(instant), Some(first), Some(last)) => {
                    self.proportional(instant, first, last).max(earliest)
                }
                _ if cursor.is_finite() => earliest,
                _ => half,
            };
            positions[index] = position;
            leading = leading.max(half - position);
            trailing = trailing.max(position + half);
            cursor = position + half + self.spacing;
        }
        for position in &mut positions {
            *position += leading;
        }

        // cross extents: labels before the axis, elements after it
        let label_band = labels
            .iter()
            .flatten()
            .map(|label| label.size.across(orientation))
            .fold(0.0f32, f32::max);
        let label_side = if label_band > 0.0 {
            radius + Self::LABEL_GAP + label_band
        } else {
            radius
        };
        let element_side = self
            .entries
            .iter()
            .filter_map(|entry| {
                let element = entry.element.as_ref()?;
                Some(entry.offset + element.size().across(orientation))
            })
            .fold(radius, f32::max);

        let size = Size::from_axes(orientation, leading + trailing, label_side + element_side);
        debug!(
            entries = self.entries.len(),
            width = size.width(),
            height = size.height();
            "TimeLine built"
        );
        self.layout = Some(TimeLineLayout {
            positions,
            labels,
            axis_start: leading,
            label_side,
            size,
        });
        Ok(())
    }

    fn size(&self) -> Size {
        self.layout.as_ref().map(|layout| layout.size).unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let layout = self
            .layout
            .as_ref()
            .ok_or(LayoutError::NotBuilt { element: "TimeLine" })?;
        let orientation = self.orientation;
        let top_left = center.to_bounds(layout.size).min_point();
        let start = orientation.along(top_left);
        let axis = orientation.flip().along(top_left) + layout.label_side;
        let radius = self.markers.default_radius();

        let from = orientation.point(start + layout.axis_start, axis);
        let to = orientation.point(start + layout.axis_start + self.length, axis);
        let line = svg_element::Line::new()
            .set("x1", from.x())
            .set("y1", from.y())
            .set("x2", to.x())
            .set("y2", to.y());
        surface.add(RenderLayer::Axis, apply_stroke!(line, &self.stroke));

        let palette = self.palette.borrow();
        for (index, entry) in self.entries.iter().enumerate() {
            let along = start + layout.positions[index];
            let label = layout.labels[index].as_ref();

            if let Some(label) = label {
                let gap = radius + Self::LABEL_GAP;
                let position = match orientation {
                    Orientation::Horizontal => Point::new(along, axis - gap - label.size.height() / 2.0),
                    Orientation::Vertical => Point::new(axis - gap, along),
                };
                let lines: Vec<&str> = label.text.split('\n').collect();
                surface.add(RenderLayer::Text, label.definition.render_lines(position, &lines));
            }

            if let Some(element) = &entry.element {
                let across = axis + entry.offset + element.size().across(orientation) / 2.0;
                if entry.instant.is_some() && entry.offset > radius {
                    let a = orientation.point(along, axis + radius);
                    let b = orientation.point(along, axis + entry.offset);
                    let connector = svg_element::Line::new()
                        .set("x1", a.x())
                        .set("y1", a.y())
                        .set("x2", b.x())
                        .set("y2", b.y());
                    surface.add(RenderLayer::Content, apply_stroke!(connector, &self.stroke));
                }
                element.draw(surface, orientation.point(along, across))?;
            }

            if entry.instant.is_some() {
                let fill = entry
                    .category
                    .as_deref()
                    .map_or_else(|| palette.default_color(), |category| palette.color(category));
                self.markers.marker(None).draw(
                    surface,
                    orientation.point(along, axis),
                    fill,
                    label.map(|label| label.text.as_str()),
                );
            }
        }
        Ok(())
    }
}
