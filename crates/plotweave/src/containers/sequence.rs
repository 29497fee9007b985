//! Linear stacking container.

use log::debug;
use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    draw::{RenderLayer, StrokeDefinition},
    geometry::{Orientation, Point, Size},
};

use crate::{
    element::{BuildContext, Element},
    error::{LayoutError, Result},
    surface::Surface,
};

/// A rule drawn between two children of a sequence.
///
/// It contributes its stroke width along the main axis and nothing across
/// it; the line spans `fraction` of the sequence's cross extent.
#[derive(Debug, Clone)]
pub struct Separator {
    stroke: StrokeDefinition,
    fraction: f32,
}

impl Separator {
    pub fn new(stroke: StrokeDefinition, fraction: f32) -> Self {
        Self {
            stroke,
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    fn size(&self, orientation: Orientation) -> Size {
        Size::from_axes(orientation, self.stroke.width(), 0.0)
    }

    fn draw(&self, surface: &mut Surface, center: Point, orientation: Orientation, cross: f32) {
        let half = self.fraction * cross / 2.0;
        let across = orientation.flip();
        let start = center.add_point(across.point(-half, 0.0));
        let end = center.add_point(across.point(half, 0.0));

        let line = svg_element::Line::new()
            .set("x1", start.x())
            .set("y1", start.y())
            .set("x2", end.x())
            .set("y2", end.y());
        surface.add(RenderLayer::Content, apply_stroke!(line, &self.stroke));
    }
}

#[derive(Debug)]
enum Slot {
    Element(Box<dyn Element>),
    Separator(Separator),
}

impl Slot {
    fn size(&self, orientation: Orientation) -> Size {
        match self {
            Self::Element(element) => element.size(),
            Self::Separator(separator) => separator.size(orientation),
        }
    }
}

/// Stacks children along one axis with fixed spacing.
///
/// For a vertical sequence the width is the widest child and the height
/// is the sum of child heights plus `spacing` between each pair; a
/// horizontal sequence swaps the roles. Children are centered across the
/// main axis unless they request left/right (vertical) or top/bottom
/// (horizontal) justification.
///
/// # Examples
///
/// ```
/// # use plotweave::{BuildContext, Element, Format};
/// # use plotweave::containers::Sequence;
/// # use plotweave::elements::Space;
/// # use plotweave::fonts::HeuristicMeasurer;
/// let mut sequence = Sequence::new().with_spacing(5.0);
/// sequence.add(Space::new(10.0, 10.0));
/// sequence.add(Space::new(30.0, 20.0));
///
/// let measurer = HeuristicMeasurer::default();
/// sequence.build(&BuildContext::new(Format::Svg, &measurer)).unwrap();
/// assert_eq!(sequence.height(), 35.0);
/// assert_eq!(sequence.width(), 30.0);
/// ```
#[derive(Debug)]
pub struct Sequence {
    slots: Vec<Slot>,
    spacing: f32,
    orientation: Orientation,
    size: Option<Size>,
}

impl Sequence {
    /// An empty vertical sequence with 20px spacing
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            spacing: 20.0,
            orientation: Orientation::Vertical,
            size: None,
        }
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Appends an element after the existing children.
    pub fn add(&mut self, element: impl Element + 'static) -> &mut Self {
        self.push_boxed(Box::new(element))
    }

    /// Appends an already boxed element.
    pub fn push_boxed(&mut self, element: Box<dyn Element>) -> &mut Self {
        self.slots.push(Slot::Element(element));
        self.size = None;
        self
    }

    /// Appends a separator line.
    pub fn add_separator(&mut self, stroke: StrokeDefinition, fraction: f32) -> &mut Self {
        self.slots.push(Slot::Separator(Separator::new(stroke, fraction)));
        self.size = None;
        self
    }

    /// Removes the child at `index`, returning it if it was an element.
    ///
    /// Returns `None` for out-of-range indices and for separators.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Element>> {
        if index >= self.slots.len() {
            return None;
        }
        self.size = None;
        match self.slots.remove(index) {
            Slot::Element(element) => Some(element),
            Slot::Separator(_) => None,
        }
    }

    /// Removes the last child.
    pub fn pop(&mut self) -> Option<Box<dyn Element>> {
        let last = self.slots.len().checked_sub(1)?;
        self.remove(last)
    }

    /// Number of children, separators included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn cross_position(&self, slot: &Slot, center: Point, size: Size, child: Size) -> f32 {
        let Slot::Element(element) = slot else {
            return self.orientation.flip().along(center);
        };
        let justification = element.justification();
        match self.orientation {
            Orientation::Vertical if justification.is_left() => {
                center.x() - size.width() / 2.0 + child.width() / 2.0
            }
            Orientation::Vertical if justification.is_right() => {
                center.x() + size.width() / 2.0 - child.width() / 2.0
            }
            Orientation::Horizontal if justification.is_top() => {
                center.y() - size.height() / 2.0 + child.height() / 2.0
            }
            Orientation::Horizontal if justification.is_bottom() => {
                center.y() + size.height() / 2.0 - child.height() / 2.0
            }
            Orientation::Vertical => center.x(),
            Orientation::Horizontal => center.y(),
        }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Sequence {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        for slot in &mut self.slots {
            if let Slot::Element(element) = slot {
                element.build(ctx)?;
            }
        }

        let orientation = self.orientation;
        let gaps = self.slots.len().saturating_sub(1) as f32;
        let (along, across) = self.slots.iter().fold((0.0f32, 0.0f32), |(along, across), slot| {
            let size = slot.size(orientation);
            (
                along + size.along(orientation),
                across.max(size.across(orientation)),
            )
        });

        let size = Size::from_axes(orientation, along + self.spacing * gaps, across);
        debug!(
            children = self.slots.len(),
            width = size.width(),
            height = size.height();
            "Sequence built"
        );
        self.size = Some(size);
        Ok(())
    }

    fn size(&self) -> Size {
        self.size.unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let size = self.size.ok_or(LayoutError::NotBuilt { element: "Sequence" })?;
        let orientation = self.orientation;
        let mut offset = orientation.along(center) - size.along(orientation) / 2.0;

        for slot in &self.slots {
            let child = slot.size(orientation);
            let along = offset + child.along(orientation) / 2.0;
            let across = self.cross_position(slot, center, size, child);
            let child_center = orientation.point(along, across);

            match slot {
                Slot::Element(element) => element.draw(surface, child_center)?,
                Slot::Separator(separator) => {
                    separator.draw(surface, child_center, orientation, size.across(orientation))
                }
            }
            offset += child.along(orientation) + self.spacing;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use float_cmp::assert_approx_eq;
    use plotweave_core::fonts::HeuristicMeasurer;
    use proptest::prelude::*;

    use super::*;
    use crate::{
        element::{Format, Justification},
        elements::Space,
    };

    /// Records the center it was drawn at.
    #[derive(Debug)]
    struct Recorder {
        size: Size,
        justification: Justification,
        drawn_at: Rc<RefCell<Option<Point>>>,
    }

    impl Recorder {
        fn new(width: f32, height: f32) -> (Self, Rc<RefCell<Option<Point>>>) {
            let drawn_at = Rc::new(RefCell::new(None));
            let recorder = Self {
                size: Size::new(width, height),
                justification: Justification::default(),
                drawn_at: Rc::clone(&drawn_at),
            };
            (recorder, drawn_at)
        }
    }

    impl Element for Recorder {
        fn build(&mut self, _ctx: &BuildContext<'_>) -> Result<()> {
            Ok(())
        }

        fn size(&self) -> Size {
            self.size
        }

        fn draw(&self, _surface: &mut Surface, center: Point) -> Result<()> {
            *self.drawn_at.borrow_mut() = Some(center);
            Ok(())
        }

        fn justification(&self) -> Justification {
            self.justification
        }
    }

    fn build(sequence: &mut Sequence) {
        let measurer = HeuristicMeasurer::default();
        sequence
            .build(&BuildContext::new(Format::Svg, &measurer))
            .unwrap();
    }

    #[test]
    fn test_vertical_size() {
        let mut sequence = Sequence::new().with_spacing(5.0);
        sequence.add(Space::new(40.0, 10.0));
        sequence.add(Space::new(15.0, 20.0));
        sequence.add(Space::new(25.0, 30.0));
        build(&mut sequence);

        assert_approx_eq!(f32, sequence.height(), 70.0);
        assert_approx_eq!(f32, sequence.width(), 40.0);
    }

    #[test]
    fn test_horizontal_size() {
        let mut sequence = Sequence::new()
            .with_spacing(5.0)
            .with_orientation(Orientation::Horizontal);
        sequence.add(Space::new(10.0, 40.0));
        sequence.add(Space::new(20.0, 15.0));
        build(&mut sequence);

        assert_approx_eq!(f32, sequence.width(), 35.0);
        assert_approx_eq!(f32, sequence.height(), 40.0);
    }

    #[test]
    fn test_empty_sequence_has_zero_size() {
        let mut sequence = Sequence::new();
        build(&mut sequence);
        assert!(sequence.size().is_zero());
    }

    #[test]
    fn test_remove_shrinks_by_height_plus_spacing() {
        let mut sequence = Sequence::new().with_spacing(5.0);
        sequence.add(Space::new(10.0, 10.0));
        sequence.add(Space::new(10.0, 20.0));
        sequence.add(Space::new(10.0, 30.0));
        build(&mut sequence);
        let before = sequence.height();

        let removed = sequence.remove(1).unwrap();
        build(&mut sequence);
        assert_approx_eq!(f32, before - sequence.height(), removed.height() + 5.0);
    }

    #[test]
    fn test_remove_last_element_leaves_empty() {
        let mut sequence = Sequence::new().with_spacing(5.0);
        sequence.add(Space::new(10.0, 10.0));
        build(&mut sequence);

        assert!(sequence.pop().is_some());
        assert!(sequence.pop().is_none());
        build(&mut sequence);
        assert_approx_eq!(f32, sequence.height(), 0.0);
    }

    #[test]
    fn test_draw_centers_from_top_edge() {
        let mut sequence = Sequence::new().with_spacing(10.0);
        let (first, first_at) = Recorder::new(0.0, 20.0);
        let (second, second_at) = Recorder::new(0.0, 30.0);
        sequence.add(first);
        sequence.add(second);
        build(&mut sequence);

        assert_approx_eq!(f32, sequence.height(), 60.0);
        assert_approx_eq!(f32, sequence.width(), 0.0);

        let mut surface = Surface::new(Format::Svg);
        sequence.draw(&mut surface, Point::new(0.0, 30.0)).unwrap();

        assert_approx_eq!(f32, first_at.borrow().unwrap().y(), 10.0);
        assert_approx_eq!(f32, second_at.borrow().unwrap().y(), 45.0);
    }

    #[test]
    fn test_justified_children_pin_to_edges() {
        let mut sequence = Sequence::new();
        let (wide, _) = Recorder::new(100.0, 10.0);
        let (mut left, left_at) = Recorder::new(20.0, 10.0);
        left.justification = Justification::left();
        let (mut right, right_at) = Recorder::new(20.0, 10.0);
        right.justification = Justification::right();
        sequence.add(wide);
        sequence.add(left);
        sequence.add(right);
        build(&mut sequence);

        let mut surface = Surface::new(Format::Svg);
        sequence.draw(&mut surface, Point::new(50.0, 0.0)).unwrap();
        assert_approx_eq!(f32, left_at.borrow().unwrap().x(), 10.0);
        assert_approx_eq!(f32, right_at.borrow().unwrap().x(), 90.0);
    }

    #[test]
    fn test_horizontal_bottom_justification() {
        let mut sequence = Sequence::new().with_orientation(Orientation::Horizontal);
        let (tall, _) = Recorder::new(10.0, 100.0);
        let (mut low, low_at) = Recorder::new(10.0, 20.0);
        low.justification = Justification::bottom();
        sequence.add(tall);
        sequence.add(low);
        build(&mut sequence);

        let mut surface = Surface::new(Format::Svg);
        sequence.draw(&mut surface, Point::new(0.0, 50.0)).unwrap();
        assert_approx_eq!(f32, low_at.borrow().unwrap().y(), 90.0);
    }

    #[test]
    fn test_separator_counts_as_child() {
        let mut sequence = Sequence::new().with_spacing(5.0);
        sequence.add(Space::new(10.0, 10.0));
        sequence.add_separator(StrokeDefinition::default(), 1.0);
        sequence.add(Space::new(10.0, 10.0));
        build(&mut sequence);

        // 10 + 1 + 10 plus two gaps
        assert_approx_eq!(f32, sequence.height(), 31.0);

        let mut surface = Surface::new(Format::Svg);
        sequence.draw(&mut surface, Point::new(5.0, 15.5)).unwrap();
        assert_eq!(surface.finish().unwrap().nodes.len(), 1);
    }

    #[test]
    fn test_draw_before_build_fails() {
        let sequence = Sequence::new();
        let mut surface = Surface::new(Format::Svg);
        assert!(sequence.draw(&mut surface, Point::default()).is_err());
    }

    proptest! {
        #[test]
        fn test_vertical_height_is_sum_plus_spacing(
            heights in prop::collection::vec(0.0f32..200.0, 1..12),
            spacing in 0.0f32..30.0,
        ) {
            let mut sequence = Sequence::new().with_spacing(spacing);
            for height in &heights {
                sequence.add(Space::new(1.0, *height));
            }
            build(&mut sequence);

            let expected = heights.iter().sum::<f32>() + spacing * (heights.len() - 1) as f32;
            prop_assert!((sequence.height() - expected).abs() < 1e-2);
        }
    }
}
