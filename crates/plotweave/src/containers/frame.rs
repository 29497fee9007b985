//! Padding wrapper with optional border and fill.

use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition},
    geometry::{Insets, Point, Size},
};

use crate::{
    element::{BuildContext, Element, Justification},
    error::{LayoutError, Result},
    surface::Surface,
};

/// Wraps a single element in padding, optionally drawing a border and a
/// background.
///
/// Size is the child size plus padding and border width on every side.
#[derive(Debug)]
pub struct Frame {
    child: Box<dyn Element>,
    padding: f32,
    stroke: Option<StrokeDefinition>,
    fill: Option<Color>,
    corner_radius: f32,
    size: Option<Size>,
}

impl Frame {
    /// Wraps `child` with 10px padding and a 1px black border
    pub fn new(child: impl Element + 'static) -> Self {
        Self {
            child: Box::new(child),
            padding: 10.0,
            stroke: Some(StrokeDefinition::default()),
            fill: None,
            corner_radius: 0.0,
            size: None,
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// `None` removes the border
    pub fn with_stroke(mut self, stroke: Option<StrokeDefinition>) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    fn inset(&self) -> f32 {
        self.padding + self.stroke.as_ref().map_or(0.0, StrokeDefinition::width)
    }
}

impl Element for Frame {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        self.child.build(ctx)?;
        self.size = Some(self.child.size().add_padding(Insets::uniform(self.inset())));
        Ok(())
    }

    fn size(&self) -> Size {
        self.size.unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let size = self.size.ok_or(LayoutError::NotBuilt { element: "Frame" })?;

        if self.stroke.is_some() || self.fill.is_some() {
            // the border is centered on the stroke, half inside the box
            let half_stroke = self.stroke.as_ref().map_or(0.0, |s| s.width() / 2.0);
            let outline = Size::new(size.width() - 2.0 * half_stroke, size.height() - 2.0 * half_stroke);
            let top_left = center.to_bounds(outline).min_point();

            let rect = svg_element::Rectangle::new()
                .set("x", top_left.x())
                .set("y", top_left.y())
                .set("width", outline.width())
                .set("height", outline.height())
                .set("rx", self.corner_radius)
                .set(
                    "fill",
                    self.fill.map_or_else(|| "none".to_string(), |c| c.to_string()),
                );
            match &self.stroke {
                Some(stroke) => surface.add(RenderLayer::Background, apply_stroke!(rect, stroke)),
                None => surface.add(RenderLayer::Background, rect),
            }
        }

        self.child.draw(surface, center)
    }

    fn justification(&self) -> Justification {
        self.child.justification()
    }
}
