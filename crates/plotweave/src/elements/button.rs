use serde_json::json;
use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition},
    geometry::{Point, Size},
};

use crate::{
    element::{BuildContext, Element, Justification},
    elements::{Image, Text},
    error::{LayoutError, Result},
    surface::{ElementId, Surface},
};

/// A clickable label emitting events on its `click` channel.
///
/// In the interactive format the button registers itself so the client
/// script can swap between `fill` and `push_fill` and publish
/// `click_value` to every connected channel.
#[derive(Debug)]
pub struct Button {
    label: Box<dyn Element>,
    id: Option<ElementId>,
    padding: f32,
    corner_radius: f32,
    fill: Color,
    push_fill: Color,
    stroke: StrokeDefinition,
    click_value: serde_json::Value,
    size: Option<Size>,
}

impl Button {
    /// A button showing `text`
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_label(Box::new(Text::new(text).with_font_height(14.0)))
    }

    /// A button showing an image
    pub fn image(image: Image) -> Self {
        Self::with_label(Box::new(image))
    }

    fn with_label(label: Box<dyn Element>) -> Self {
        Self {
            label,
            id: None,
            padding: 5.0,
            corner_radius: 3.0,
            fill: Color::new("white").unwrap_or_default(),
            push_fill: Color::new("lightgrey").unwrap_or_default(),
            stroke: StrokeDefinition::solid(Color::default(), 1.0),
            click_value: serde_json::Value::Bool(true),
            size: None,
        }
    }

    /// Fixes the element id so the button can be wired with
    /// [`Diagram::connect`](crate::Diagram::connect)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(ElementId::new(id));
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_fill(mut self, fill: Color, push_fill: Color) -> Self {
        self.fill = fill;
        self.push_fill = push_fill;
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }

    /// Value published on the `click` channel
    pub fn with_click_value(mut self, value: serde_json::Value) -> Self {
        self.click_value = value;
        self
    }

    pub fn id(&self) -> Option<&ElementId> {
        self.id.as_ref()
    }

    /// Draws the button using `id` instead of its configured one.
    pub(crate) fn draw_as(&self, surface: &mut Surface, center: Point, id: ElementId) -> Result<()> {
        let size = self.size.ok_or(LayoutError::NotBuilt { element: "Button" })?;
        let top_left = center.to_bounds(size).min_point();

        surface.open_group_as(RenderLayer::Overlay, id.clone());
        surface.set_group_attribute("cursor", "pointer")?;

        let frame = svg_element::Rectangle::new()
            .set("x", top_left.x())
            .set("y", top_left.y())
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", self.corner_radius)
            .set("ry", self.corner_radius)
            .set("fill", self.fill.to_string());
        surface.add(RenderLayer::Background, apply_stroke!(frame, &self.stroke));
        self.label.draw(surface, center)?;
        surface.close_group()?;

        surface.register(
            &id,
            "button",
            json!({
                "click_value": self.click_value,
                "fill": self.fill.to_string(),
                "push_fill": self.push_fill.to_string(),
            }),
        );
        Ok(())
    }
}

impl Element for Button {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        self.label.build(ctx)?;
        let inset = 2.0 * (self.padding + self.stroke.width());
        self.size = Some(Size::new(
            self.label.width() + inset,
            self.label.height() + inset,
        ));
        Ok(())
    }

    fn size(&self) -> Size {
        self.size.unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let id = match &self.id {
            Some(id) => id.clone(),
            None => surface.allocate_id("button"),
        };
        self.draw_as(surface, center, id)
    }

    fn justification(&self) -> Justification {
        self.label.justification()
    }
}
