//! Overlay window toggled by event channels.

use serde_json::json;
use svg::node::element as svg_element;

use plotweave_core::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition, TextAnchor, TextDefinition},
    geometry::{Point, Size},
};

use crate::{
    element::{BuildContext, Element, Format},
    elements::Button,
    error::{LayoutError, Result},
    surface::{Connection, ElementId, Surface},
};

/// A titled window around one element, with a close button.
///
/// Popups only exist in the interactive format: for [`Format::Svg`] the
/// popup takes no space and draws nothing. The window starts hidden
/// unless [`opened`](Self::opened) is set; connect a button's `click`
/// channel to the popup's `click` channel to show it.
#[derive(Debug)]
pub struct Popup {
    child: Box<dyn Element>,
    title: String,
    id: Option<ElementId>,
    opened: bool,
    font_height: f32,
    stroke: StrokeDefinition,
    fill: Color,
    opacity: f32,
    corner_radius: f32,
    close_button: Button,
    layout: Option<PopupLayout>,
}

#[derive(Debug, Clone, Copy)]
struct PopupLayout {
    size: Size,
    interactive: bool,
}

impl Popup {
    pub fn new(child: impl Element + 'static, title: impl Into<String>) -> Self {
        Self {
            child: Box::new(child),
            title: title.into(),
            id: None,
            opened: false,
            font_height: 18.0,
            stroke: StrokeDefinition::solid(Color::new("grey").unwrap_or_default(), 2.0),
            fill: Color::new("white").unwrap_or_default(),
            opacity: 1.0,
            corner_radius: 4.0,
            close_button: Button::text("×")
                .with_padding(2.0)
                .with_click_value(json!(false)),
            layout: None,
        }
    }

    /// Fixes the element id so the popup can be wired with
    /// [`Diagram::connect`](crate::Diagram::connect)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(ElementId::new(id));
        self
    }

    /// Shows the popup when the page loads
    pub fn opened(mut self) -> Self {
        self.opened = true;
        self
    }

    pub fn with_font_height(mut self, font_height: f32) -> Self {
        self.font_height = font_height;
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn id(&self) -> Option<&ElementId> {
        self.id.as_ref()
    }

    fn titlebar_height(&self) -> f32 {
        2.0 * self.font_height
    }
}

impl Element for Popup {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        if ctx.format() != Format::Html {
            self.layout = Some(PopupLayout {
                size: Size::default(),
                interactive: false,
            });
            return Ok(());
        }

        self.child.build(ctx)?;
        self.close_button.build(ctx)?;

        let title_width = ctx.text_width(ctx.default_font(), &self.title, self.font_height)?;
        let titlebar_width = self.font_height + title_width + self.close_button.width();
        let border = 2.0 * self.stroke.width();
        let size = Size::new(
            self.child.width().max(titlebar_width) + border,
            self.titlebar_height() + self.child.height() + border,
        );
        self.layout = Some(PopupLayout {
            size,
            interactive: true,
        });
        Ok(())
    }

    fn size(&self) -> Size {
        self.layout.map(|layout| layout.size).unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let layout = self.layout.ok_or(LayoutError::NotBuilt { element: "Popup" })?;
        if !layout.interactive {
            return Ok(());
        }

        let size = layout.size;
        let stroke_width = self.stroke.width();
        let titlebar = self.titlebar_height();
        let top_left = center.to_bounds(size).min_point();

        let id = match &self.id {
            Some(id) => id.clone(),
            None => surface.allocate_id("popup"),
        };
        surface.open_group_as(RenderLayer::Overlay, id.clone());
        surface.set_group_attribute("opacity", self.opacity)?;
        if !self.opened {
            surface.set_group_attribute("visibility", "hidden")?;
        }

        let half_stroke = stroke_width / 2.0;
        let window = svg_element::Rectangle::new()
            .set("x", top_left.x() + half_stroke)
            .set("y", top_left.y() + half_stroke)
            .set("width", size.width() - stroke_width)
            .set("height", size.height() - stroke_width)
            .set("rx", self.corner_radius)
            .set("ry", self.corner_radius)
            .set("fill", self.fill.to_string());
        surface.add(RenderLayer::Background, apply_stroke!(window, &self.stroke));

        let rule_y = top_left.y() + stroke_width + titlebar;
        let rule = svg_element::Line::new()
            .set("x1", top_left.x())
            .set("y1", rule_y)
            .set("x2", top_left.x() + size.width())
            .set("y2", rule_y);
        surface.add(RenderLayer::Background, apply_stroke!(rule, &self.stroke));

        let title_y = top_left.y() + stroke_width + titlebar / 2.0;
        let title = TextDefinition::new(self.font_height)
            .with_anchor(TextAnchor::Start)
            .render_line(
                Point::new(top_left.x() + stroke_width + self.font_height / 2.0, title_y),
                &self.title,
            );
        surface.add(RenderLayer::Text, title);

        let button_id = surface.allocate_id("button");
        let button_center = Point::new(
            top_left.x() + size.width() - stroke_width - self.close_button.width() / 2.0 - 4.0,
            title_y,
        );
        self.close_button
            .draw_as(surface, button_center, button_id.clone())?;

        let child_center = Point::new(
            top_left.x() + stroke_width + self.child.width() / 2.0,
            rule_y + self.child.height() / 2.0,
        );
        self.child.draw(surface, child_center)?;
        surface.close_group()?;

        surface.register(&id, "popup", json!({ "pgid": id }));
        surface.connect(Connection::new(button_id, "click", id, "click"));
        Ok(())
    }
}
