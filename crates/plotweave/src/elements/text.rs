use log::trace;
use svg::node::element as svg_element;

use plotweave_core::{
    color::Color,
    draw::{FontAttributes, RenderLayer, TextDefinition},
    geometry::{Point, Size},
};

use crate::{
    element::{BuildContext, Element, Justification},
    error::{LayoutError, Result},
    surface::Surface,
};

/// One or more lines of text, optionally linked to a URL.
///
/// Lines are separated by `\n`. The width is the widest rendered line as
/// reported by the build context's text measurer.
#[derive(Debug, Clone)]
pub struct Text {
    content: String,
    font_height: f32,
    font: Option<FontAttributes>,
    color: Option<Color>,
    url: Option<String>,
    justification: Justification,
    resolved: Option<(TextDefinition, Size)>,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_height: 18.0,
            font: None,
            color: None,
            url: None,
            justification: Justification::default(),
            resolved: None,
        }
    }

    pub fn with_font_height(mut self, font_height: f32) -> Self {
        self.font_height = font_height;
        self
    }

    /// Overrides the diagram's default font
    pub fn with_font(mut self, font: FontAttributes) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn lines(&self) -> Vec<&str> {
        self.content.split('\n').collect()
    }
}

impl Element for Text {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        let font = self
            .font
            .clone()
            .unwrap_or_else(|| ctx.default_font().clone());
        let mut definition = TextDefinition::new(self.font_height).with_font(font);
        if let Some(color) = self.color {
            definition = definition.with_color(color);
        }

        let width = ctx.text_width(definition.font(), &self.content, self.font_height)?;
        let height = definition.line_height() * self.lines().len() as f32;
        trace!(content = self.content, width, height; "Text built");

        self.resolved = Some((definition, Size::new(width, height)));
        Ok(())
    }

    fn size(&self) -> Size {
        self.resolved.as_ref().map(|(_, size)| *size).unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let (definition, _) = self
            .resolved
            .as_ref()
            .ok_or(LayoutError::NotBuilt { element: "Text" })?;

        let node = definition.render_lines(center, &self.lines());
        match &self.url {
            Some(url) => {
                let link = svg_element::Anchor::new()
                    .set("href", url.as_str())
                    .set("target", "_new")
                    .add(node);
                surface.add(RenderLayer::Text, link);
            }
            None => surface.add(RenderLayer::Text, node),
        }
        Ok(())
    }

    fn justification(&self) -> Justification {
        self.justification
    }
}
