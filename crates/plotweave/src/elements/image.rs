use base64::{Engine as _, engine::general_purpose::STANDARD};
use svg::node::element as svg_element;

use plotweave_core::{
    draw::RenderLayer,
    geometry::{Point, Size},
};

use crate::{
    element::{BuildContext, Element, Justification},
    error::Result,
    surface::Surface,
};

/// Where the pixels of an [`Image`] come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Raw bytes embedded as a base64 data URI
    Embedded { mime_type: String, bytes: Vec<u8> },
    /// External reference
    Url(String),
}

impl ImageSource {
    /// Value for the `href` attribute
    pub fn href(&self) -> String {
        match self {
            Self::Embedded { mime_type, bytes } => {
                format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
            }
            Self::Url(url) => url.clone(),
        }
    }
}

/// A raster or vector image drawn at a fixed size.
#[derive(Debug, Clone)]
pub struct Image {
    source: ImageSource,
    size: Size,
    tooltip: Option<String>,
    justification: Justification,
}

impl Image {
    pub fn new(source: ImageSource, width: f32, height: f32) -> Self {
        Self {
            source,
            size: Size::new(width, height),
            tooltip: None,
            justification: Justification::default(),
        }
    }

    /// Embeds `bytes` of the given mime type
    pub fn embedded(mime_type: impl Into<String>, bytes: Vec<u8>, width: f32, height: f32) -> Self {
        Self::new(
            ImageSource::Embedded {
                mime_type: mime_type.into(),
                bytes,
            },
            width,
            height,
        )
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }
}

impl Element for Image {
    fn build(&mut self, _ctx: &BuildContext<'_>) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let top_left = center.to_bounds(self.size).min_point();
        let mut node = svg_element::Image::new()
            .set("x", top_left.x())
            .set("y", top_left.y())
            .set("width", self.size.width())
            .set("height", self.size.height())
            .set("href", self.source.href());

        if let Some(tooltip) = &self.tooltip {
            node = node.add(svg_element::Title::new(tooltip.as_str()));
        }
        surface.add(RenderLayer::Content, node);
        Ok(())
    }

    fn justification(&self) -> Justification {
        self.justification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_href_is_data_uri() {
        let source = ImageSource::Embedded {
            mime_type: "image/png".to_string(),
            bytes: b"abc".to_vec(),
        };
        assert_eq!(source.href(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_image_size_is_fixed() {
        let image = Image::new(ImageSource::Url("a.png".into()), 32.0, 16.0);
        assert_eq!(image.size(), Size::new(32.0, 16.0));
    }
}
