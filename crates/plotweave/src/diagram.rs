//! The render entrypoint.

use std::ops::{Deref, DerefMut};

use log::{debug, info};
use serde::Serialize;
use svg::node::element as svg_element;

use plotweave_core::{
    color::Color,
    draw::{FontAttributes, RenderLayer},
    fonts::{FontRegistry, TextMeasurer},
    geometry::{Insets, Point},
};

use crate::{
    config::DiagramConfig,
    containers::Sequence,
    element::{BuildContext, Element, Format, Justification},
    elements::Text,
    error::Result,
    surface::{Connection, ElementId, Registration, Surface, SurfaceOutput},
};

/// Client runtime for the interactive format.
///
/// Buttons publish their click value on their `click` channel, popups
/// show themselves on a truthy `click` value and hide on a falsy one.
const RUNTIME_JS: &str = r#"(function (model) {
  const listeners = {};
  const key = (id, channel) => id + "/" + channel;
  const subscribe = (id, channel, fn) => {
    (listeners[key(id, channel)] = listeners[key(id, channel)] || []).push(fn);
  };
  const publish = (id, channel, value) => {
    (listeners[key(id, channel)] || []).forEach((fn) => fn(value));
  };
  model.connections.forEach((c) => {
    const adapt = new Function("return " + c.adapter)();
    subscribe(c.source, c.source_channel, (value) => {
      publish(c.destination, c.destination_channel, adapt(value));
    });
  });
  model.registrations.forEach((r) => {
    const node = document.getElementById(r.id);
    if (!node) {
      return;
    }
    if (r.kind === "button") {
      const face = node.querySelector("rect");
      node.addEventListener("mousedown", () => face && face.setAttribute("fill", r.config.push_fill));
      node.addEventListener("mouseup", () => face && face.setAttribute("fill", r.config.fill));
      node.addEventListener("click", () => publish(r.id, "click", r.config.click_value));
    } else if (r.kind === "popup") {
      subscribe(r.id, "click", (value) => {
        node.setAttribute("visibility", value ? "visible" : "hidden");
      });
    }
  });
})"#;

/// Data handed to the client runtime
#[derive(Serialize)]
struct PageModel<'a> {
    registrations: &'a [Registration],
    connections: &'a [Connection],
}

/// Footer text appended to every render
fn footer_text() -> String {
    format!("Generated by plotweave v{}", env!("CARGO_PKG_VERSION"))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Holds the footer in the content sequence for the duration of a render.
///
/// The footer is removed again when the guard is dropped, whether or not
/// the render succeeded.
struct FooterGuard<'a> {
    content: &'a mut Sequence,
    pushed: bool,
}

impl<'a> FooterGuard<'a> {
    fn new(content: &'a mut Sequence, footer: Option<Text>) -> Self {
        let pushed = match footer {
            Some(footer) => {
                content.add(footer);
                true
            }
            None => false,
        };
        Self { content, pushed }
    }
}

impl Deref for FooterGuard<'_> {
    type Target = Sequence;

    fn deref(&self) -> &Sequence {
        self.content
    }
}

impl DerefMut for FooterGuard<'_> {
    fn deref_mut(&mut self) -> &mut Sequence {
        self.content
    }
}

impl Drop for FooterGuard<'_> {
    fn drop(&mut self) {
        if self.pushed {
            self.content.pop();
        }
    }
}

/// Root of a diagram: a vertical sequence of elements inside margins.
///
/// # Examples
///
/// ```
/// # use plotweave::{Diagram, Format};
/// # use plotweave::elements::{Space, Text};
/// # use plotweave::fonts::HeuristicMeasurer;
/// let mut diagram = Diagram::new();
/// diagram.add(Text::new("Rainfall"));
/// diagram.add(Space::new(200.0, 100.0));
///
/// let svg = diagram
///     .render_with_measurer(Format::Svg, &HeuristicMeasurer::default())
///     .unwrap();
/// assert!(svg.starts_with("<svg"));
/// assert_eq!(diagram.len(), 2);
/// ```
#[derive(Debug)]
pub struct Diagram {
    content: Sequence,
    margins: Insets,
    fill: Option<Color>,
    default_font: FontAttributes,
    footer: bool,
    styles: Vec<String>,
    scripts: Vec<String>,
    connections: Vec<Connection>,
    title: Option<String>,
    description: Option<String>,
}

impl Diagram {
    /// An empty diagram with 50px margins and 20px spacing
    pub fn new() -> Self {
        Self {
            content: Sequence::new().with_spacing(20.0),
            margins: Insets::uniform(50.0),
            fill: None,
            default_font: FontAttributes::default(),
            footer: true,
            styles: Vec::new(),
            scripts: Vec::new(),
            connections: Vec::new(),
            title: None,
            description: None,
        }
    }

    /// A diagram laid out according to `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid background colour.
    pub fn from_config(config: &DiagramConfig) -> Result<Self> {
        let mut diagram = Self::new()
            .with_margins(config.margins())
            .with_spacing(config.spacing())
            .with_default_font(config.font())
            .with_footer(config.footer());
        diagram.fill = config.background_color()?;
        Ok(diagram)
    }

    pub fn with_margins(mut self, margins: Insets) -> Self {
        self.margins = margins;
        self
    }

    /// Gap between top-level elements
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.content = std::mem::take(&mut self.content).with_spacing(spacing);
        self
    }

    /// Background colour of the whole canvas
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Font used by text that does not set its own
    pub fn with_default_font(mut self, font: FontAttributes) -> Self {
        self.default_font = font;
        self
    }

    /// Whether renders carry the generator footer
    pub fn with_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Document title, emitted as the SVG `<title>` and the page title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Document description, emitted as the SVG `<desc>`
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a top-level element.
    pub fn add(&mut self, element: impl Element + 'static) -> &mut Self {
        self.content.add(element);
        self
    }

    /// Number of top-level elements
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Routes events from `source`'s channel to `destination`'s channel.
    ///
    /// `adapter` is a javascript function applied to each event in
    /// transit; events pass unchanged without one. Repeated connections
    /// are ignored.
    pub fn connect(
        &mut self,
        source: &str,
        source_channel: &str,
        destination: &str,
        destination_channel: &str,
        adapter: Option<&str>,
    ) -> &mut Self {
        let mut connection = Connection::new(
            ElementId::new(source),
            source_channel,
            ElementId::new(destination),
            destination_channel,
        );
        if let Some(adapter) = adapter {
            connection = connection.with_adapter(adapter);
        }
        if !self.connections.contains(&connection) {
            self.connections.push(connection);
        }
        self
    }

    /// Adds CSS rules to the document.
    pub fn add_style(&mut self, css: impl Into<String>) -> &mut Self {
        self.styles.push(css.into());
        self
    }

    /// Adds a script to the interactive page.
    pub fn add_javascript(&mut self, script: impl Into<String>) -> &mut Self {
        self.scripts.push(script.into());
        self
    }

    /// Renders with the process-wide font registry.
    ///
    /// # Errors
    ///
    /// Propagates any build or draw failure; nothing is rendered then.
    pub fn render(&mut self, format: Format) -> Result<String> {
        self.render_with_measurer(format, FontRegistry::shared())
    }

    /// Renders measuring text with `measurer`.
    ///
    /// # Errors
    ///
    /// Propagates any build or draw failure; nothing is rendered then.
    pub fn render_with_measurer(
        &mut self,
        format: Format,
        measurer: &dyn TextMeasurer,
    ) -> Result<String> {
        info!(format:?, elements = self.content.len(); "Rendering diagram");

        let ctx = BuildContext::new(format, measurer).with_default_font(self.default_font.clone());
        let footer = self.footer.then(|| {
            Text::new(footer_text())
                .with_font_height(10.0)
                .with_color(Color::new("grey").unwrap_or_default())
                .with_justification(Justification::right())
        });
        let mut content = FooterGuard::new(&mut self.content, footer);
        content.build(&ctx)?;

        let size = content.size();
        let width = size.width() + self.margins.horizontal_sum();
        let height = size.height() + self.margins.vertical_sum();
        debug!(width, height; "Diagram built");

        let mut surface = Surface::new(format);
        if let Some(fill) = self.fill {
            let background = svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", fill.to_string());
            surface.add(RenderLayer::Background, background);
        }
        let center = Point::new(
            self.margins.left() + size.width() / 2.0,
            self.margins.top() + size.height() / 2.0,
        );
        content.draw(&mut surface, center)?;
        drop(content);

        for connection in &self.connections {
            surface.connect(connection.clone());
        }
        let output = surface.finish()?;

        let mut document = svg::Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", format!("0 0 {width} {height}"));
        if let Some(title) = &self.title {
            document = document.add(svg_element::Title::new(title.as_str()));
        }
        if let Some(description) = &self.description {
            document = document
                .add(svg_element::Description::new().add(svg::node::Text::new(description.as_str())));
        }
        if !self.styles.is_empty() {
            document = document.add(svg_element::Style::new(self.styles.join("\n")));
        }
        let SurfaceOutput {
            nodes,
            registrations,
            connections,
        } = output;
        for node in nodes {
            document = document.add(node);
        }

        match format {
            Format::Svg => Ok(document.to_string()),
            Format::Html => {
                let model = serde_json::to_string(&PageModel {
                    registrations: &registrations,
                    connections: &connections,
                })?;
                Ok(self.html_page(&document.to_string(), &model))
            }
        }
    }

    fn html_page(&self, svg: &str, model: &str) -> String {
        // keep the model from closing the script element
        let model = model.replace("</", "<\\/");
        let scripts = self.scripts.join("\n");
        let title = escape_html(self.title.as_deref().unwrap_or("plotweave"));
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{svg}\n<script>\n{RUNTIME_JS}({model});\n{scripts}\n</script>\n</body>\n</html>\n"
        )
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}
