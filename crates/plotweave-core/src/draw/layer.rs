//! Z-ordered collection of SVG nodes.
//!
//! Drawing code emits nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]. When rendered, nodes are grouped per layer and emitted
//! bottom to top, so a chart's grid lines stay under its markers no matter
//! which order elements were drawn in.
//!
//! ```
//! # use plotweave_core::draw::{LayeredOutput, RenderLayer};
//! # use svg::node::element::{Line, Rectangle};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Marker, Box::new(Rectangle::new()));
//! output.add_to_layer(RenderLayer::Grid, Box::new(Line::new()));
//!
//! // grid first, markers second
//! assert_eq!(output.render().len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom first.
///
/// The derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Page and box fills
    Background,
    /// Map fills: density cells, polygons
    Area,
    /// Grid lines and graticules
    Grid,
    /// Generic shapes (default)
    Content,
    /// Axis lines and ticks
    Axis,
    /// Data markers, bars and timeline points
    Marker,
    /// Labels
    Text,
    /// Popups and controls drawn above everything else
    Overlay,
}

impl RenderLayer {
    /// Value of the `data-layer` attribute for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Area => "area",
            Self::Grid => "grid",
            Self::Content => "content",
            Self::Axis => "axis",
            Self::Marker => "marker",
            Self::Text => "text",
            Self::Overlay => "overlay",
        }
    }
}

/// SVG nodes tagged with the layer they render on.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` to `layer`. Insertion order is kept within a layer.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Moves every node of `other` into `self`.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of nodes across all layers
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of nodes on a single layer
    pub fn count_on(&self, layer: RenderLayer) -> usize {
        self.items.iter().filter(|(l, _)| *l == layer).count()
    }

    /// Consumes the output and returns one `<g data-layer=...>` per
    /// non-empty layer, bottom layer first.
    pub fn render(mut self) -> Vec<SvgNode> {
        // stable: keeps draw order inside each layer
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result: Vec<SvgNode> = Vec::new();
        let mut current: Option<(RenderLayer, svg_element::Group)> = None;

        for (layer, node) in self.items {
            current = match current {
                Some((current_layer, group)) if current_layer == layer => {
                    Some((layer, group.add(node)))
                }
                previous => {
                    if let Some((_, group)) = previous {
                        result.push(Box::new(group));
                    }
                    let group = svg_element::Group::new().set("data-layer", layer.name());
                    Some((layer, group.add(node)))
                }
            };
        }

        if let Some((_, group)) = current {
            result.push(Box::new(group));
        }

        result
    }
}
