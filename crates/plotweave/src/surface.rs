//! Draw sink handed to elements during the draw pass.
//!
//! A [`Surface`] collects SVG nodes into nested groups of
//! [`LayeredOutput`]s and records the side-channel information the
//! interactive format needs: element ids, script registrations and event
//! channel connections. Elements never serialize markup themselves.

use log::trace;
use serde::Serialize;
use svg::node::element as svg_element;

use plotweave_core::draw::{LayeredOutput, RenderLayer, SvgNode};

use crate::{
    element::Format,
    error::{LayoutError, Result},
};

/// Identity of a drawn element, used to wire event channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routes events from one element's channel to another's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    source: ElementId,
    source_channel: String,
    destination: ElementId,
    destination_channel: String,
    adapter: String,
}

impl Connection {
    /// Identity adapter forwarding events unchanged
    pub const IDENTITY_ADAPTER: &'static str = "function(event) { return event; }";

    pub fn new(
        source: ElementId,
        source_channel: impl Into<String>,
        destination: ElementId,
        destination_channel: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_channel: source_channel.into(),
            destination,
            destination_channel: destination_channel.into(),
            adapter: Self::IDENTITY_ADAPTER.to_string(),
        }
    }

    /// Replaces the javascript function applied to events in transit
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = adapter.into();
        self
    }

    pub fn source(&self) -> &ElementId {
        &self.source
    }

    pub fn destination(&self) -> &ElementId {
        &self.destination
    }
}

/// Client-side behaviour attached to a drawn element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    id: ElementId,
    kind: String,
    config: serde_json::Value,
}

impl Registration {
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

#[derive(Debug)]
struct GroupFrame {
    id: ElementId,
    attributes: Vec<(String, svg::node::Value)>,
    layer: RenderLayer,
    output: LayeredOutput,
}

/// Everything a finished draw pass produced.
#[derive(Debug)]
pub struct SurfaceOutput {
    pub nodes: Vec<SvgNode>,
    pub registrations: Vec<Registration>,
    pub connections: Vec<Connection>,
}

/// The draw pass sink.
#[derive(Debug)]
pub struct Surface {
    format: Format,
    root: LayeredOutput,
    groups: Vec<GroupFrame>,
    next_id: usize,
    registrations: Vec<Registration>,
    connections: Vec<Connection>,
}

impl Surface {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            root: LayeredOutput::new(),
            groups: Vec::new(),
            next_id: 0,
            registrations: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Adds a node to `layer` of the innermost open group.
    pub fn add(&mut self, layer: RenderLayer, node: impl svg::Node + 'static) {
        self.current_output().add_to_layer(layer, Box::new(node));
    }

    /// Opens a `<g>` that collects everything added until the matching
    /// [`close_group`](Self::close_group). The group itself is placed on
    /// `layer` of its parent.
    pub fn open_group(&mut self, layer: RenderLayer) -> ElementId {
        let id = self.allocate_id("g");
        self.open_group_as(layer, id.clone());
        id
    }

    /// Like [`open_group`](Self::open_group) with a caller-chosen id.
    pub fn open_group_as(&mut self, layer: RenderLayer, id: ElementId) {
        self.groups.push(GroupFrame {
            id,
            attributes: Vec::new(),
            layer,
            output: LayeredOutput::new(),
        });
    }

    /// Sets an attribute on the innermost open group.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoOpenGroup`] when no group is open.
    pub fn set_group_attribute(
        &mut self,
        name: &str,
        value: impl Into<svg::node::Value>,
    ) -> Result<()> {
        let frame = self.groups.last_mut().ok_or(LayoutError::NoOpenGroup)?;
        frame.attributes.push((name.to_string(), value.into()));
        Ok(())
    }

    /// Closes the innermost group and adds it to its parent.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoOpenGroup`] when no group is open.
    pub fn close_group(&mut self) -> Result<()> {
        let frame = self.groups.pop().ok_or(LayoutError::NoOpenGroup)?;
        let group = frame
            .attributes
            .into_iter()
            .fold(
                svg_element::Group::new().set("id", frame.id.as_str()),
                |group, (name, value)| group.set(name, value),
            );
        let group = frame
            .output
            .render()
            .into_iter()
            .fold(group, |group, node| group.add(node));
        self.current_output()
            .add_to_layer(frame.layer, Box::new(group));
        Ok(())
    }

    /// Returns a fresh id unique within this surface.
    pub fn allocate_id(&mut self, prefix: &str) -> ElementId {
        self.next_id += 1;
        ElementId(format!("pw-{prefix}-{}", self.next_id))
    }

    /// Attaches client-side behaviour of `kind` to element `id`.
    pub fn register(&mut self, id: &ElementId, kind: &str, config: serde_json::Value) {
        trace!(id = id.as_str(), kind; "Registering element behaviour");
        self.registrations.push(Registration {
            id: id.clone(),
            kind: kind.to_string(),
            config,
        });
    }

    /// Records a channel connection; duplicates are ignored.
    pub fn connect(&mut self, connection: Connection) {
        if !self.connections.contains(&connection) {
            self.connections.push(connection);
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Finishes the draw pass.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnbalancedGroups`] when a group is still open.
    pub fn finish(self) -> Result<SurfaceOutput> {
        if !self.groups.is_empty() {
            return Err(LayoutError::UnbalancedGroups {
                open: self.groups.len(),
            }
            .into());
        }
        Ok(SurfaceOutput {
            nodes: self.root.render(),
            registrations: self.registrations,
            connections: self.connections,
        })
    }

    fn current_output(&mut self) -> &mut LayeredOutput {
        match self.groups.last_mut() {
            Some(frame) => &mut frame.output,
            None => &mut self.root,
        }
    }
}

#[cfg(test)]
mod tests {
    use svg::node::element::Rectangle;

    use super::*;

    #[test]
    fn test_groups_nest_nodes() {
        let mut surface = Surface::new(Format::Svg);
        surface.add(RenderLayer::Content, Rectangle::new());
        let id = surface.open_group(RenderLayer::Overlay);
        surface.set_group_attribute("opacity", 0.5).unwrap();
        surface.add(RenderLayer::Text, Rectangle::new());
        surface.close_group().unwrap();

        let output = surface.finish().unwrap();
        assert_eq!(output.nodes.len(), 2);
        let overlay = output.nodes[1].to_string();
        assert!(overlay.contains(id.as_str()));
        assert!(overlay.contains("opacity=\"0.5\""));
    }

    #[test]
    fn test_unbalanced_groups_are_reported() {
        let mut surface = Surface::new(Format::Svg);
        assert!(surface.close_group().is_err());
        surface.open_group(RenderLayer::Content);
        assert!(matches!(
            surface.finish(),
            Err(crate::PlotweaveError::Layout(LayoutError::UnbalancedGroups { open: 1 }))
        ));
    }

    #[test]
    fn test_connections_are_deduplicated() {
        let mut surface = Surface::new(Format::Html);
        let a = surface.allocate_id("button");
        let b = surface.allocate_id("popup");
        assert_ne!(a, b);

        surface.connect(Connection::new(a.clone(), "click", b.clone(), "click"));
        surface.connect(Connection::new(a.clone(), "click", b.clone(), "click"));
        surface.connect(Connection::new(a, "click", b, "click").with_adapter("f"));
        assert_eq!(surface.connections().len(), 2);
    }
}
