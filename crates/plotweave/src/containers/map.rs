//! Layered geographic canvas.

use std::rc::Rc;

use log::debug;

use plotweave_core::{
    draw::RenderLayer,
    geometry::{Point, Size},
};

use crate::{
    element::{BuildContext, Element},
    error::{LayoutError, PlotweaveError, Result},
    geo::{GeoBounds, Geocoder, Projection, WebMercator, compute_boundaries},
    map_layers::{MapFrame, MapLayer},
    surface::Surface,
};

/// A fixed-width map whose layers share one projection.
///
/// The visible area is either set explicitly or the union of what the
/// layers ask for. The height follows from the projected aspect ratio of
/// that area. Layers are drawn back to front in insertion order.
#[derive(Debug)]
pub struct Map {
    width: f32,
    boundaries: Option<GeoBounds>,
    projection: Rc<dyn Projection>,
    layers: Vec<Box<dyn MapLayer>>,
    frame: Option<MapFrame>,
}

impl Map {
    /// An empty Web Mercator map `width` pixels wide
    pub fn new(width: f32) -> Self {
        Self {
            width,
            boundaries: None,
            projection: Rc::new(WebMercator),
            layers: Vec::new(),
            frame: None,
        }
    }

    /// A map showing `radius` meters around `place` as resolved by
    /// `geocoder`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a radius that is not a positive
    /// distance, and the geocoder's error when the place is not found.
    pub fn centered_on(width: f32, geocoder: &dyn Geocoder, place: &str, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PlotweaveError::config(format!(
                "map radius must be a positive distance, got {radius}"
            )));
        }
        let center = geocoder.fetch_center(place)?;
        debug!(place, lon = center.lon, lat = center.lat, radius; "Map centered on place");
        Ok(Self::new(width).with_boundaries(compute_boundaries(center, radius)))
    }

    pub fn with_boundaries(mut self, boundaries: GeoBounds) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    pub fn with_projection(mut self, projection: impl Projection + 'static) -> Self {
        self.projection = Rc::new(projection);
        self
    }

    /// Adds a layer on top of the existing ones.
    pub fn add_layer(&mut self, layer: impl MapLayer + 'static) -> &mut Self {
        self.layers.push(Box::new(layer));
        self.frame = None;
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Pixel geometry fixed by the last build
    pub fn frame(&self) -> Option<&MapFrame> {
        self.frame.as_ref()
    }

    fn resolve_boundaries(&self) -> Result<GeoBounds> {
        if let Some(boundaries) = self.boundaries {
            return Ok(boundaries);
        }
        self.layers
            .iter()
            .filter_map(|layer| layer.boundaries())
            .reduce(|a, b| a.merge(&b))
            .ok_or_else(|| {
                PlotweaveError::config("map has no boundaries and none of its layers provide any")
            })
    }
}

impl Element for Map {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        let boundaries = self.resolve_boundaries()?;
        let frame = MapFrame::new(self.width, boundaries, Rc::clone(&self.projection));

        for layer in &mut self.layers {
            layer.configure(&frame)?;
            layer.build(ctx)?;
        }

        debug!(
            projection = self.projection.name(),
            layers = self.layers.len(),
            width = frame.width(),
            height = frame.height();
            "Map built"
        );
        self.frame = Some(frame);
        Ok(())
    }

    fn size(&self) -> Size {
        self.frame.as_ref().map(MapFrame::size).unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let frame = self
            .frame
            .as_ref()
            .ok_or(LayoutError::NotBuilt { element: "Map" })?;
        let origin = center.to_bounds(frame.size()).min_point();

        surface.open_group(RenderLayer::Content);
        // each layer keeps its own z-order inside its group
        for layer in &self.layers {
            surface.open_group(RenderLayer::Content);
            layer.draw(surface, frame, origin)?;
            surface.close_group()?;
        }
        surface.close_group()
    }
}
