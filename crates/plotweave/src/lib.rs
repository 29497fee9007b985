//! Plotweave - declarative diagram composition and SVG rendering.
//!
//! A diagram is a tree of [`Element`]s: text, images, buttons, axes,
//! charts, maps and timelines, arranged by containers such as
//! [`Sequence`](containers::Sequence). [`Diagram`] owns the root of the
//! tree and renders it in two passes, first fixing every element's size
//! bottom-up, then drawing top-down into absolute positions.
//!
//! # Example
//!
//! ```
//! use plotweave::{Diagram, Format};
//! use plotweave::axis::Axis;
//! use plotweave::elements::Text;
//! use plotweave::fonts::HeuristicMeasurer;
//! use plotweave::geometry::Orientation;
//!
//! let mut diagram = Diagram::new();
//! diagram.add(Text::new("Temperature"));
//! diagram.add(Axis::continuous(400.0, Orientation::Horizontal, -10.0, 35.0).unwrap());
//!
//! let svg = diagram
//!     .render_with_measurer(Format::Svg, &HeuristicMeasurer::default())
//!     .unwrap();
//! assert!(svg.contains("Temperature"));
//! ```

pub mod axis;
pub mod chart;
pub mod config;
pub mod containers;
pub mod density;
pub mod element;
pub mod elements;
pub mod geo;
pub mod map_layers;
pub mod marker;
pub mod palette;
pub mod surface;

mod diagram;
mod error;

pub use plotweave_core::{color, draw, fonts, geometry};

pub use diagram::Diagram;
pub use element::{BuildContext, Element, Format, Justification};
pub use error::{LayoutError, PlotweaveError, Result};
pub use surface::Surface;
