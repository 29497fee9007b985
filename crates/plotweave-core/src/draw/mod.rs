//! Drawing primitives shared by every element.
//!
//! - [`LayeredOutput`] / [`RenderLayer`] - z-ordered node collection
//! - [`StrokeDefinition`] - line styling, applied with [`apply_stroke!`](crate::apply_stroke!)
//! - [`TextDefinition`] / [`FontAttributes`] - text styling

mod layer;
mod stroke;
mod text;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{StrokeCap, StrokeDefinition, StrokeStyle};
pub use text::{FontAttributes, FontStyle, FontWeight, TextAnchor, TextDefinition};
