//! Core types for Plotweave diagrams.
//!
//! This crate holds the pieces every element relies on but that carry no
//! layout logic of their own: geometry, colours, stroke and text styling,
//! the layered SVG output buffer and the font metrics service.

pub mod color;
pub mod draw;
pub mod fonts;
pub mod geometry;
