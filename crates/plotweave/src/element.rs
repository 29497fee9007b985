//! The element protocol.
//!
//! Every node of a diagram tree implements [`Element`]. Rendering is two
//! passes over the tree:
//!
//! 1. **build** - bottom-up; each element fixes its intrinsic size. A
//!    container builds all of its children before computing its own size.
//! 2. **draw** - top-down; each element is handed the absolute center of
//!    its bounding box and emits geometry into a [`Surface`].
//!
//! Sizes are read-only between the two passes: `draw` must use exactly the
//! size computed by the last `build`.

use std::{fmt, str::FromStr};

use plotweave_core::{
    draw::FontAttributes,
    fonts::TextMeasurer,
    geometry::{Point, Size},
};

use crate::{
    error::{LayoutError, Result},
    surface::Surface,
};

/// Output document flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// Static SVG document
    #[default]
    Svg,
    /// HTML page embedding the SVG plus the event wiring script
    Html,
}

impl Format {
    pub fn is_interactive(self) -> bool {
        self == Self::Html
    }
}

impl FromStr for Format {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "html" => Ok(Self::Html),
            _ => Err(LayoutError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Svg => f.write_str("svg"),
            Self::Html => f.write_str("html"),
        }
    }
}

/// Horizontal placement of a child within a vertical sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of a child within a horizontal sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Cross-axis placement requested by an element. Centered by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Justification {
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
}

impl Justification {
    pub fn new(horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn left() -> Self {
        Self::new(HorizontalAlign::Left, VerticalAlign::Center)
    }

    pub fn right() -> Self {
        Self::new(HorizontalAlign::Right, VerticalAlign::Center)
    }

    pub fn top() -> Self {
        Self::new(HorizontalAlign::Center, VerticalAlign::Top)
    }

    pub fn bottom() -> Self {
        Self::new(HorizontalAlign::Center, VerticalAlign::Bottom)
    }

    pub fn horizontal(&self) -> HorizontalAlign {
        self.horizontal
    }

    pub fn vertical(&self) -> VerticalAlign {
        self.vertical
    }

    pub fn is_left(&self) -> bool {
        self.horizontal == HorizontalAlign::Left
    }

    pub fn is_right(&self) -> bool {
        self.horizontal == HorizontalAlign::Right
    }

    pub fn is_top(&self) -> bool {
        self.vertical == VerticalAlign::Top
    }

    pub fn is_bottom(&self) -> bool {
        self.vertical == VerticalAlign::Bottom
    }
}

/// Services and settings available to every element while building.
pub struct BuildContext<'a> {
    format: Format,
    measurer: &'a dyn TextMeasurer,
    default_font: FontAttributes,
}

impl<'a> BuildContext<'a> {
    pub fn new(format: Format, measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            format,
            measurer,
            default_font: FontAttributes::default(),
        }
    }

    pub fn with_default_font(mut self, font: FontAttributes) -> Self {
        self.default_font = font;
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer
    }

    /// Font used by text that does not set its own
    pub fn default_font(&self) -> &FontAttributes {
        &self.default_font
    }

    /// Measures the widest line of `text`.
    ///
    /// # Errors
    ///
    /// Font metric failures are reported as
    /// [`PlotweaveError::External`](crate::PlotweaveError::External).
    pub fn text_width(&self, font: &FontAttributes, text: &str, font_height: f32) -> Result<f32> {
        Ok(self.measurer.block_width(font, text, font_height)?)
    }
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("format", &self.format)
            .field("default_font", &self.default_font)
            .finish_non_exhaustive()
    }
}

/// A node of the diagram tree.
///
/// # Contract
///
/// - `build` is called before `size`/`draw` and may be called again on a
///   later render; it must be idempotent for unchanged configuration.
/// - `size` is only meaningful after `build` returns.
/// - `draw` places the element so its bounding box is centered on `center`
///   and must not change the size.
pub trait Element: fmt::Debug {
    /// Fixes the intrinsic size of the element (and of all its children).
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()>;

    /// Size computed by the last build
    fn size(&self) -> Size;

    fn width(&self) -> f32 {
        self.size().width()
    }

    fn height(&self) -> f32 {
        self.size().height()
    }

    /// Emits geometry centered on `center`.
    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()>;

    /// Cross-axis placement inside a sequence
    fn justification(&self) -> Justification {
        Justification::default()
    }
}
