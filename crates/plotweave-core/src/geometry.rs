//! Planar geometry used by layout and drawing.
//!
//! All diagram coordinates live in SVG user space:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - [`Point`] - a position, usually the center of an element
//! - [`Size`] - width and height of an element's bounding box
//! - [`Bounds`] - an axis-aligned rectangle given by its extreme coordinates
//! - [`Insets`] - per-side padding or margins
//! - [`Orientation`] - the main axis of a sequence, axis or timeline

use std::{fmt, str::FromStr};

use serde::Deserialize;

/// A position in diagram space.
///
/// # Examples
///
/// ```
/// # use plotweave_core::geometry::Point;
/// let center = Point::new(100.0, 50.0);
/// let moved = center.add_point(Point::new(-10.0, 5.0));
/// assert_eq!(moved.x(), 90.0);
/// assert_eq!(moved.y(), 55.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns a copy of this point with a different x-coordinate
    pub fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    /// Returns a copy of this point with a different y-coordinate
    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    /// Component-wise sum of two points
    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference of two points
    pub fn sub_point(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Treats this point as the center of a box of the given size
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_center(self, size)
    }
}

/// Width and height of an element's bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// True when both dimensions are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Grows the size by the horizontal and vertical sums of `insets`
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Extent along the main axis of `orientation`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use plotweave_core::geometry::{Orientation, Size};
    /// let size = Size::new(40.0, 10.0);
    /// assert_eq!(size.along(Orientation::Horizontal), 40.0);
    /// assert_eq!(size.across(Orientation::Horizontal), 10.0);
    /// ```
    pub fn along(self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Extent perpendicular to the main axis of `orientation`
    pub fn across(self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Horizontal => self.height,
            Orientation::Vertical => self.width,
        }
    }

    /// Builds a size from main-axis and cross-axis extents
    pub fn from_axes(orientation: Orientation, along: f32, across: f32) -> Self {
        match orientation {
            Orientation::Horizontal => Self::new(along, across),
            Orientation::Vertical => Self::new(across, along),
        }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Rectangle of `size` centered on `center`
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Rectangle of `size` whose top-left corner is `top_left`
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Top-left corner
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the rectangle by `offset`
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Shrinks the rectangle by `insets` on each side.
    ///
    /// The result never has negative width or height; an over-inset
    /// rectangle collapses onto its center line.
    pub fn shrink(&self, insets: Insets) -> Self {
        let center = self.center();
        let min_x = (self.min_x + insets.left).min(center.x);
        let max_x = (self.max_x - insets.right).max(min_x);
        let min_y = (self.min_y + insets.top).min(center.y);
        let max_y = (self.max_y - insets.bottom).max(min_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True if `point` lies inside or on the edge of the rectangle
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Per-side spacing (padding, margins).
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same value on all four sides
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// `horizontal` on left and right, `vertical` on top and bottom
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Left plus right
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

/// Direction of a main layout axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    /// The perpendicular orientation
    pub fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }

    /// Component of `point` that lies along this orientation
    pub fn along(self, point: Point) -> f32 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Builds a point from main-axis and cross-axis coordinates
    pub fn point(self, along: f32, across: f32) -> Point {
        match self {
            Self::Horizontal => Point::new(along, across),
            Self::Vertical => Point::new(across, along),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            _ => Err(format!(
                "invalid orientation `{s}`, valid values: horizontal, vertical"
            )),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}
