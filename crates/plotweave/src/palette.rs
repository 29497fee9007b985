//! Colour allocation for data values.
//!
//! Elements that colour data by value hold a palette. A palette created
//! with [`shared`] can be handed to several elements so that equal values
//! get equal colours across all of them.

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use log::trace;

use plotweave_core::color::Color;

use crate::error::{PlotweaveError, Result};

const CATEGORY_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const RAMP_COLORS: [&str; 3] = ["#fff7bc", "#fe9929", "#990000"];

/// A palette shared between elements.
pub type SharedPalette<P> = Rc<RefCell<P>>;

/// Wraps `palette` for sharing.
pub fn shared<P>(palette: P) -> SharedPalette<P> {
    Rc::new(RefCell::new(palette))
}

fn parse_all(colors: &[&str]) -> Vec<Color> {
    colors
        .iter()
        .map(|c| Color::new(c).unwrap_or_default())
        .collect()
}

/// Assigns colours to categories in the order they are first seen.
///
/// Colours repeat once every palette entry has been handed out.
#[derive(Debug, Clone)]
pub struct DiscretePalette {
    colors: Vec<Color>,
    assigned: IndexMap<String, Color>,
    default_color: Color,
}

impl DiscretePalette {
    /// Palette over the ten category colours
    pub fn new() -> Self {
        Self {
            colors: parse_all(&CATEGORY_COLORS),
            assigned: IndexMap::new(),
            default_color: Color::new("grey").unwrap_or_default(),
        }
    }

    /// Palette cycling through `colors`. An empty list falls back to the
    /// default colour for every category.
    pub fn with_colors(colors: Vec<Color>) -> Self {
        Self {
            colors,
            ..Self::new()
        }
    }

    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    /// Pins `category` to `color`, replacing any earlier assignment.
    pub fn add_color(&mut self, category: impl Into<String>, color: Color) -> &mut Self {
        self.assigned.insert(category.into(), color);
        self
    }

    /// Colour for `category`, assigning the next free colour on first use.
    pub fn allocate(&mut self, category: &str) -> Color {
        if let Some(color) = self.assigned.get(category) {
            return *color;
        }
        let color = if self.colors.is_empty() {
            self.default_color
        } else {
            self.colors[self.assigned.len() % self.colors.len()]
        };
        trace!(category, color:?; "Allocated category colour");
        self.assigned.insert(category.to_string(), color);
        color
    }

    /// Colour already assigned to `category`, or the default colour.
    pub fn color(&self, category: &str) -> Color {
        self.assigned
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn default_color(&self) -> Color {
        self.default_color
    }

    /// Assigned categories in allocation order
    pub fn categories(&self) -> impl Iterator<Item = (&str, Color)> {
        self.assigned.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

impl Default for DiscretePalette {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpolates a colour ramp over the range of allocated values.
///
/// Until a value is allocated the range is `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ContinuousPalette {
    stops: Vec<Color>,
    range: Option<(f64, f64)>,
}

impl ContinuousPalette {
    /// Pale yellow to dark red
    pub fn new() -> Self {
        Self {
            stops: parse_all(&RAMP_COLORS),
            range: None,
        }
    }

    /// Ramp through `stops`, evenly spaced.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for fewer than two stops.
    pub fn with_stops(stops: Vec<Color>) -> Result<Self> {
        if stops.len() < 2 {
            return Err(PlotweaveError::config(format!(
                "a colour ramp needs at least two stops, got {}",
                stops.len()
            )));
        }
        Ok(Self { stops, range: None })
    }

    /// Widens the range to include `value`. Non finite values are ignored.
    pub fn allocate(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.range = Some(match self.range {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
    }

    pub fn range(&self) -> (f64, f64) {
        self.range.unwrap_or((0.0, 1.0))
    }

    /// Forgets every allocated value
    pub fn reset(&mut self) {
        self.range = None;
    }

    /// Colour for `value`, clamped to the ends of the ramp.
    pub fn color(&self, value: f64) -> Color {
        let (min, max) = self.range();
        let t = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let segments = self.stops.len() - 1;
        let scaled = t * segments as f64;
        let index = (scaled.floor() as usize).min(segments - 1);
        let local = (scaled - index as f64) as f32;
        self.stops[index].lerp(self.stops[index + 1], local)
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }
}

impl Default for ContinuousPalette {
    fn default() -> Self {
        Self::new()
    }
}
