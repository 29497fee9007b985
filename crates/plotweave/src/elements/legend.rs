use log::debug;
use svg::node::element as svg_element;

use plotweave_core::{
    color::Color,
    draw::{RenderLayer, TextAnchor, TextDefinition},
    geometry::{Point, Size},
};

use crate::{
    axis::format_tick,
    element::{BuildContext, Element, Justification},
    error::{LayoutError, Result},
    palette::{ContinuousPalette, DiscretePalette, SharedPalette},
    surface::Surface,
};

const SWATCH_GAP: f32 = 6.0;
const ROW_GAP: f32 = 4.0;

/// Palette explained by a [`Legend`].
#[derive(Debug, Clone)]
pub enum LegendPalette {
    Discrete(SharedPalette<DiscretePalette>),
    Continuous(SharedPalette<ContinuousPalette>),
}

impl From<SharedPalette<DiscretePalette>> for LegendPalette {
    fn from(palette: SharedPalette<DiscretePalette>) -> Self {
        Self::Discrete(palette)
    }
}

impl From<SharedPalette<ContinuousPalette>> for LegendPalette {
    fn from(palette: SharedPalette<ContinuousPalette>) -> Self {
        Self::Continuous(palette)
    }
}

#[derive(Debug, Clone)]
enum LegendLayout {
    Swatches {
        entries: Vec<(String, Color)>,
        row_height: f32,
    },
    Ramp {
        stops: Vec<Color>,
        min_label: String,
        max_label: String,
    },
}

/// Key for the colours of a palette, with a fixed width.
///
/// A discrete palette is shown as swatch and label pairs laid out in rows
/// of `columns` entries. A continuous palette is shown as a colour ramp
/// with its minimum and maximum values below it.
///
/// The palette is read when the legend is built, so the legend must come
/// after the elements that allocate colours from it.
#[derive(Debug, Clone)]
pub struct Legend {
    palette: LegendPalette,
    width: f32,
    columns: usize,
    font_height: f32,
    swatch_size: f32,
    justification: Justification,
    resolved: Option<(TextDefinition, LegendLayout, Size)>,
}

impl Legend {
    /// `columns` only applies to discrete palettes and is at least 1.
    pub fn new(palette: impl Into<LegendPalette>, width: f32, columns: usize) -> Self {
        Self {
            palette: palette.into(),
            width,
            columns: columns.max(1),
            font_height: 12.0,
            swatch_size: 12.0,
            justification: Justification::default(),
            resolved: None,
        }
    }

    pub fn with_font_height(mut self, font_height: f32) -> Self {
        self.font_height = font_height;
        self
    }

    /// Side of a category swatch, and height of the colour ramp
    pub fn with_swatch_size(mut self, swatch_size: f32) -> Self {
        self.swatch_size = swatch_size;
        self
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn column_width(&self) -> f32 {
        self.width / self.columns as f32
    }

    fn build_swatches(
        &self,
        ctx: &BuildContext<'_>,
        text: &TextDefinition,
        palette: &DiscretePalette,
    ) -> Result<(LegendLayout, Size)> {
        let entries: Vec<(String, Color)> = palette
            .categories()
            .map(|(name, color)| (name.to_string(), color))
            .collect();

        let room = self.column_width() - self.swatch_size - SWATCH_GAP;
        for (name, _) in &entries {
            let width = ctx.text_width(text.font(), name, self.font_height)?;
            if width > room {
                debug!(label = name.as_str(), width, room; "Legend label overflows its column");
            }
        }

        let rows = entries.len().div_ceil(self.columns);
        let row_height = self.swatch_size.max(text.line_height()) + ROW_GAP;
        let size = Size::new(self.width, row_height * rows as f32);
        Ok((LegendLayout::Swatches { entries, row_height }, size))
    }

    fn build_ramp(&self, text: &TextDefinition, palette: &ContinuousPalette) -> (LegendLayout, Size) {
        let (min, max) = palette.range();
        let step = (max - min) / 10.0;
        let layout = LegendLayout::Ramp {
            stops: palette.stops().to_vec(),
            min_label: format_tick(min, step),
            max_label: format_tick(max, step),
        };
        let height = self.swatch_size + ROW_GAP + text.line_height();
        (layout, Size::new(self.width, height))
    }
}

impl Element for Legend {
    fn build(&mut self, ctx: &BuildContext<'_>) -> Result<()> {
        let text = TextDefinition::new(self.font_height)
            .with_font(ctx.default_font().clone())
            .with_anchor(TextAnchor::Start);

        let (layout, size) = match &self.palette {
            LegendPalette::Discrete(palette) => self.build_swatches(ctx, &text, &palette.borrow())?,
            LegendPalette::Continuous(palette) => self.build_ramp(&text, &palette.borrow()),
        };
        debug!(width = size.width(), height = size.height(); "Legend built");

        self.resolved = Some((text, layout, size));
        Ok(())
    }

    fn size(&self) -> Size {
        self.resolved.as_ref().map(|(_, _, size)| *size).unwrap_or_default()
    }

    fn draw(&self, surface: &mut Surface, center: Point) -> Result<()> {
        let (text, layout, size) = self
            .resolved
            .as_ref()
            .ok_or(LayoutError::NotBuilt { element: "Legend" })?;
        let left = center.x() - size.width() / 2.0;
        let top = center.y() - size.height() / 2.0;

        match layout {
            LegendLayout::Swatches { entries, row_height } => {
                let column_width = self.column_width();
                for (index, (name, color)) in entries.iter().enumerate() {
                    let x = left + (index % self.columns) as f32 * column_width;
                    let y = top + (index / self.columns) as f32 * row_height + row_height / 2.0;

                    let swatch = svg_element::Rectangle::new()
                        .set("x", x)
                        .set("y", y - self.swatch_size / 2.0)
                        .set("width", self.swatch_size)
                        .set("height", self.swatch_size)
                        .set("fill", color.to_string())
                        .set("fill-opacity", color.alpha());
                    surface.add(RenderLayer::Marker, swatch);

                    let label = Point::new(x + self.swatch_size + SWATCH_GAP, y);
                    surface.add(RenderLayer::Text, text.render_line(label, name));
                }
            }
            LegendLayout::Ramp {
                stops,
                min_label,
                max_label,
            } => {
                let id = surface.allocate_id("ramp");
                let last = stops.len().saturating_sub(1).max(1) as f32;
                let gradient = stops.iter().enumerate().fold(
                    svg_element::LinearGradient::new().set("id", id.as_str()),
                    |gradient, (index, color)| {
                        gradient.add(
                            svg_element::Stop::new()
                                .set("offset", index as f32 / last)
                                .set("stop-color", color.to_string()),
                        )
                    },
                );
                surface.add(RenderLayer::Marker, svg_element::Definitions::new().add(gradient));

                let bar = svg_element::Rectangle::new()
                    .set("x", left)
                    .set("y", top)
                    .set("width", size.width())
                    .set("height", self.swatch_size)
                    .set("fill", format!("url(#{})", id.as_str()));
                surface.add(RenderLayer::Marker, bar);

                let y = top + self.swatch_size + ROW_GAP + text.line_height() / 2.0;
                surface.add(RenderLayer::Text, text.render_line(Point::new(left, y), min_label));
                let end = text.clone().with_anchor(TextAnchor::End);
                surface.add(
                    RenderLayer::Text,
                    end.render_line(Point::new(left + size.width(), y), max_label),
                );
            }
        }
        Ok(())
    }

    fn justification(&self) -> Justification {
        self.justification
    }
}
