//! Font metrics service.
//!
//! Layout needs one thing from fonts: the rendered width of a string at a
//! given font height. [`TextMeasurer`] is that narrow interface; elements
//! receive it through their build context instead of reaching for global
//! state.
//!
//! Two implementations are provided:
//!
//! - [`HeuristicMeasurer`] - fixed average glyph width, deterministic and
//!   font-independent (used by tests and when no fonts are installed)
//! - [`FontRegistry`] - glyph width tables measured once per font face with
//!   `cosmic-text`, cached for the life of the registry

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};
use log::{debug, info};
use thiserror::Error;

use crate::draw::{FontAttributes, FontStyle, FontWeight};

/// Font height at which glyph tables are measured.
const REFERENCE_HEIGHT: f32 = 100.0;

/// Width ratio assumed for glyphs missing from a table.
const UNKNOWN_GLYPH_RATIO: f32 = 1.0;

/// Errors raised by font metric providers.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font system unavailable: {0}")]
    Unavailable(String),

    #[error("failed to load metrics for font `{font}`: {reason}")]
    Load { font: String, reason: String },
}

/// Measures rendered text.
pub trait TextMeasurer: Send + Sync {
    /// Width in pixels of `text` drawn with `font` at `font_height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`FontError`] when the metrics for `font` cannot be obtained.
    fn text_width(
        &self,
        font: &FontAttributes,
        text: &str,
        font_height: f32,
    ) -> Result<f32, FontError>;

    /// Width of the widest line of a `\n` separated block.
    fn block_width(
        &self,
        font: &FontAttributes,
        text: &str,
        font_height: f32,
    ) -> Result<f32, FontError> {
        text.split('\n').try_fold(0.0f32, |widest, line| {
            Ok(widest.max(self.text_width(font, line, font_height)?))
        })
    }
}

/// Measures every character as a fixed fraction of the font height.
///
/// # Examples
///
/// ```
/// # use plotweave_core::draw::FontAttributes;
/// # use plotweave_core::fonts::{HeuristicMeasurer, TextMeasurer};
/// let measurer = HeuristicMeasurer::default();
/// let width = measurer
///     .text_width(&FontAttributes::default(), "abcd", 10.0)
///     .unwrap();
/// assert!((width - 24.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMeasurer {
    char_width_ratio: f32,
}

impl HeuristicMeasurer {
    pub fn new(char_width_ratio: f32) -> Self {
        Self { char_width_ratio }
    }
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn text_width(
        &self,
        font: &FontAttributes,
        text: &str,
        font_height: f32,
    ) -> Result<f32, FontError> {
        let mut ratio = self.char_width_ratio;
        if font.weight() == FontWeight::Bold {
            ratio *= 1.1;
        }
        Ok(text.chars().count() as f32 * font_height * ratio)
    }
}

/// Per-face glyph width ratios (glyph advance / font height).
#[derive(Debug, Default)]
pub struct GlyphTable {
    ratios: HashMap<char, f32>,
}

impl GlyphTable {
    pub fn from_ratios(ratios: HashMap<char, f32>) -> Self {
        Self { ratios }
    }

    /// Ratio for `ch`, falling back to one em for unknown glyphs
    pub fn ratio(&self, ch: char) -> f32 {
        self.ratios.get(&ch).copied().unwrap_or(UNKNOWN_GLYPH_RATIO)
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    /// Width of `text` at `font_height`
    pub fn width(&self, text: &str, font_height: f32) -> f32 {
        text.chars().map(|ch| self.ratio(ch) * font_height).sum()
    }
}

/// Loads glyph tables for a font face.
pub trait GlyphSource: Send + Sync {
    fn load(&self, font: &FontAttributes) -> Result<GlyphTable, FontError>;
}

/// Glyph source backed by the system fonts through `cosmic-text`.
///
/// The underlying [`FontSystem`] is created on first use.
#[derive(Default)]
pub struct CosmicGlyphSource {
    font_system: OnceLock<Mutex<FontSystem>>,
}

impl CosmicGlyphSource {
    fn measure_char(font_system: &mut FontSystem, attrs: &Attrs<'_>, ch: char) -> Option<f32> {
        let metrics = Metrics::new(REFERENCE_HEIGHT, REFERENCE_HEIGHT * 1.2);
        let mut buffer = Buffer::new(font_system, metrics);
        let mut buffer = buffer.borrow_with(font_system);
        buffer.set_size(None, None);
        buffer.set_text(&ch.to_string(), attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        buffer
            .layout_runs()
            .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
            .reduce(f32::max)
            .map(|width| width / REFERENCE_HEIGHT)
    }
}

impl GlyphSource for CosmicGlyphSource {
    fn load(&self, font: &FontAttributes) -> Result<GlyphTable, FontError> {
        let font_system = self.font_system.get_or_init(|| {
            info!("Initializing FontSystem");
            Mutex::new(FontSystem::new())
        });
        let mut font_system = font_system
            .lock()
            .map_err(|err| FontError::Unavailable(err.to_string()))?;

        let family = match font.family() {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        };
        let weight = match font.weight() {
            FontWeight::Normal => Weight::NORMAL,
            FontWeight::Bold => Weight::BOLD,
        };
        let style = match font.style() {
            FontStyle::Normal => Style::Normal,
            FontStyle::Italic => Style::Italic,
        };
        let attrs = Attrs::new().family(family).weight(weight).style(style);

        let ratios: HashMap<char, f32> = (' '..='~')
            .filter_map(|ch| Self::measure_char(&mut font_system, &attrs, ch).map(|r| (ch, r)))
            .collect();

        debug!(font = font.to_string(), glyphs = ratios.len(); "Measured glyph table");
        Ok(GlyphTable::from_ratios(ratios))
    }
}

/// Process-wide cache of glyph tables keyed by font face.
///
/// Each face is loaded at most once; the cache only ever grows, so lookups
/// after the first load are a map read under a short lock.
pub struct FontRegistry {
    source: Box<dyn GlyphSource>,
    tables: Mutex<HashMap<FontAttributes, Arc<GlyphTable>>>,
}

impl FontRegistry {
    /// A registry measuring system fonts with `cosmic-text`
    pub fn new() -> Self {
        Self::with_source(CosmicGlyphSource::default())
    }

    /// A registry loading tables from a custom source
    pub fn with_source(source: impl GlyphSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// The shared registry used when no measurer is injected.
    pub fn shared() -> &'static FontRegistry {
        static SHARED: OnceLock<FontRegistry> = OnceLock::new();
        SHARED.get_or_init(FontRegistry::new)
    }

    /// Returns the table for `font`, loading it if absent.
    ///
    /// # Errors
    ///
    /// Propagates the source's [`FontError`]; a failed load is not cached.
    pub fn glyphs(&self, font: &FontAttributes) -> Result<Arc<GlyphTable>, FontError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|err| FontError::Unavailable(err.to_string()))?;

        if let Some(table) = tables.get(font) {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.source.load(font)?);
        tables.insert(font.clone(), Arc::clone(&table));
        Ok(table)
    }

    /// Number of faces loaded so far
    pub fn loaded_count(&self) -> usize {
        self.tables.lock().map(|tables| tables.len()).unwrap_or(0)
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("loaded", &self.loaded_count())
            .finish()
    }
}

impl TextMeasurer for FontRegistry {
    fn text_width(
        &self,
        font: &FontAttributes,
        text: &str,
        font_height: f32,
    ) -> Result<f32, FontError> {
        let table = self.glyphs(font)?;
        if table.is_empty() {
            // no usable face installed
            return Ok(text.chars().count() as f32 * font_height);
        }
        Ok(table.width(text, font_height))
    }
}
