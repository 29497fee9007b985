//! Configuration types for Plotweave rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources; every field is optional and falls back to the value
//! of the type's [`Default`] implementation.
//!
//! - [`AppConfig`] - top-level configuration combining the sections below.
//! - [`DiagramConfig`] - margins, spacing, background and font of a diagram.
//! - [`DensityConfig`] - kernel and lattice settings for density maps.
//!
//! # Example
//!
//! ```
//! # use plotweave::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.diagram().spacing(), 20.0);
//! assert!(config.density().kernel().is_ok());
//! ```

use serde::Deserialize;

use plotweave_core::{color::Color, draw::FontAttributes, geometry::Insets};

use crate::{density::Kernel, error::{PlotweaveError, Result}};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    diagram: DiagramConfig,

    #[serde(default)]
    density: DensityConfig,
}

impl AppConfig {
    pub fn new(diagram: DiagramConfig, density: DensityConfig) -> Self {
        Self { diagram, density }
    }

    pub fn diagram(&self) -> &DiagramConfig {
        &self.diagram
    }

    pub fn density(&self) -> &DensityConfig {
        &self.density
    }
}

/// Page-level layout and style.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    margin_top: f32,
    margin_right: f32,
    margin_bottom: f32,
    margin_left: f32,
    spacing: f32,
    /// Background colour as a colour string
    background_color: Option<String>,
    font_family: String,
    footer: bool,
}

impl DiagramConfig {
    pub fn margins(&self) -> Insets {
        Insets::new(
            self.margin_top,
            self.margin_right,
            self.margin_bottom,
            self.margin_left,
        )
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Returns the parsed background [`Color`], or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the colour string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>> {
        self.background_color
            .as_deref()
            .map(Color::new)
            .transpose()
            .map_err(|err| PlotweaveError::config(format!("invalid background color: {err}")))
    }

    pub fn font(&self) -> FontAttributes {
        FontAttributes::new(self.font_family.as_str())
    }

    /// Whether renders carry the generator footer
    pub fn footer(&self) -> bool {
        self.footer
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            margin_top: 50.0,
            margin_right: 50.0,
            margin_bottom: 50.0,
            margin_left: 50.0,
            spacing: 20.0,
            background_color: None,
            font_family: "sans-serif".to_string(),
            footer: true,
        }
    }
}

/// Settings for kernel density maps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    kernel: String,
    /// Kernel bandwidth in metres
    bandwidth: f64,
    samples_across: usize,
    map_width: f32,
    /// Fraction of the point spread added around the points
    bounds_margin: f64,
}

impl DensityConfig {
    /// Builds the configured kernel.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown kernel names or a non
    /// positive bandwidth.
    pub fn kernel(&self) -> Result<Kernel> {
        Kernel::from_name(&self.kernel, self.bandwidth)
    }

    pub fn samples_across(&self) -> usize {
        self.samples_across
    }

    pub fn map_width(&self) -> f32 {
        self.map_width
    }

    pub fn bounds_margin(&self) -> f64 {
        self.bounds_margin
    }
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            kernel: "gaussian".to_string(),
            bandwidth: 1000.0,
            samples_across: 20,
            map_width: 768.0,
            bounds_margin: 0.05,
        }
    }
}
