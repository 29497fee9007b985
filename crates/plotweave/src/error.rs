//! Error types for Plotweave operations.
//!
//! [`PlotweaveError`] separates the failure kinds callers react to
//! differently: bad configuration (fix the input), layout inconsistencies
//! (a programming error in element code), and failures of external
//! collaborators such as font or geocoding services.

use std::io;

use thiserror::Error;

use plotweave_core::fonts::FontError;

/// Layout protocol violations.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("{element} was drawn before it was built")]
    NotBuilt { element: &'static str },

    #[error("unknown output format `{0}`, expected svg or html")]
    UnknownFormat(String),

    #[error("{open} drawing group(s) left open at the end of the render")]
    UnbalancedGroups { open: usize },

    #[error("close_group called without a matching open_group")]
    NoOpenGroup,
}

/// The main error type for Plotweave operations.
#[derive(Debug, Error)]
pub enum PlotweaveError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("{service} failed: {message}")]
    External {
        service: &'static str,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PlotweaveError {
    /// Shorthand for a [`PlotweaveError::Config`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for errors caused by invalid configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<FontError> for PlotweaveError {
    fn from(err: FontError) -> Self {
        Self::External {
            service: "font metrics",
            message: err.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = PlotweaveError> = std::result::Result<T, E>;
