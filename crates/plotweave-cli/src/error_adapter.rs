//! Error adapter for converting PlotweaveError to miette diagnostics.
//!
//! Bridges the library's error type and miette's report formatting used
//! by the CLI binary.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use plotweave::{LayoutError, PlotweaveError};

/// Adapter giving a [`PlotweaveError`] a diagnostic code and help text.
pub struct ErrorAdapter<'a>(pub &'a PlotweaveError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            PlotweaveError::Config(_) => "plotweave::config",
            PlotweaveError::Layout(_) => "plotweave::layout",
            PlotweaveError::External { .. } => "plotweave::external",
            PlotweaveError::Io(_) => "plotweave::io",
            PlotweaveError::Serialize(_) => "plotweave::serialize",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            PlotweaveError::Config(_) => "check the configuration file and the input points",
            PlotweaveError::Layout(LayoutError::UnknownFormat(_)) => {
                "pass --format svg or --format html"
            }
            PlotweaveError::Serialize(_) => {
                "the input must be a JSON array of [lon, lat] pairs, e.g. [[2.35, 48.85]]"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_has_code_and_help() {
        let err = PlotweaveError::config("bad kernel");
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.to_string(), "Configuration error: bad kernel");
        assert_eq!(adapter.code().unwrap().to_string(), "plotweave::config");
        assert!(adapter.help().is_some());
    }

    #[test]
    fn test_unknown_format_help() {
        let err = PlotweaveError::from(LayoutError::UnknownFormat("pdf".to_string()));
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "plotweave::layout");
        assert!(adapter.help().unwrap().to_string().contains("--format"));
    }

    #[test]
    fn test_io_error_has_no_help() {
        let err = PlotweaveError::from(std::io::Error::other("disk full"));
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "plotweave::io");
        assert!(adapter.help().is_none());
    }
}
