//! Configuration file loading for the CLI
//!
//! Finds and loads TOML configuration files from an explicit path, the
//! local directory or the platform configuration directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use plotweave::{PlotweaveError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for PlotweaveError {
    fn from(err: ConfigError) -> Self {
        PlotweaveError::config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (plotweave/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, PlotweaveError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("plotweave/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "plotweave", "plotweave") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, PlotweaveError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses TOML configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, PlotweaveError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    // Surface bad values before any rendering work starts
    config.diagram().background_color()?;
    config.density().kernel()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            [diagram]
            spacing = 8.0

            [density]
            kernel = "uniform"
            "#,
        )
        .unwrap();
        assert_eq!(config.diagram().spacing(), 8.0);
        assert_eq!(config.density().samples_across(), 20);
        assert_eq!(config.density().kernel().unwrap().name(), "uniform");
    }

    #[test]
    fn test_unknown_kernel_is_config_error() {
        let err = parse_config("[density]\nkernel = \"triangle\"\n").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = parse_config("[diagram\nspacing = 1").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("/nonexistent/plotweave.toml")).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"));
    }
}
