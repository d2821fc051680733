//! Configuration file loading for the CLI
//!
//! Configuration is TOML. The first file found wins: an explicit `--config`
//! path, then `tailrace/config.toml` in the working directory, then the
//! platform configuration directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use tailrace::{
    TailraceError,
    config::AppConfig,
    render::{Renderer, SinkPolicy},
};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for TailraceError {
    fn from(err: ConfigError) -> Self {
        TailraceError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (tailrace/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - A configured color is not a valid CSS color
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TailraceError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("tailrace/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "tailrace", "tailrace") {
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

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, TailraceError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    Ok(config)
}

/// Parses a TOML document and checks the render section the way the
/// renderer will.
fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Renderer::new(config.render().clone(), SinkPolicy::from(config.sink()))
        .map_err(|err| ConfigError::Validation(err.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r##"
            [snap]
            junction_radius = 20.0

            [render]
            selection_color = "#00aaff"
            "##,
        )
        .unwrap();
        assert_eq!(config.snap().junction_radius(), 20.0);
        assert_eq!(config.snap().node_anchor_radius(), 30.0);
        assert!(config.render().selection_color().is_ok());
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let err = parse_config("[render]\nselection_color = \"not-a-color\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_inverted_zoom_range_is_rejected() {
        let err = parse_config("[render]\nmin_zoom = 3.0\nmax_zoom = 2.0\n").unwrap_err();
        assert!(err.to_string().contains("zoom range"));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = parse_config("[render\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[sink]\nenabled = false").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(!config.sink().enabled());
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = load_config(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, TailraceError::Config(_)));
    }
}
