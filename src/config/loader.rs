//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{EngineConfig, EngineSettings, RouteFile};
use crate::config::validation::{validate_collections, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Relative `settings.route_files` entries are resolved against the
/// directory holding `path`.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = read(path)?;
    let mut config: EngineConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for file in &mut config.settings.route_files {
        if file.is_relative() {
            *file = base.join(&*file);
        }
    }

    tracing::info!(
        path = %path.display(),
        collections = config.collections.len(),
        route_files = config.settings.route_files.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Load and validate a route file under the given engine settings.
pub fn load_route_file(path: &Path, settings: &EngineSettings) -> Result<RouteFile, ConfigError> {
    let content = read(path)?;
    let file: RouteFile = toml::from_str(&content)?;

    validate_collections(&file.collections, settings).map_err(ConfigError::Validation)?;

    tracing::debug!(
        path = %path.display(),
        collections = file.collections.len(),
        "Route file loaded"
    );
    Ok(file)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
