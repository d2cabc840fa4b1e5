//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::validate_config;
use crate::error::ConfigError;

/// Read a TOML file into a `ProxyConfig` without validating it.
///
/// Validation is deferred so that command-line overrides can be applied
/// first (see [`finalize`]).
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse TOML text into a `ProxyConfig`.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Validate a fully merged configuration.
pub fn finalize(config: ProxyConfig) -> Result<ProxyConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
