//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `endpoint.api_key`.
pub const API_KEY_ENV_VAR: &str = "ALGO_PAY_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, std::env::var(API_KEY_ENV_VAR).ok())
}

/// Parse, apply the API key override, then validate.
pub fn parse_config(content: &str, api_key_override: Option<String>) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = toml::from_str(content)?;

    if let Some(key) = api_key_override.filter(|k| !k.is_empty()) {
        config.endpoint.api_key = key;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
