//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check endpoint URLs parse and carry a scheme the client speaks
//! - Validate value ranges (timeouts > 0, ports valid, polling bounds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "endpoint.node_url", &config.endpoint.node_url);
    if !config.endpoint.indexer_url.is_empty() {
        check_url(&mut errors, "endpoint.indexer_url", &config.endpoint.indexer_url);
    }
    check_url(&mut errors, "wallet.bridge_url", &config.wallet.bridge_url);

    if config.endpoint.port == Some(0) {
        errors.push(ValidationError {
            field: "endpoint.port",
            message: "port must be non-zero".to_string(),
        });
    }
    if config.endpoint.api_key_header.trim().is_empty() {
        errors.push(ValidationError {
            field: "endpoint.api_key_header",
            message: "header name must not be empty".to_string(),
        });
    }
    if config.endpoint.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "endpoint.request_timeout_secs",
            message: "timeout must be greater than zero".to_string(),
        });
    }
    if config.wallet.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "wallet.request_timeout_secs",
            message: "timeout must be greater than zero".to_string(),
        });
    }
    if config.wallet.ledger.trim().is_empty() {
        errors.push(ValidationError {
            field: "wallet.ledger",
            message: "ledger name must not be empty".to_string(),
        });
    }

    let polling = &config.polling;
    if polling.interval_ms == 0 {
        errors.push(ValidationError {
            field: "polling.interval_ms",
            message: "interval must be greater than zero".to_string(),
        });
    }
    if polling.max_interval_ms < polling.interval_ms {
        errors.push(ValidationError {
            field: "polling.max_interval_ms",
            message: format!(
                "max interval {}ms is below interval {}ms",
                polling.max_interval_ms, polling.interval_ms
            ),
        });
    }
    if polling.max_attempts == 0 {
        errors.push(ValidationError {
            field: "polling.max_attempts",
            message: "at least one poll is required".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field,
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field,
            message: format!("invalid URL '{}': {}", value, e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.endpoint.node_url = "nope".to_string();
        config.endpoint.port = Some(0);
        config.wallet.bridge_url = "ftp://127.0.0.1".to_string();
        config.polling.max_attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "endpoint.node_url",
                "wallet.bridge_url",
                "endpoint.port",
                "polling.max_attempts"
            ]
        );
    }

    #[test]
    fn test_polling_bounds() {
        let mut config = AppConfig::default();
        config.polling.interval_ms = 5000;
        config.polling.max_interval_ms = 1000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("below interval"));
    }
}
