//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::forwarder::UpstreamAddr;

/// A single failed check, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every semantic constraint and collect all failures.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.address.is_empty() {
        errors.push(ValidationError::new("upstream.address", "upstream cannot be empty"));
    } else if let Err(e) = UpstreamAddr::parse(&config.upstream.address) {
        errors.push(ValidationError::new("upstream.address", e.to_string()));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a valid socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }

    let durations = [
        ("upstream.timeout_secs", config.upstream.timeout_secs),
        ("timeouts.read_secs", config.timeouts.read_secs),
        ("timeouts.write_secs", config.timeouts.write_secs),
        ("timeouts.shutdown_grace_secs", config.timeouts.shutdown_grace_secs),
    ];
    for (field, secs) in durations {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    if !config.welcome.path_prefix.starts_with('/') {
        errors.push(ValidationError::new("welcome.path_prefix", "must start with '/'"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a valid socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.upstream.address = "10.0.0.5".into();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_empty_upstream() {
        let errors = validate_config(&ProxyConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "upstream.address");
        assert_eq!(errors[0].message, "upstream cannot be empty");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.upstream.address = "::1".into();
        config.listener.bind_address = "nope".into();
        config.timeouts.read_secs = 0;
        config.welcome.path_prefix = "newf".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "upstream.address",
                "listener.bind_address",
                "timeouts.read_secs",
                "welcome.path_prefix",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
