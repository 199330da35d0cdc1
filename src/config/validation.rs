//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (the loader handles syntactic)
//! - Check every backend endpoint is usable before any client is built
//! - Validate value ranges (timeouts > 0, queue depths > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - A missing or unusable service endpoint fails startup, never a request

use std::net::SocketAddr;

use crate::config::schema::{EndpointConfig, GatewayConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the full configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".into(),
            message: format!("not a socket address: {:?}", config.listener.bind_address),
        });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "listener.request_timeout_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    let services = &config.services;
    for (name, endpoint) in [
        ("auth", &services.auth),
        ("user", &services.user),
        ("staff", &services.staff),
        ("admin", &services.admin),
        ("payment", &services.payment),
        ("booking", &services.booking),
        ("provider", &services.provider),
    ] {
        check_endpoint(name, endpoint, &mut errors);
    }

    let transport = &config.transport;
    if transport.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "transport.request_timeout_secs".into(),
            message: "must be greater than zero".into(),
        });
    }
    if transport.connect_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "transport.connect_timeout_secs".into(),
            message: "must be greater than zero".into(),
        });
    }
    if transport.max_connect_attempts == 0 {
        errors.push(ValidationError {
            field: "transport.max_connect_attempts".into(),
            message: "must be greater than zero".into(),
        });
    }
    if transport.max_frame_bytes < 1024 {
        errors.push(ValidationError {
            field: "transport.max_frame_bytes".into(),
            message: "must be at least 1024".into(),
        });
    }
    if transport.outbound_queue == 0 {
        errors.push(ValidationError {
            field: "transport.outbound_queue".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address".into(),
            message: format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(name: &str, endpoint: &EndpointConfig, errors: &mut Vec<ValidationError>) {
    if endpoint.host.trim().is_empty() {
        errors.push(ValidationError {
            field: format!("services.{}.host", name),
            message: "must not be empty".into(),
        });
    }
    if endpoint.port == 0 {
        errors.push(ValidationError {
            field: format!("services.{}.port", name),
            message: "must be greater than zero".into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nonsense".into();
        config.services.user.host = "".into();
        config.services.payment.port = 0;
        config.transport.outbound_queue = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"services.user.host"));
        assert!(fields.contains(&"services.payment.port"));
        assert!(fields.contains(&"transport.outbound_queue"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_err());

        config.observability.metrics_enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
