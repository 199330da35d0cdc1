//! Configuration loading from the process environment.
//!
//! Every setting has a static fallback so the gateway starts with an empty
//! environment in local development. Variable names follow the deployment
//! contract the backend services already use (`USER_HOST`, `USER_TCP_PORT`,
//! `ADMIN_POD_HOST`, ...).

use std::env;
use std::str::FromStr;

use crate::config::schema::{EndpointConfig, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// An environment variable was present but unparseable.
    Var { name: String, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Var { name, reason } => {
                write!(f, "invalid environment variable {}: {}", name, reason)
            }
            ConfigError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl GatewayConfig {
    /// Build and validate a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = GatewayConfig::default();

        if let Some(port) = parse_var::<u16>("GATEWAY_HTTP_PORT")? {
            config.listener.bind_address = format!("0.0.0.0:{}", port);
        }
        if let Some(secs) = parse_var("GATEWAY_REQUEST_TIMEOUT_SECS")? {
            config.listener.request_timeout_secs = secs;
        }

        load_endpoint(&mut config.services.auth, "AUTH_HOST", "TCP_PORT")?;
        load_endpoint(&mut config.services.user, "USER_HOST", "USER_TCP_PORT")?;
        load_endpoint(&mut config.services.staff, "STAFF_HOST", "STAFF_TCP_PORT")?;
        load_endpoint(&mut config.services.admin, "ADMIN_POD_HOST", "ADMIN_POD_TCP_PORT")?;
        load_endpoint(&mut config.services.payment, "PAYMENT_HOST", "PAYMENT_TCP_PORT")?;
        load_endpoint(&mut config.services.booking, "BOOKING_HOST", "BOOKING_TCP_PORT")?;
        load_endpoint(&mut config.services.provider, "PROVIDER_HOST", "PROVIDER_TCP_PORT")?;

        if let Some(secs) = parse_var("RPC_REQUEST_TIMEOUT_SECS")? {
            config.transport.request_timeout_secs = secs;
        }
        if let Some(secs) = parse_var("RPC_CONNECT_TIMEOUT_SECS")? {
            config.transport.connect_timeout_secs = secs;
        }
        if let Some(attempts) = parse_var("RPC_MAX_CONNECT_ATTEMPTS")? {
            config.transport.max_connect_attempts = attempts;
        }

        if let Some(secret) = string_var("ACCESS_TOKEN_SECRET") {
            config.auth.access_token_secret = secret;
        }
        if let Some(key) = string_var("PAYMENT_API_KEY") {
            config.auth.payment_api_key = key;
        }

        if let Some(addr) = string_var("METRICS_ADDRESS") {
            config.observability.metrics_address = addr;
        }
        if let Some(enabled) = parse_var("METRICS_ENABLED")? {
            config.observability.metrics_enabled = enabled;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }
}

fn load_endpoint(
    endpoint: &mut EndpointConfig,
    host_var: &str,
    port_var: &str,
) -> Result<(), ConfigError> {
    if let Some(host) = string_var(host_var) {
        endpoint.host = host;
    }
    if let Some(port) = parse_var::<u16>(port_var)? {
        endpoint.port = port;
    }
    Ok(())
}

/// Read a variable as a string; unset and empty both mean "use the default".
fn string_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse a variable, distinguishing "unset" from "unparseable".
fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match string_var(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| ConfigError::Var {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses variable names unique to it where mutation is needed,
    // since the environment is process-global across the test binary.

    #[test]
    fn defaults_without_environment() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.services.user.address(), "localhost:4000");
        assert_eq!(config.services.admin.address(), "localhost:4003");
        assert_eq!(config.transport.request_timeout_secs, 30);
    }

    #[test]
    fn endpoint_overrides_apply() {
        std::env::set_var("LOADER_TEST_HOST", "user-svc.internal");
        std::env::set_var("LOADER_TEST_PORT", "4100");

        let mut endpoint = EndpointConfig::new("localhost", 4000);
        load_endpoint(&mut endpoint, "LOADER_TEST_HOST", "LOADER_TEST_PORT").unwrap();

        assert_eq!(endpoint.address(), "user-svc.internal:4100");
    }

    #[test]
    fn unparseable_port_is_an_error() {
        std::env::set_var("LOADER_TEST_BAD_PORT", "not-a-port");

        let mut endpoint = EndpointConfig::new("localhost", 4000);
        let err = load_endpoint(&mut endpoint, "LOADER_TEST_BAD_HOST", "LOADER_TEST_BAD_PORT")
            .unwrap_err();

        assert!(err.to_string().contains("LOADER_TEST_BAD_PORT"));
    }

    #[test]
    fn empty_value_falls_back_to_default() {
        std::env::set_var("LOADER_TEST_EMPTY", "   ");
        assert!(string_var("LOADER_TEST_EMPTY").is_none());
    }
}
