//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits so they can be logged and round-tripped in
//! tests; values are sourced from the environment by `loader.rs`.

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener configuration.
    pub listener: ListenerConfig,

    /// Backend service endpoints.
    pub services: ServicesConfig,

    /// Raw TCP transport tuning.
    pub transport: TransportConfig,

    /// Token and API key settings.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Host and port of a single backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// "host:port" form used for socket connects.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Endpoints for every backend service the gateway fronts.
///
/// Membership is fixed; there is no dynamic registration at runtime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub auth: EndpointConfig,
    pub user: EndpointConfig,
    pub staff: EndpointConfig,
    pub admin: EndpointConfig,
    pub payment: EndpointConfig,
    pub booking: EndpointConfig,
    pub provider: EndpointConfig,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            auth: EndpointConfig::new("localhost", 3002),
            user: EndpointConfig::new("localhost", 4000),
            staff: EndpointConfig::new("localhost", 4002),
            admin: EndpointConfig::new("localhost", 4003),
            payment: EndpointConfig::new("localhost", 4001),
            booking: EndpointConfig::new("localhost", 3012),
            provider: EndpointConfig::new("localhost", 3008),
        }
    }
}

/// Tuning for the raw TCP request/response transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Deadline for one request/response exchange in seconds.
    pub request_timeout_secs: u64,

    /// Socket connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Connect attempts per reconnection cycle.
    pub max_connect_attempts: u32,

    /// Base delay for reconnect backoff in milliseconds.
    pub reconnect_base_delay_ms: u64,

    /// Cap for reconnect backoff in milliseconds.
    pub reconnect_max_delay_ms: u64,

    /// Largest frame accepted on the wire, in bytes.
    pub max_frame_bytes: usize,

    /// Outbound queue depth per connection (sends queued while connecting).
    pub outbound_queue: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
            max_connect_attempts: 5,
            reconnect_base_delay_ms: 100,
            reconnect_max_delay_ms: 5_000,
            max_frame_bytes: 4 * 1024 * 1024,
            outbound_queue: 1_024,
        }
    }
}

/// Token and API key settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for access token verification.
    pub access_token_secret: String,

    /// Static key expected on payment provider callbacks.
    pub payment_api_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: placeholders! Set the environment in production.
            access_token_secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
            payment_api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Fallback log filter when RUST_LOG is unset.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "care_gateway=debug,tower_http=info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
