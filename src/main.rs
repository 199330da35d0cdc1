//! Home Care 360 API Gateway
//!
//! An API gateway for a multi-tenant home-services marketplace, built with
//! Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                   API GATEWAY                     │
//!                    │                                                   │
//!   Client Request   │  ┌────────┐   ┌───────────┐   ┌──────────────┐   │
//!   ─────────────────┼─▶│  http  │──▶│ api route │──▶│   registry   │   │
//!                    │  │ server │   │  tables   │   │ (per-service │   │
//!                    │  └────────┘   └───────────┘   │  TCP client) │   │
//!                    │                               └──────┬───────┘   │
//!                    │                                      │           │
//!   Client Response  │  ┌────────┐   ┌───────────┐   ┌──────▼───────┐   │
//!   ◀────────────────┼──│ relay/ │◀──│ transport │◀──│  backend     │◀──┼── Backend
//!                    │  │ errors │   │  client   │   │  connection  │   │   Service
//!                    │  └────────┘   └───────────┘   └──────────────┘   │
//!                    │                                                   │
//!                    │  ┌─────────────────────────────────────────────┐ │
//!                    │  │           Cross-Cutting Concerns            │ │
//!                    │  │  config · observability · lifecycle · chat  │ │
//!                    │  └─────────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;

use care_gateway::config::GatewayConfig;
use care_gateway::http::GatewayServer;
use care_gateway::lifecycle::{signals, Shutdown};
use care_gateway::observability::{logging, metrics};
use care_gateway::registry::ServiceRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (environment with static fallbacks)
    let config = GatewayConfig::from_env()?;

    logging::init(&config.observability);

    tracing::info!("care-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        rpc_timeout_secs = config.transport.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address validity was checked at load time.
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Shutdown coordination: SIGINT → broadcast → server + transport tasks
    let shutdown = Shutdown::new();
    signals::spawn(shutdown.clone());

    // One raw TCP client per backend, connected eagerly
    let registry = ServiceRegistry::from_config(&config, &shutdown);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = GatewayServer::new(config, registry);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
