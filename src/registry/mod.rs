//! Backend registry: logical service name → transport client.
//!
//! # Responsibilities
//! - Build one raw TCP client per backend at startup
//! - Resolve a logical service to its client for the route handlers
//!
//! # Design Decisions
//! - Built once in `main` and shared via axum state; no ambient globals
//! - `Service` is a closed enum, so an unconfigured service is
//!   unrepresentable; misconfiguration surfaces at startup, not per request
//! - Membership is immutable; reconnection replaces sockets, never entries

use crate::config::GatewayConfig;
use crate::lifecycle::Shutdown;
use crate::transport::TcpClient;

/// Logical backend services the gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Auth,
    User,
    Staff,
    Admin,
    Payment,
    Booking,
    Provider,
}

impl Service {
    pub const ALL: [Service; 7] = [
        Service::Auth,
        Service::User,
        Service::Staff,
        Service::Admin,
        Service::Payment,
        Service::Booking,
        Service::Provider,
    ];

    /// Stable label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Service::Auth => "auth-service",
            Service::User => "user-service",
            Service::Staff => "staff-service",
            Service::Admin => "admin-service",
            Service::Payment => "payment-service",
            Service::Booking => "booking-service",
            Service::Provider => "provider-service",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Startup-populated map from service to its transport client.
pub struct ServiceRegistry {
    auth: TcpClient,
    user: TcpClient,
    staff: TcpClient,
    admin: TcpClient,
    payment: TcpClient,
    booking: TcpClient,
    provider: TcpClient,
}

impl ServiceRegistry {
    /// Build every client from validated configuration.
    ///
    /// Each client subscribes to the shutdown coordinator so outstanding
    /// requests are failed, not abandoned, when the process exits.
    pub fn from_config(config: &GatewayConfig, shutdown: &Shutdown) -> Self {
        let make = |service: Service, endpoint: &crate::config::EndpointConfig| {
            TcpClient::new(
                service.label(),
                endpoint.address(),
                config.transport.clone(),
                shutdown.subscribe(),
            )
        };

        Self {
            auth: make(Service::Auth, &config.services.auth),
            user: make(Service::User, &config.services.user),
            staff: make(Service::Staff, &config.services.staff),
            admin: make(Service::Admin, &config.services.admin),
            payment: make(Service::Payment, &config.services.payment),
            booking: make(Service::Booking, &config.services.booking),
            provider: make(Service::Provider, &config.services.provider),
        }
    }

    /// Look up the client for a service. Total by construction.
    pub fn client(&self, service: Service) -> &TcpClient {
        match service {
            Service::Auth => &self.auth,
            Service::User => &self.user,
            Service::Staff => &self.staff,
            Service::Admin => &self.admin,
            Service::Payment => &self.payment,
            Service::Booking => &self.booking,
            Service::Provider => &self.provider,
        }
    }

    /// All clients, for metrics sweeps and shutdown diagnostics.
    pub fn clients(&self) -> impl Iterator<Item = &TcpClient> {
        [
            &self.auth,
            &self.user,
            &self.staff,
            &self.admin,
            &self.payment,
            &self.booking,
            &self.provider,
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = Service::ALL.iter().map(|s| s.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Service::ALL.len());
    }

    #[tokio::test]
    async fn registry_resolves_every_service() {
        let config = GatewayConfig::default();
        let shutdown = Shutdown::new();
        let registry = ServiceRegistry::from_config(&config, &shutdown);

        for service in Service::ALL {
            assert_eq!(registry.client(service).service(), service.label());
        }
        assert_eq!(registry.clients().count(), Service::ALL.len());
    }
}
