//! Home Care 360 API Gateway Library

pub mod api;
pub mod chat;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod transport;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use registry::{Service, ServiceRegistry};
pub use transport::{TcpClient, TransportError};
