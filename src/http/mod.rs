//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request IDs, metrics)
//!     → api/* (route table: decode, build envelope, pick service)
//!     → transport (deliver envelope, await correlated reply)
//!     → error.rs (relay reply, translate transport errors to statuses)
//!     → Send to client
//! ```

pub mod error;
pub mod extract;
pub mod server;

pub use error::{relay, ApiError, ApiResult};
pub use server::{AppState, GatewayServer};
