//! Transport error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::transport::frame::WireError;

/// Failure modes of one `send()` call.
///
/// Every outstanding request resolves with exactly one value or exactly one
/// of these errors; the transport never leaves a caller hanging.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The socket could not be established or dropped mid-call.
    #[error("connection error: {0}")]
    Connection(String),

    /// No reply arrived within the configured deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The reply could not be interpreted as a valid frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The backend explicitly reported failure; payload passed through.
    #[error("backend error: {0}")]
    Remote(WireError),
}

impl TransportError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Connection(_) => "connection",
            TransportError::Timeout(_) => "timeout",
            TransportError::Protocol(_) => "protocol",
            TransportError::Remote(_) => "remote",
        }
    }
}
