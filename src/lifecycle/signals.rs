//! OS signal handling.
//!
//! SIGINT (Ctrl+C) triggers graceful shutdown. The translation from signal
//! to internal event happens here so the rest of the gateway only knows
//! about the [`Shutdown`] broadcast.

use crate::lifecycle::Shutdown;

/// Spawn the signal watcher.
pub fn spawn(shutdown: Shutdown) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    });
}
