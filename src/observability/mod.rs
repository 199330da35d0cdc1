//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; filter from RUST_LOG with a config fallback
//! - Request IDs are attached at the edge and echoed on responses
//! - Metric updates are cheap enough for the hot path

pub mod logging;
pub mod metrics;
