//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): HTTP requests by method, path, status
//! - `gateway_request_duration_seconds` (histogram): HTTP latency by path
//! - `gateway_rpc_total` (counter): backend calls by service and outcome
//! - `gateway_rpc_duration_seconds` (histogram): backend call latency
//! - `gateway_backend_connected` (gauge): 1=connected, 0=not, per service
//! - `gateway_pending_requests` (gauge): in-flight backend calls per service

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed HTTP request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "path" => path.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one completed backend call.
pub fn record_rpc(service: &'static str, outcome: &'static str, start: Instant) {
    counter!(
        "gateway_rpc_total",
        "service" => service,
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "gateway_rpc_duration_seconds",
        "service" => service
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a backend connection state transition.
pub fn record_connection_state(service: &'static str, connected: bool) {
    gauge!("gateway_backend_connected", "service" => service)
        .set(if connected { 1.0 } else { 0.0 });
}

/// Record the in-flight request count for a backend.
pub fn record_pending_requests(service: &'static str, count: usize) {
    gauge!("gateway_pending_requests", "service" => service).set(count as f64);
}
