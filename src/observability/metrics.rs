//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `error_renderer_renders_total` (counter): render attempts by strategy, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is optional and owns its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished gateway request.
pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    let endpoint = endpoint.to_string();
    let status = status.to_string();
    counter!(
        "gateway_requests_total",
        "endpoint" => endpoint.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "endpoint" => endpoint,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one attempt to render an error.
pub fn record_render(strategy: &'static str, outcome: &'static str) {
    counter!(
        "error_renderer_renders_total",
        "strategy" => strategy,
        "outcome" => outcome
    )
    .increment(1);
}
