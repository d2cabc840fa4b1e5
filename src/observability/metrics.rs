//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status
//! - `proxy_request_duration_seconds` (histogram): latency by method
//! - `proxy_upstream_errors_total` (counter): forwarding failures by kind
//!
//! Without an installed recorder the macros are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a forwarding failure.
pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("proxy_upstream_errors_total", "kind" => kind).increment(1);
}
