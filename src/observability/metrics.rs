//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by handler group, status
//! - `gateway_request_duration_seconds` (histogram): latency per group
//! - `gateway_upstream_errors_total` (counter): upstream failures by group, kind
//!
//! Unmatched requests are recorded under the group label `none`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(group: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "group" => group.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "gateway_request_duration_seconds",
        "group" => group.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(group: &str, kind: &'static str) {
    ::metrics::counter!(
        "gateway_upstream_errors_total",
        "group" => group.to_string(),
        "kind" => kind
    )
    .increment(1);
}
