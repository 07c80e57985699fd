//! Metrics collection and exposition.
//!
//! # Metrics
//! - `control_plane_requests_total` (counter): API requests by method, route, status
//! - `control_plane_request_duration_seconds` (histogram): API latency
//! - `control_plane_claims_total` (counter): status guard claims by outcome
//! - `control_plane_rollbacks_total` (counter): claims released after a rejected write
//! - `control_plane_dispatch_total` (counter): executor hand-offs by intent, outcome
//! - `control_plane_reconcile_total` (counter): worker reconciliations by intent, outcome

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

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "control_plane_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "control_plane_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_claim(granted: bool) {
    let outcome = if granted { "granted" } else { "denied" };
    counter!("control_plane_claims_total", "outcome" => outcome).increment(1);
}

pub fn record_rollback() {
    counter!("control_plane_rollbacks_total").increment(1);
}

pub fn record_dispatch(intent: &'static str, ok: bool) {
    let outcome = if ok { "accepted" } else { "failed" };
    counter!("control_plane_dispatch_total", "intent" => intent, "outcome" => outcome).increment(1);
}

pub fn record_reconcile(intent: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("control_plane_reconcile_total", "intent" => intent, "outcome" => outcome).increment(1);
}
