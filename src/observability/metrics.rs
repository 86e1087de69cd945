//! Metrics collection and exposition.
//!
//! # Metrics
//! - `algo_pay_submissions_total` (counter): submissions by outcome
//! - `algo_pay_polls_total` (counter): status polls by classification
//! - `algo_pay_gateway_failures_total` (counter): failures by error kind
//! - `algo_pay_node_health` (gauge): 1=healthy, 0=unhealthy

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::error::ErrorKind;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(outcome: &'static str) {
    metrics::counter!("algo_pay_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_poll(status: &'static str) {
    metrics::counter!("algo_pay_polls_total", "status" => status).increment(1);
}

pub fn record_failure(kind: ErrorKind) {
    metrics::counter!("algo_pay_gateway_failures_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_node_health(healthy: bool) {
    metrics::gauge!("algo_pay_node_health").set(if healthy { 1.0 } else { 0.0 });
}
