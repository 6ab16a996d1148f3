//! Metrics collection and exposition.
//!
//! # Metrics
//! - `explorer_provider_requests_total` (counter): provider calls by provider, outcome
//! - `explorer_provider_request_duration_seconds` (histogram): provider latency
//! - `explorer_lookups_total` (counter): finished lookups by outcome

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::providers::ProviderKind;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_provider_request(provider: ProviderKind, outcome: &'static str) {
    counter!(
        "explorer_provider_requests_total",
        "provider" => provider.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_provider_latency(provider: ProviderKind, elapsed: Duration) {
    histogram!(
        "explorer_provider_request_duration_seconds",
        "provider" => provider.as_str()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_lookup(outcome: &'static str) {
    counter!("explorer_lookups_total", "outcome" => outcome).increment(1);
}
