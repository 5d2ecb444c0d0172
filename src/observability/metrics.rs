//! Metrics collection and exposition.
//!
//! # Metrics
//! - `suggest_requests_total` (counter): upstream responses by mode, status
//! - `suggest_request_duration_seconds` (histogram): request start to body close, by mode
//! - `suggest_upstream_errors_total` (counter): connection-level failures
//! - `suggest_chunks_rewritten_total` (counter): rewritten chunks by strategy
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing when the exporter is off.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::suggest::{RewritePolicy, Strategy};

pub const REQUESTS_TOTAL: &str = "suggest_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "suggest_request_duration_seconds";
pub const UPSTREAM_ERRORS_TOTAL: &str = "suggest_upstream_errors_total";
pub const CHUNKS_REWRITTEN_TOTAL: &str = "suggest_chunks_rewritten_total";

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// `mode` label: which rewrite the request runs under.
pub fn mode_label(policy: RewritePolicy) -> &'static str {
    match policy {
        RewritePolicy::Passthrough => "passthrough",
        RewritePolicy::Xml => "xml",
        RewritePolicy::Json => "json",
    }
}

/// Count an upstream response by status.
pub fn record_upstream_status(policy: RewritePolicy, status: u16) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "mode" => mode_label(policy),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Count a connection-level upstream failure.
pub fn record_upstream_error() {
    metrics::counter!(UPSTREAM_ERRORS_TOTAL).increment(1);
}

/// Count one chunk that went through a rewrite. Passthrough chunks are not counted.
pub fn record_chunk(strategy: Strategy) {
    if strategy == Strategy::Passthrough {
        return;
    }
    metrics::counter!(CHUNKS_REWRITTEN_TOTAL, "strategy" => strategy.as_str()).increment(1);
}

/// Record the lifetime of a request whose body finished, was abandoned, or never started.
pub fn record_request_duration(policy: RewritePolicy, started: Instant) {
    metrics::histogram!(REQUEST_DURATION_SECONDS, "mode" => mode_label(policy))
        .record(started.elapsed().as_secs_f64());
}
