//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lobby_candidates` (gauge): registered lobby candidates
//! - `lobby_candidate_health` (gauge): 1=healthy, 0=unhealthy, per candidate
//! - `lobby_admission_terminations_total` (counter): sessions cut by the flood cap
//! - `lobby_cooldown_denials_total` (counter): denied uses, per feature
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_candidate_count(count: usize) {
    metrics::gauge!("lobby_candidates").set(count as f64);
}

pub fn record_candidate_health(candidate: &str, healthy: bool) {
    metrics::gauge!("lobby_candidate_health", "candidate" => candidate.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_admission_termination() {
    metrics::counter!("lobby_admission_terminations_total").increment(1);
}

pub fn record_cooldown_denial(feature: &'static str) {
    metrics::counter!("lobby_cooldown_denials_total", "feature" => feature).increment(1);
}
