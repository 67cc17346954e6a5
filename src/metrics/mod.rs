//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - RPC endpoint responses and failovers
//! - Chain client health
//! - Swap submissions and precondition failures
//!
//! Metrics are registered in the default registry; exporting them is left to
//! the embedding application via [`gather_text`].

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge_vec, CounterVec, Encoder, GaugeVec, TextEncoder};

lazy_static! {
    // Transport metrics
    pub static ref ENDPOINT_RESPONSES: CounterVec = register_counter_vec!(
        "swap_orchestrator_endpoint_responses_total",
        "RPC endpoint responses by outcome",
        &["chain_id", "outcome"]
    ).unwrap();

    pub static ref ENDPOINT_FAILOVERS: CounterVec = register_counter_vec!(
        "swap_orchestrator_endpoint_failovers_total",
        "Requests that moved on to the next RPC endpoint",
        &["chain_id"]
    ).unwrap();

    pub static ref TRANSPORT_EXHAUSTED: CounterVec = register_counter_vec!(
        "swap_orchestrator_transport_exhausted_total",
        "Requests for which every RPC endpoint failed",
        &["chain_id"]
    ).unwrap();

    // Chain metrics
    pub static ref CHAIN_HEALTHY: GaugeVec = register_gauge_vec!(
        "swap_orchestrator_chain_healthy",
        "Chain client health (1=healthy, 0=unhealthy)",
        &["chain_id"]
    ).unwrap();

    // Swap metrics
    pub static ref SWAPS_SUBMITTED: CounterVec = register_counter_vec!(
        "swap_orchestrator_swaps_submitted_total",
        "Swaps submitted by route",
        &["chain_id", "route"]
    ).unwrap();

    pub static ref SWAPS_REJECTED: CounterVec = register_counter_vec!(
        "swap_orchestrator_swaps_rejected_total",
        "Swap submissions that failed, by error kind",
        &["kind"]
    ).unwrap();
}

/// Encode all registered metrics in the Prometheus text format
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

// Helper functions to record metrics

pub fn record_endpoint_response(chain_id: u64, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ENDPOINT_RESPONSES
        .with_label_values(&[&chain_id.to_string(), outcome])
        .inc();
}

pub fn record_endpoint_failover(chain_id: u64) {
    ENDPOINT_FAILOVERS
        .with_label_values(&[&chain_id.to_string()])
        .inc();
}

pub fn record_transport_exhausted(chain_id: u64) {
    TRANSPORT_EXHAUSTED
        .with_label_values(&[&chain_id.to_string()])
        .inc();
}

pub fn record_chain_health(chain_id: u64, healthy: bool) {
    CHAIN_HEALTHY
        .with_label_values(&[&chain_id.to_string()])
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_swap_submitted(chain_id: u64, route: &str) {
    SWAPS_SUBMITTED
        .with_label_values(&[&chain_id.to_string(), route])
        .inc();
}

pub fn record_swap_rejected(kind: &str) {
    SWAPS_REJECTED.with_label_values(&[kind]).inc();
}
