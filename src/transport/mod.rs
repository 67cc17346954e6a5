//! RPC transport layer
//!
//! This module provides:
//! - Endpoint candidate resolution from prioritized URL tiers
//! - A JSON-RPC transport with ordered endpoint failover
//! - Per-response classification with testnet/production diagnostics

pub mod classify;
pub mod failover;
pub mod resolver;

#[cfg(test)]
pub use classify::MockDiagnosticsSink;
pub use classify::{
    DiagnosticContext, DiagnosticsSink, EndpointResponse, ResponseClassifier, StatusClassifier,
    TracingDiagnostics,
};
pub use failover::{BatchCall, FailoverTransport};
pub use resolver::resolve_endpoints;
