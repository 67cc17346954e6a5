//! Response classification for RPC endpoints
//!
//! Every HTTP response a transport receives is handed to a
//! [`ResponseClassifier`]. The default [`StatusClassifier`] reports non-success
//! statuses through a [`DiagnosticsSink`]: testnet endpoints degrade with a
//! warning, production endpoints are reported as errors so they get fixed.
//! Classification never aborts the in-flight request.

use crate::chain::ChainMetadata;

use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{error, warn};

/// A response observed by a transport
#[derive(Debug, Clone, Copy)]
pub struct EndpointResponse<'a> {
    pub chain_id: u64,
    pub url: &'a str,
    pub status: StatusCode,
    /// Zero-based index of the endpoint in the candidate list
    pub attempt: usize,
}

/// Structured context attached to endpoint diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticContext {
    pub chain_id: u64,
    pub url: String,
    pub status: u16,
}

/// Hook invoked for every response received by a transport
pub trait ResponseClassifier: Send + Sync {
    fn on_response(&self, response: &EndpointResponse<'_>);
}

/// Destination for endpoint diagnostics. Fire-and-forget.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticsSink: Send + Sync {
    fn warn(&self, message: &str, context: &DiagnosticContext);
    fn error(&self, error: &str, context: &DiagnosticContext);
}

/// Diagnostics sink backed by `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn warn(&self, message: &str, context: &DiagnosticContext) {
        warn!(
            chain_id = context.chain_id,
            url = %context.url,
            status = context.status,
            "{}",
            message
        );
    }

    fn error(&self, error: &str, context: &DiagnosticContext) {
        error!(
            chain_id = context.chain_id,
            url = %context.url,
            status = context.status,
            "{}",
            error
        );
    }
}

/// Classifies responses by status code and chain class (testnet vs production)
pub struct StatusClassifier {
    metadata: Arc<dyn ChainMetadata>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl StatusClassifier {
    pub fn new(metadata: Arc<dyn ChainMetadata>, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { metadata, sink }
    }

    /// Classifier that reports through `tracing`
    pub fn with_tracing(metadata: Arc<dyn ChainMetadata>) -> Self {
        Self::new(metadata, Arc::new(TracingDiagnostics))
    }
}

impl ResponseClassifier for StatusClassifier {
    fn on_response(&self, response: &EndpointResponse<'_>) {
        let success = response.status.is_success();
        crate::metrics::record_endpoint_response(response.chain_id, success);
        if success {
            return;
        }

        let context = DiagnosticContext {
            chain_id: response.chain_id,
            url: response.url.to_string(),
            status: response.status.as_u16(),
        };

        if self.metadata.is_testnet(response.chain_id) {
            self.sink
                .warn("Testnet RPC endpoint returned a non-success status", &context);
        } else {
            self.sink.error(
                &format!(
                    "Production RPC endpoint returned status {}; check the endpoint configuration",
                    response.status
                ),
                &context,
            );
        }
    }
}
