//! Swap Orchestrator - RPC endpoint health daemon
//!
//! Builds a failover client for every enabled EVM chain and probes them
//! periodically, exporting health and endpoint metrics.

use anyhow::Result;
use std::time::Duration;
use tokio::signal;
use tracing::{debug, error, info, warn};

use swap_orchestrator::chain::ChainClientRegistry;
use swap_orchestrator::config::{ChainFamily, Settings};
use swap_orchestrator::{metrics, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging
    telemetry::init_logging(&settings.logging);

    info!("Starting Swap Orchestrator v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Loaded configuration for {} chains",
        settings.enabled_chains().len()
    );

    let registry = ChainClientRegistry::from_settings(&settings)?;

    for (name, chain) in settings.enabled_chains() {
        if chain.family != ChainFamily::Evm {
            warn!(
                "Chain {} ({}) is not an EVM chain - no RPC client will be built",
                name, chain.chain_id
            );
            continue;
        }
        match registry.client(chain.chain_id) {
            Ok(client) => info!(
                "Chain {} ({}) ready with {} endpoint(s)",
                name,
                chain.chain_id,
                client.endpoints().len()
            ),
            Err(e) => error!("Failed to build client for chain {}: {}", name, e),
        }
    }

    info!(
        "{} chain client(s) connected",
        registry.connected_chains().len()
    );

    // Health check loop
    let health_handle = tokio::spawn({
        let interval = Duration::from_secs(settings.client.health_check_interval_secs);
        async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let health = registry.health_check().await;
                for (chain_id, healthy) in health {
                    if !healthy {
                        warn!("Chain {} health check failed", chain_id);
                    }
                }
            }
        }
    });

    info!("Swap Orchestrator is running");

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutting down...");
    health_handle.abort();

    debug!("Final metrics:\n{}", metrics::gather_text());
    info!("Swap Orchestrator stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
