//! Configuration management for the swap orchestrator
//!
//! Loads configuration from TOML files with environment variable substitution,
//! so RPC API keys can stay in the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Polling interval applied to every chain client
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 12_000;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub chains: HashMap<String, ChainConfig>,
}

/// Client settings. The polling interval is fixed and not configurable.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub batch: BatchConfig,
    /// Seconds between endpoint health probes in the daemon
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
}

impl ClientConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            batch: BatchConfig::default(),
            health_check_interval_secs: default_health_check_interval_secs(),
        }
    }
}

/// Batched-call aggregation settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BatchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_batch_size: default_max_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    #[serde(default)]
    pub family: ChainFamily,
    #[serde(default)]
    pub testnet: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub rpc: EndpointTiers,
}

/// Execution-environment family of a chain
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    #[default]
    Evm,
    Svm,
}

/// Candidate RPC URLs for a chain, grouped by priority tier
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EndpointTiers {
    /// URLs reserved for this interface, highest priority
    pub interface: Option<Vec<String>>,
    pub default: Option<Vec<String>>,
    pub public: Option<Vec<String>>,
    /// Last resort
    pub fallback: Option<Vec<String>>,
}

impl Settings {
    /// Load settings from the configuration file named by `SWAP_ORCHESTRATOR_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = env::var("SWAP_ORCHESTRATOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::from_toml(&config_str)
    }

    /// Parse settings from TOML text
    pub fn from_toml(config_str: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.enabled_chains().is_empty() {
            anyhow::bail!("At least one chain must be enabled");
        }

        if self.client.request_timeout_ms == 0 {
            anyhow::bail!("Request timeout must be greater than zero");
        }

        if self.client.health_check_interval_secs == 0 {
            anyhow::bail!("Health check interval must be greater than zero");
        }

        if self.client.batch.enabled && self.client.batch.max_batch_size == 0 {
            anyhow::bail!("Batch size must be greater than zero when batching is enabled");
        }

        for (name, chain) in self.enabled_chains() {
            if chain.family != ChainFamily::Evm {
                continue;
            }
            if crate::transport::resolve_endpoints(&chain.rpc).is_empty() {
                anyhow::bail!("Chain {} has no RPC URLs configured", name);
            }
        }

        Ok(())
    }

    /// Get list of enabled chains
    pub fn enabled_chains(&self) -> Vec<(&String, &ChainConfig)> {
        self.chains.iter().filter(|(_, c)| c.enabled).collect()
    }

    /// Get chain config by chain ID
    pub fn get_chain_by_id(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.values().find(|c| c.chain_id == chain_id)
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_health_check_interval_secs() -> u64 {
    60
}

fn default_max_batch_size() -> usize {
    100
}

fn default_log_filter() -> String {
    "info,swap_orchestrator=debug,hyper=warn,reqwest=warn".to_string()
}

fn default_true() -> bool {
    true
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex is valid");

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
