//! Network and polling configuration.

use thiserror::Error;

/// Environment variable overriding the RPC endpoint.
pub const RPC_URL_ENV: &str = "QUASAR_RPC_URL";

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";
pub const STANDALONE_PASSPHRASE: &str = "Standalone Network ; February 2017";

/// Errors raised while resolving configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown network '{0}'; expected testnet, mainnet, futurenet or local")]
    UnknownNetwork(String),
}

/// Endpoint and passphrase of the network an invocation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub network_passphrase: String,
}

impl NetworkConfig {
    pub fn new(rpc_url: impl Into<String>, network_passphrase: impl Into<String>) -> Self {
        NetworkConfig {
            rpc_url: rpc_url.into(),
            network_passphrase: network_passphrase.into(),
        }
    }

    /// Resolve the RPC URL from an explicit value, `QUASAR_RPC_URL`, or the network default.
    pub fn resolve(explicit_rpc_url: Option<&str>, network: &str) -> Result<Self, ConfigError> {
        let env_url = std::env::var(RPC_URL_ENV).ok();
        Self::resolve_with(explicit_rpc_url, env_url.as_deref(), network)
    }

    fn resolve_with(
        explicit_rpc_url: Option<&str>,
        env_rpc_url: Option<&str>,
        network: &str,
    ) -> Result<Self, ConfigError> {
        let (passphrase, default_url) = network_defaults(network)?;
        let rpc_url = match (explicit_rpc_url, env_rpc_url) {
            (Some(url), _) => url,
            (None, Some(url)) if !url.is_empty() => url,
            _ => default_url,
        };
        Ok(NetworkConfig::new(rpc_url, passphrase))
    }
}

/// Passphrase for a well-known network name.
pub fn network_passphrase(network: &str) -> Result<&'static str, ConfigError> {
    network_defaults(network).map(|(passphrase, _)| passphrase)
}

/// Passphrase and default RPC endpoint of a well-known network.
fn network_defaults(network: &str) -> Result<(&'static str, &'static str), ConfigError> {
    match network {
        "testnet" => Ok((TESTNET_PASSPHRASE, "https://soroban-testnet.stellar.org")),
        "mainnet" | "pubnet" => Ok((
            MAINNET_PASSPHRASE,
            "https://soroban-rpc.mainnet.stellar.gateway.fm",
        )),
        "futurenet" => Ok((FUTURENET_PASSPHRASE, "https://rpc-futurenet.stellar.org")),
        "local" | "standalone" => Ok((STANDALONE_PASSPHRASE, "http://localhost:8000/soroban/rpc")),
        other => Err(ConfigError::UnknownNetwork(other.to_string())),
    }
}

/// Backoff parameters for transaction confirmation polling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollingConfig {
    /// Delay before the second `getTransaction` call
    pub initial_interval_ms: u64,
    /// Multiplier applied to the delay after each poll
    pub backoff_factor: f64,
    /// Upper bound on a single delay
    pub max_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 1000,
            backoff_factor: 1.5,
            max_interval_ms: 5000,
        }
    }
}

impl PollingConfig {
    /// Delay that follows `current_ms`.
    ///
    /// Never shrinks and never drops below 1 ms, whatever the configured
    /// factor and cap.
    pub fn next_interval(&self, current_ms: u64) -> u64 {
        let next = (current_ms as f64 * self.backoff_factor.max(1.0)) as u64;
        next.min(self.max_interval_ms).max(1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
