//! JSON-RPC connect configuration.

use std::fmt;
use std::time::Duration;

use connect_core::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RpcError, RpcErrorCode};

pub const DEVNET_URL: &str = "https://api.devnet.solana.com";
pub const TESTNET_URL: &str = "https://api.testnet.solana.com";
pub const MAINNET_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    Mainnet,
    Custom(String),
}

impl Cluster {
    pub fn url(&self) -> &str {
        match self {
            Cluster::Devnet => DEVNET_URL,
            Cluster::Testnet => TESTNET_URL,
            Cluster::Mainnet => MAINNET_URL,
            Cluster::Custom(url) => url,
        }
    }

    /// `devnet`, `testnet`, `mainnet` (or `mainnet-beta`), or a URL.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "devnet" => Cluster::Devnet,
            "testnet" => Cluster::Testnet,
            "mainnet" | "mainnet-beta" => Cluster::Mainnet,
            _ => Cluster::Custom(raw.trim().to_string()),
        }
    }
}

/// How settled the state a query reads from must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    #[default]
    Finalized,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processed" => Some(Commitment::Processed),
            "confirmed" => Some(Commitment::Confirmed),
            "finalized" => Some(Commitment::Finalized),
            _ => None,
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    cluster: Cluster,
    api_key: Option<String>,
    commitment: Commitment,
    timeout: Duration,
}

fn invalid(reason: impl fmt::Display) -> RpcError {
    RpcError::with_reason(RpcErrorCode::InvalidConfiguration, reason)
}

impl RpcConfig {
    pub fn new(cluster: Cluster) -> Result<Self, RpcError> {
        let url = cluster.url();
        let parsed = Url::parse(url).map_err(|e| invalid(format!("node URL `{url}` is invalid: {e}")).with_cause(e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("node URL `{url}` must use http or https")));
        }
        Ok(Self {
            cluster,
            api_key: None,
            commitment: Commitment::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Key sent as the `api-key` query parameter. Blank keys are rejected.
    pub fn with_api_key(mut self, api_key: &str) -> Result<Self, RpcError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(invalid("API key must not be blank"));
        }
        self.api_key = Some(api_key.to_string());
        Ok(self)
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `RPC_CLUSTER` (default devnet), `RPC_API_KEY`, `RPC_COMMITMENT`
    /// and `RPC_TIMEOUT_SECS` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RpcError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cluster = lookup("RPC_CLUSTER").map_or(Cluster::Devnet, |raw| Cluster::parse(&raw));
        let mut config = Self::new(cluster)?;
        if let Some(key) = lookup("RPC_API_KEY") {
            config = config.with_api_key(&key)?;
        }
        if let Some(raw) = lookup("RPC_COMMITMENT") {
            let commitment = Commitment::parse(&raw)
                .ok_or_else(|| invalid(format!("RPC_COMMITMENT `{raw}` is not a commitment level")))?;
            config = config.with_commitment(commitment);
        }
        if let Some(raw) = lookup("RPC_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid(format!("RPC_TIMEOUT_SECS `{raw}` is not a positive whole number of seconds")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        tracing::debug!(
            url = config.url(),
            commitment = %config.commitment,
            authenticated = config.api_key.is_some(),
            "loaded RPC configuration"
        );
        Ok(config)
    }

    pub fn from_env() -> Result<Self, RpcError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn url(&self) -> &str {
        self.cluster.url()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
