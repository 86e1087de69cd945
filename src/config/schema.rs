//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! payment client. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Node and indexer endpoints.
    pub endpoint: EndpointConfig,

    /// Wallet bridge settings.
    pub wallet: WalletConfig,

    /// Confirmation polling settings.
    pub polling: PollingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node/indexer endpoint configuration.
///
/// Consumed as-is by the chain client gateway.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// API key sent with every node request. Empty sends no header.
    pub api_key: String,

    /// Header carrying the API key.
    pub api_key_header: String,

    /// Node (algod) base URL.
    pub node_url: String,

    /// Indexer base URL. Empty skips the indexer health check.
    pub indexer_url: String,

    /// Port applied to both URLs when set.
    pub port: Option<u16>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_header: "X-API-Key".to_string(),
            node_url: "http://localhost:4001".to_string(),
            indexer_url: String::new(),
            port: None,
            request_timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("api_key_header", &self.api_key_header)
            .field("node_url", &self.node_url)
            .field("indexer_url", &self.indexer_url)
            .field("port", &self.port)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Wallet bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Base URL of the local wallet bridge.
    pub bridge_url: String,

    /// Ledger whose accounts are used (e.g., "TestNet", "MainNet").
    pub ledger: String,

    /// Per-request timeout in seconds. Signing waits on the user, so this
    /// is generous.
    pub request_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            bridge_url: "http://127.0.0.1:4190".to_string(),
            ledger: "TestNet".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay before the second poll in milliseconds.
    pub interval_ms: u64,

    /// Upper bound on the delay between polls in milliseconds.
    pub max_interval_ms: u64,

    /// Polls made before giving up on a pending transaction.
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_interval_ms: 8000,
            max_attempts: 20,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
