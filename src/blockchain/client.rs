//! Chain client gateway and the node binding it wraps.
//!
//! # Responsibilities
//! - Build a node client from endpoint configuration
//! - Health-check the node before any further calls
//! - Fetch suggested transaction parameters
//! - Fetch pending-transaction information by id
//! - Bound every request with the configured timeout

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::types::{EndpointConfig, NetworkParameters, NodeTransactionParams, PendingTransactionInfo};
use crate::envelope::ResultEnvelope;
use crate::error::{CoreError, CoreResult};
use crate::observability::metrics;

/// Raw binding to a node.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn health_check(&self) -> CoreResult<()>;

    async fn transaction_params(&self) -> CoreResult<NodeTransactionParams>;

    /// `CoreError::NotFound` when the node does not know `tx_id`.
    async fn pending_transaction(&self, tx_id: &str) -> CoreResult<PendingTransactionInfo>;
}

/// Builds a [`ChainClient`] from endpoint configuration.
pub trait ChainConnector: Send + Sync {
    fn connect(&self, config: &EndpointConfig) -> CoreResult<Arc<dyn ChainClient>>;
}

/// Connector producing [`AlgodClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlgodConnector;

impl ChainConnector for AlgodConnector {
    fn connect(&self, config: &EndpointConfig) -> CoreResult<Arc<dyn ChainClient>> {
        Ok(Arc::new(AlgodClient::new(config)?))
    }
}

/// REST client for an algod node, with an optional indexer.
#[derive(Clone)]
pub struct AlgodClient {
    http: reqwest::Client,
    node_base: String,
    indexer_base: Option<String>,
    timeout_secs: u64,
}

impl AlgodClient {
    pub fn new(config: &EndpointConfig) -> CoreResult<Self> {
        let node_base = base_url(&config.node_url, config.port)?;
        let indexer_base = if config.indexer_url.is_empty() {
            None
        } else {
            Some(base_url(&config.indexer_url, config.port)?)
        };

        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let name = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(|e| {
                CoreError::network(format!("Invalid API key header '{}': {}", config.api_key_header, e))
            })?;
            let mut value = HeaderValue::from_str(&config.api_key)
                .map_err(|_| CoreError::network("API key is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CoreError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            node_base,
            indexer_base,
            timeout_secs: config.request_timeout_secs,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> CoreResult<T> {
        let response = self.http.get(&url).send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::network(format!("Malformed node response from {}: {}", url, e)))
    }

    async fn indexer_health(&self) {
        let Some(base) = &self.indexer_base else {
            return;
        };
        match self.http.get(format!("{}/health", base)).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(indexer = %base, "Indexer healthy");
            }
            Ok(response) => {
                tracing::warn!(indexer = %base, status = %response.status(), "Indexer health check failed");
            }
            Err(e) => {
                tracing::warn!(indexer = %base, error = %e, "Indexer unreachable");
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> CoreError {
        if err.is_timeout() {
            CoreError::network(format!("Request timed out after {} seconds", self.timeout_secs))
        } else if err.is_connect() {
            CoreError::network(format!("Connection failed: {}", err))
        } else {
            CoreError::network(err.to_string())
        }
    }
}

#[async_trait]
impl ChainClient for AlgodClient {
    async fn health_check(&self) -> CoreResult<()> {
        let url = format!("{}/health", self.node_base);
        let response = self.http.get(&url).send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        // The indexer is informational only.
        self.indexer_health().await;
        Ok(())
    }

    async fn transaction_params(&self) -> CoreResult<NodeTransactionParams> {
        self.get_json(format!("{}/v2/transactions/params", self.node_base)).await
    }

    async fn pending_transaction(&self, tx_id: &str) -> CoreResult<PendingTransactionInfo> {
        let url = format!("{}/v2/transactions/pending/{}", self.node_base, tx_id);
        match self.get_json(url).await {
            Err(CoreError::NetworkUnreachable {
                status: Some(404), ..
            }) => Err(CoreError::NotFound(tx_id.to_string())),
            other => other,
        }
    }
}

impl std::fmt::Debug for AlgodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgodClient")
            .field("node_base", &self.node_base)
            .field("indexer_base", &self.indexer_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// `url` with `port` applied, without a trailing slash.
fn base_url(url: &str, port: Option<u16>) -> CoreResult<String> {
    let mut parsed: url::Url = url
        .parse()
        .map_err(|e| CoreError::network(format!("Invalid endpoint URL '{}': {}", url, e)))?;
    if let Some(port) = port {
        parsed
            .set_port(Some(port))
            .map_err(|_| CoreError::network(format!("Cannot set port {} on '{}'", port, url)))?;
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> CoreError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    CoreError::NetworkUnreachable {
        reason: format!("Node returned {}: {}", status, message),
        status: Some(status.as_u16()),
    }
}

/// Adapter holding the node client once setup succeeds.
pub struct ChainGateway {
    connector: Arc<dyn ChainConnector>,
    client: Option<Arc<dyn ChainClient>>,
}

impl ChainGateway {
    pub fn new(connector: Arc<dyn ChainConnector>) -> Self {
        Self {
            connector,
            client: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> CoreResult<&Arc<dyn ChainClient>> {
        self.client.as_ref().ok_or(CoreError::ClientNotReady)
    }

    pub async fn health_check(&mut self, config: &EndpointConfig) -> ResultEnvelope<()> {
        self.try_health_check(config).await.into()
    }

    /// Build a client and keep it only if the node answers. Any failure
    /// leaves the gateway without a client.
    pub(crate) async fn try_health_check(&mut self, config: &EndpointConfig) -> CoreResult<()> {
        tracing::info!(node_url = %config.node_url, "Setting up chain client");
        self.client = None;
        let client = self.connector.connect(config)?;
        match client.health_check().await {
            Ok(()) => {
                metrics::record_node_health(true);
                tracing::info!(node_url = %config.node_url, "Chain client ready");
                self.client = Some(client);
                Ok(())
            }
            Err(e) => {
                metrics::record_node_health(false);
                tracing::warn!(node_url = %config.node_url, error = %e, "Node health check failed");
                Err(e)
            }
        }
    }

    pub async fn fetch_network_parameters(&self) -> ResultEnvelope<NetworkParameters> {
        self.try_fetch_network_parameters().await.into()
    }

    pub(crate) async fn try_fetch_network_parameters(&self) -> CoreResult<NetworkParameters> {
        let raw = self.client()?.transaction_params().await?;
        let params = NetworkParameters::try_from(raw)?;
        tracing::info!(
            first_valid = params.first_valid,
            last_valid = params.last_valid,
            genesis_id = %params.genesis_id,
            "Network parameters fetched"
        );
        Ok(params)
    }

    pub async fn fetch_pending_status(&self, tx_id: &str) -> ResultEnvelope<PendingTransactionInfo> {
        self.try_fetch_pending_status(tx_id).await.into()
    }

    pub(crate) async fn try_fetch_pending_status(&self, tx_id: &str) -> CoreResult<PendingTransactionInfo> {
        let info = self.client()?.pending_transaction(tx_id).await?;
        tracing::debug!(tx_id = %tx_id, status = info.status().label(), "Pending status fetched");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_with_port() {
        assert_eq!(
            base_url("https://node.example.com/ps2/", Some(8443)).unwrap(),
            "https://node.example.com:8443/ps2"
        );
        assert_eq!(
            base_url("http://localhost:4001", None).unwrap(),
            "http://localhost:4001"
        );
        assert!(base_url("not a url", None).is_err());
    }

    #[tokio::test]
    async fn test_gateway_requires_setup() {
        let gateway = ChainGateway::new(Arc::new(AlgodConnector));
        assert!(!gateway.is_ready());
        let env = gateway.fetch_network_parameters().await;
        assert_eq!(env.error_kind().as_deref(), Some("ClientNotReady"));
    }

    #[tokio::test]
    async fn test_unreachable_node_fails_setup() {
        let mut gateway = ChainGateway::new(Arc::new(AlgodConnector));
        let config = EndpointConfig {
            node_url: "http://127.0.0.1:1".into(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let env = gateway.health_check(&config).await;
        assert_eq!(env.error_kind().as_deref(), Some("NetworkUnreachable"));
        assert!(!gateway.is_ready());
    }
}
