//! HTTP binding to a local wallet bridge.
//!
//! The bridge relays each extension call as a JSON `POST`:
//!
//! | Call      | Path        | Body                  | Reply                 |
//! |-----------|-------------|-----------------------|-----------------------|
//! | connect   | `/connect`  | `{}`                  | any 2xx               |
//! | accounts  | `/accounts` | `{"ledger": ...}`     | `[{"address": ...}]`  |
//! | sign      | `/sign`     | `[{"txn": ...}]`      | `[{"txID","blob"}]`   |
//! | send      | `/send`     | `{"ledger","tx"}`     | `{"txId": ...}`       |
//!
//! Failures reply with a non-2xx status and `{"code", "message"}`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::blockchain::types::{Account, SignedBlob};
use crate::blockchain::wallet::{
    ExtensionError, SendRequest, SendResponse, WalletExtension, WalletTransaction,
};
use crate::config::WalletConfig;

#[derive(Debug, Deserialize)]
struct BridgeErrorBody {
    code: u32,
    message: String,
}

#[derive(Serialize)]
struct AccountsRequest<'a> {
    ledger: &'a str,
}

/// [`WalletExtension`] backed by a wallet bridge over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWalletBridge {
    http: reqwest::Client,
    base_url: String,
}

impl HttpWalletBridge {
    pub fn new(config: &WalletConfig) -> Result<Self, ExtensionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ExtensionError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.bridge_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ExtensionError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ExtensionError::Unreachable(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<BridgeErrorBody>(&text) {
                Ok(body) => ExtensionError::Request {
                    code: body.code,
                    message: body.message,
                },
                Err(_) => ExtensionError::Request {
                    code: u32::from(status.as_u16()),
                    message: if text.is_empty() { status.to_string() } else { text },
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ExtensionError::Malformed(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl WalletExtension for HttpWalletBridge {
    async fn connect(&self) -> Result<(), ExtensionError> {
        self.post::<_, serde_json::Value>("/connect", &serde_json::json!({}))
            .await
            .map(|_| ())
    }

    async fn accounts(&self, ledger: &str) -> Result<Vec<Account>, ExtensionError> {
        self.post("/accounts", &AccountsRequest { ledger }).await
    }

    async fn sign_txn(&self, txns: Vec<WalletTransaction>) -> Result<Vec<SignedBlob>, ExtensionError> {
        self.post("/sign", &txns).await
    }

    async fn send(&self, request: SendRequest) -> Result<SendResponse, ExtensionError> {
        self.post("/send", &request).await
    }
}
