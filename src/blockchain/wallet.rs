//! Wallet gateway and the extension binding it wraps.
//!
//! # Security
//! - Keys never leave the wallet; this side only sees unsigned bytes and
//!   signed blobs
//! - Signed blobs are never logged

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::types::{Account, SignedBlob, TransactionReceipt};
use crate::envelope::ResultEnvelope;
use crate::error::{CoreError, CoreResult};

/// Extension error code for a request the user declined.
pub const USER_REJECTED_CODE: u32 = 4001;

/// One entry of a sign request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    /// Base64 canonical transaction bytes.
    pub txn: String,
}

/// Body of a send request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub ledger: String,
    /// Base64 signed blob.
    pub tx: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// Failures reported by the extension binding itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// The extension is missing or did not answer.
    #[error("wallet extension not reachable: {0}")]
    Unreachable(String),

    /// The extension answered with an error.
    #[error("[{code}] {message}")]
    Request { code: u32, message: String },

    /// The extension answered, but the reply could not be read.
    #[error("malformed wallet reply: {0}")]
    Malformed(String),
}

impl ExtensionError {
    pub fn is_user_rejection(&self) -> bool {
        match self {
            ExtensionError::Request { code, message } => {
                *code == USER_REJECTED_CODE || message.contains("UserRejected")
            }
            ExtensionError::Unreachable(_) | ExtensionError::Malformed(_) => false,
        }
    }
}

/// Raw binding to a wallet extension.
///
/// Implementations perform exactly one call per method and never retry.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Ask the user to authorize this application.
    async fn connect(&self) -> Result<(), ExtensionError>;

    /// Enumerate the accounts the wallet holds for `ledger`.
    async fn accounts(&self, ledger: &str) -> Result<Vec<Account>, ExtensionError>;

    /// Present transactions to the user for signing.
    async fn sign_txn(&self, txns: Vec<WalletTransaction>) -> Result<Vec<SignedBlob>, ExtensionError>;

    /// Relay a signed transaction to the network.
    async fn send(&self, request: SendRequest) -> Result<SendResponse, ExtensionError>;
}

/// Adapter around an optional extension binding.
///
/// Owns no state beyond whether `connect` has succeeded.
pub struct WalletGateway {
    extension: Option<Arc<dyn WalletExtension>>,
    connected: bool,
}

impl WalletGateway {
    pub fn new(extension: Arc<dyn WalletExtension>) -> Self {
        Self {
            extension: Some(extension),
            connected: false,
        }
    }

    /// Gateway for an environment where no extension is present.
    pub fn unavailable() -> Self {
        Self {
            extension: None,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn disconnect(&mut self) {
        if self.connected {
            tracing::info!("Wallet disconnected");
        }
        self.connected = false;
    }

    fn extension(&self) -> CoreResult<&Arc<dyn WalletExtension>> {
        self.extension.as_ref().ok_or_else(|| {
            CoreError::ExtensionUnavailable("no wallet extension is installed".to_string())
        })
    }

    fn connected_extension(&self) -> CoreResult<&Arc<dyn WalletExtension>> {
        let extension = self.extension()?;
        if !self.connected {
            return Err(CoreError::NotConnected);
        }
        Ok(extension)
    }

    pub async fn connect(&mut self) -> ResultEnvelope<()> {
        self.try_connect().await.into()
    }

    pub(crate) async fn try_connect(&mut self) -> CoreResult<()> {
        tracing::info!("Connecting to wallet extension");
        let result = self.extension()?.connect().await;
        match result {
            Ok(()) => {
                self.connected = true;
                tracing::info!("Wallet connected");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Wallet connect failed");
                Err(classify(e, CoreError::ExtensionUnavailable))
            }
        }
    }

    pub async fn list_accounts(&self, ledger: &str) -> ResultEnvelope<Vec<Account>> {
        self.try_list_accounts(ledger).await.into()
    }

    pub(crate) async fn try_list_accounts(&self, ledger: &str) -> CoreResult<Vec<Account>> {
        let accounts = self
            .connected_extension()?
            .accounts(ledger)
            .await
            .map_err(|e| classify(e, CoreError::ExtensionUnavailable))?;
        tracing::debug!(ledger = %ledger, count = accounts.len(), "Accounts listed");
        Ok(accounts)
    }

    pub async fn request_signature(&self, raw_transaction: &[u8]) -> ResultEnvelope<SignedBlob> {
        self.try_request_signature(raw_transaction).await.into()
    }

    pub(crate) async fn try_request_signature(&self, raw_transaction: &[u8]) -> CoreResult<SignedBlob> {
        let extension = self.connected_extension()?;
        let request = vec![WalletTransaction {
            txn: STANDARD.encode(raw_transaction),
        }];

        tracing::info!(bytes = raw_transaction.len(), "Requesting wallet signature");
        let mut signed = extension
            .sign_txn(request)
            .await
            .map_err(|e| classify(e, CoreError::SigningFailed))?;

        if signed.len() != 1 {
            return Err(CoreError::SigningFailed(format!(
                "wallet returned {} signed transactions for 1 request",
                signed.len()
            )));
        }
        let blob = signed.remove(0);
        if blob.blob.is_empty() {
            return Err(CoreError::SigningFailed("wallet returned an empty blob".to_string()));
        }
        tracing::info!(tx_id = %blob.tx_id, "Transaction signed");
        Ok(blob)
    }

    pub async fn broadcast(&self, blob: &SignedBlob, ledger: &str) -> ResultEnvelope<TransactionReceipt> {
        self.try_broadcast(blob, ledger).await.into()
    }

    pub(crate) async fn try_broadcast(&self, blob: &SignedBlob, ledger: &str) -> CoreResult<TransactionReceipt> {
        let request = SendRequest {
            ledger: ledger.to_string(),
            tx: blob.blob.clone(),
        };
        let response = self
            .connected_extension()?
            .send(request)
            .await
            .map_err(|e| match e {
                ExtensionError::Unreachable(reason) => CoreError::ExtensionUnavailable(reason),
                ExtensionError::Request { code, message } => {
                    CoreError::BroadcastFailed(message).with_wallet_code(code)
                }
                ExtensionError::Malformed(reason) => CoreError::BroadcastFailed(reason),
            })?;

        tracing::info!(tx_id = %response.tx_id, ledger = %ledger, "Transaction broadcast");
        Ok(TransactionReceipt {
            transaction_id: response.tx_id,
        })
    }
}

/// Map an extension failure: unreachable and user rejection have fixed
/// kinds, everything else (unreadable replies included) takes the
/// operation-specific `fallback`.
fn classify(err: ExtensionError, fallback: fn(String) -> CoreError) -> CoreError {
    let rejected = err.is_user_rejection();
    match err {
        ExtensionError::Unreachable(reason) => CoreError::ExtensionUnavailable(reason),
        ExtensionError::Request { code, message } if rejected => {
            CoreError::UserRejected(message).with_wallet_code(code)
        }
        ExtensionError::Request { code, message } => fallback(message).with_wallet_code(code),
        ExtensionError::Malformed(reason) => fallback(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Mutex;

    /// Extension double that answers every call from a fixed script.
    #[derive(Default)]
    struct ScriptedExtension {
        connect: Option<ExtensionError>,
        sign: Option<ExtensionError>,
        send: Option<ExtensionError>,
        signed_requests: Mutex<Vec<Vec<WalletTransaction>>>,
    }

    #[async_trait]
    impl WalletExtension for ScriptedExtension {
        async fn connect(&self) -> Result<(), ExtensionError> {
            self.connect.clone().map_or(Ok(()), Err)
        }

        async fn accounts(&self, _ledger: &str) -> Result<Vec<Account>, ExtensionError> {
            Ok(vec![Account {
                address: "MALVCNPYFAS5MN7R6DAO3BRORKMRYOWAVZWDPQ6XBEBXQ2GDFFA75E6S5M".into(),
            }])
        }

        async fn sign_txn(&self, txns: Vec<WalletTransaction>) -> Result<Vec<SignedBlob>, ExtensionError> {
            self.signed_requests.lock().unwrap().push(txns);
            match &self.sign {
                Some(e) => Err(e.clone()),
                None => Ok(vec![SignedBlob {
                    tx_id: "TX123".into(),
                    blob: "c2lnbmVk".into(),
                }]),
            }
        }

        async fn send(&self, _request: SendRequest) -> Result<SendResponse, ExtensionError> {
            match &self.send {
                Some(e) => Err(e.clone()),
                None => Ok(SendResponse { tx_id: "TX123".into() }),
            }
        }
    }

    fn rejection() -> ExtensionError {
        ExtensionError::Request {
            code: USER_REJECTED_CODE,
            message: "[RequestError.UserRejected] The extension user does not authorize the request.".into(),
        }
    }

    #[tokio::test]
    async fn test_missing_extension() {
        let mut gateway = WalletGateway::unavailable();
        let env = gateway.connect().await;
        assert_eq!(env.error_kind().as_deref(), Some("ExtensionUnavailable"));
        assert!(!gateway.is_connected());
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let ext = ScriptedExtension {
            connect: Some(rejection()),
            ..Default::default()
        };
        let mut gateway = WalletGateway::new(Arc::new(ext));
        let err = gateway.try_connect().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserRejected);
        assert!(!gateway.is_connected());
    }

    #[tokio::test]
    async fn test_accounts_require_connection() {
        let mut gateway = WalletGateway::new(Arc::new(ScriptedExtension::default()));
        let env = gateway.list_accounts("TestNet").await;
        assert_eq!(env.error_kind().as_deref(), Some("NotConnected"));

        assert!(gateway.connect().await.is_ok());
        let env = gateway.list_accounts("TestNet").await;
        assert_eq!(env.data().map(Vec::len), Some(1));

        gateway.disconnect();
        assert!(!gateway.list_accounts("TestNet").await.is_ok());
    }

    #[tokio::test]
    async fn test_signature_request_is_base64() {
        let ext = Arc::new(ScriptedExtension::default());
        let mut gateway = WalletGateway::new(ext.clone());
        gateway.try_connect().await.unwrap();

        let blob = gateway.try_request_signature(b"abc").await.unwrap();
        assert_eq!(blob.tx_id, "TX123");

        let requests = ext.signed_requests.lock().unwrap();
        assert_eq!(requests[0], vec![WalletTransaction { txn: "YWJj".into() }]);
    }

    #[tokio::test]
    async fn test_signing_failure_kinds() {
        let ext = ScriptedExtension {
            sign: Some(ExtensionError::Request {
                code: 4300,
                message: "malformed transaction".into(),
            }),
            ..Default::default()
        };
        let mut gateway = WalletGateway::new(Arc::new(ext));
        gateway.try_connect().await.unwrap();
        let err = gateway.try_request_signature(b"abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SigningFailed);
        assert_eq!(err.detail()["code"], 4300);
    }

    #[tokio::test]
    async fn test_broadcast_failure_carries_reason() {
        let ext = ScriptedExtension {
            send: Some(ExtensionError::Request {
                code: 4000,
                message: "TransactionPool.Remember: overspend".into(),
            }),
            ..Default::default()
        };
        let mut gateway = WalletGateway::new(Arc::new(ext));
        gateway.try_connect().await.unwrap();

        let blob = SignedBlob {
            tx_id: "TX123".into(),
            blob: "c2lnbmVk".into(),
        };
        let env = gateway.broadcast(&blob, "TestNet").await;
        let error = env.error().unwrap();
        assert_eq!(error.message, "BroadcastFailed");
        assert!(error.reason().contains("overspend"));
    }

    #[tokio::test]
    async fn test_malformed_replies_take_operation_kind() {
        let malformed = ExtensionError::Malformed("expected a sequence".into());
        let ext = ScriptedExtension {
            sign: Some(malformed.clone()),
            send: Some(malformed),
            ..Default::default()
        };
        let mut gateway = WalletGateway::new(Arc::new(ext));
        gateway.try_connect().await.unwrap();

        let err = gateway.try_request_signature(b"abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SigningFailed);
        assert!(err.to_string().contains("expected a sequence"));

        let blob = SignedBlob {
            tx_id: "TX123".into(),
            blob: "c2lnbmVk".into(),
        };
        let err = gateway.try_broadcast(&blob, "TestNet").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BroadcastFailed);
    }
}
