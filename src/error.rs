//! Error taxonomy for the orchestration core.
//!
//! Gateways detect failures with `Result<T, CoreError>` and `?`; the
//! orchestrator converts them into a [`ResultEnvelope`](crate::envelope::ResultEnvelope)
//! before anything crosses into UI-facing code.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Appended to build failures caused by missing cached state.
pub const RETRY_HINT: &str = "Connect your wallet and try again";

/// Stable, machine-readable classification of a [`CoreError`].
///
/// Its display form is what the envelope carries in `error.message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ExtensionUnavailable,
    UserRejected,
    SigningFailed,
    BroadcastFailed,
    NotFound,
    NetworkUnreachable,
    InvalidRequest,
    NotConnected,
    ClientNotReady,
    ParametersUnavailable,
    NoOutstandingTransaction,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ExtensionUnavailable => "ExtensionUnavailable",
            ErrorKind::UserRejected => "UserRejected",
            ErrorKind::SigningFailed => "SigningFailed",
            ErrorKind::BroadcastFailed => "BroadcastFailed",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::NetworkUnreachable => "NetworkUnreachable",
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::NotConnected => "NotConnected",
            ErrorKind::ClientNotReady => "ClientNotReady",
            ErrorKind::ParametersUnavailable => "ParametersUnavailable",
            ErrorKind::NoOutstandingTransaction => "NoOutstandingTransaction",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur anywhere in the connect → submit → poll lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// No wallet extension binding, or the extension did not answer.
    #[error("Wallet extension unavailable: {0}")]
    ExtensionUnavailable(String),

    /// The wallet user declined the request.
    #[error("Request rejected by the wallet user: {0}")]
    UserRejected(String),

    /// The wallet could not sign the transaction.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// The network refused the signed transaction.
    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),

    /// The node does not know the transaction id.
    #[error("Transaction {0} not found")]
    NotFound(String),

    /// Health check, parameter fetch or status fetch could not reach the node.
    #[error("Node unreachable: {reason}")]
    NetworkUnreachable { reason: String, status: Option<u16> },

    /// The transaction request is missing fields or malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Wallet operation attempted before a successful connect.
    #[error("Wallet is not connected")]
    NotConnected,

    /// Node operation attempted before a successful client setup.
    #[error("Chain client has not been set up")]
    ClientNotReady,

    /// Submission attempted without cached network parameters.
    #[error("Network parameters are not available. Connect your wallet and try again")]
    ParametersUnavailable,

    /// Status poll attempted with no submitted transaction.
    #[error("No outstanding transaction to check")]
    NoOutstandingTransaction,

    /// Wallet-level failure carrying the extension's error code.
    #[error("{source}")]
    Wallet {
        kind: ErrorKind,
        code: u32,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    pub fn network(reason: impl Into<String>) -> Self {
        CoreError::NetworkUnreachable {
            reason: reason.into(),
            status: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ExtensionUnavailable(_) => ErrorKind::ExtensionUnavailable,
            CoreError::UserRejected(_) => ErrorKind::UserRejected,
            CoreError::SigningFailed(_) => ErrorKind::SigningFailed,
            CoreError::BroadcastFailed(_) => ErrorKind::BroadcastFailed,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
            CoreError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CoreError::NotConnected => ErrorKind::NotConnected,
            CoreError::ClientNotReady => ErrorKind::ClientNotReady,
            CoreError::ParametersUnavailable => ErrorKind::ParametersUnavailable,
            CoreError::NoOutstandingTransaction => ErrorKind::NoOutstandingTransaction,
            CoreError::Wallet { kind, .. } => *kind,
        }
    }

    /// JSON detail rendered under `error.detail`.
    pub fn detail(&self) -> Value {
        match self {
            CoreError::NetworkUnreachable {
                reason,
                status: Some(status),
            } => json!({ "reason": reason, "status": status }),
            CoreError::NotFound(id) => json!({ "reason": self.to_string(), "transactionId": id }),
            CoreError::Wallet { code, source, .. } => {
                json!({ "reason": source.to_string(), "code": code })
            }
            _ => json!({ "reason": self.to_string() }),
        }
    }

    /// Tag a wallet failure with the extension's numeric error code.
    pub fn with_wallet_code(self, code: u32) -> Self {
        match self {
            CoreError::Wallet { .. } => self,
            other => CoreError::Wallet {
                kind: other.kind(),
                code,
                source: Box::new(other),
            },
        }
    }
}

/// Result type for orchestration operations.
pub type CoreResult<T> = Result<T, CoreError>;
