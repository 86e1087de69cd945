//! Chain-specific types shared by the gateways and the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

// Re-export EndpointConfig from config module to avoid duplication
pub use crate::config::schema::EndpointConfig;

/// Rounds a transaction stays valid for after the node's last round.
pub const VALIDITY_WINDOW: u64 = 1000;

/// Fee floor used when the node does not report `min-fee`.
pub const DEFAULT_MIN_FEE: u64 = 1000;

/// Raw reply of `GET /v2/transactions/params`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeTransactionParams {
    #[serde(default)]
    pub consensus_version: String,
    pub fee: u64,
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    #[serde(default)]
    pub min_fee: Option<u64>,
}

/// Parameters required to build a valid transaction.
///
/// Goes stale once the chain passes `last_valid`; refreshing is the
/// caller's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParameters {
    /// Per-byte fee, or the absolute fee when `flat_fee` is set.
    pub fee: u64,
    pub min_fee: u64,
    pub flat_fee: bool,
    pub first_valid: u64,
    pub last_valid: u64,
    #[serde(rename = "genesisID")]
    pub genesis_id: String,
    /// Base64 genesis hash as reported by the node.
    pub genesis_hash: String,
    #[serde(default)]
    pub consensus_version: String,
}

impl TryFrom<NodeTransactionParams> for NetworkParameters {
    type Error = CoreError;

    /// Fails when the node's last round leaves no room for the validity window.
    fn try_from(raw: NodeTransactionParams) -> Result<Self, Self::Error> {
        let last_valid = raw.last_round.checked_add(VALIDITY_WINDOW).ok_or_else(|| {
            CoreError::network(format!("Node reported out-of-range last round {}", raw.last_round))
        })?;
        Ok(Self {
            fee: raw.fee,
            min_fee: raw.min_fee.unwrap_or(DEFAULT_MIN_FEE),
            flat_fee: false,
            first_valid: raw.last_round,
            last_valid,
            genesis_id: raw.genesis_id,
            genesis_hash: raw.genesis_hash,
            consensus_version: raw.consensus_version,
        })
    }
}

/// Account enumerated by the wallet for a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
}

/// Wallet-signed transaction, ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlob {
    /// Transaction id as reported by the wallet.
    #[serde(rename = "txID")]
    pub tx_id: String,
    /// Base64 signed transaction bytes.
    pub blob: String,
}

/// Proof of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_id: String,
}

/// Raw reply of `GET /v2/transactions/pending/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PendingTransactionInfo {
    #[serde(rename = "pool-error", default)]
    pub pool_error: String,
    #[serde(
        rename = "confirmed-round",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub confirmed_round: Option<u64>,
    #[serde(default)]
    pub txn: Value,
}

impl PendingTransactionInfo {
    /// Confirmation round from the top level, falling back to `txn`.
    pub fn confirmation_round(&self) -> Option<u64> {
        self.confirmed_round
            .or_else(|| self.txn.get("confirmed-round").and_then(Value::as_u64))
            .filter(|round| *round > 0)
    }

    /// Classify the reply. A pool error wins over any confirmation round.
    pub fn status(&self) -> PendingStatus {
        if !self.pool_error.is_empty() {
            return PendingStatus::Rejected {
                pool_error: self.pool_error.clone(),
            };
        }
        match self.confirmation_round() {
            Some(round) => PendingStatus::Confirmed { round },
            None => PendingStatus::Pending,
        }
    }
}

/// Node-side classification of a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PendingStatus {
    /// Included in a block.
    Confirmed { round: u64 },
    /// Known to the node, not yet confirmed.
    Pending,
    /// Dropped from the pool.
    Rejected { pool_error: String },
}

impl PendingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PendingStatus::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PendingStatus::Confirmed { .. } => "confirmed",
            PendingStatus::Pending => "pending",
            PendingStatus::Rejected { .. } => "rejected",
        }
    }
}
