//! Payment orchestration types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::blockchain::address::Address;
use crate::blockchain::transaction::{to_base_units, PaymentTransaction};
use crate::blockchain::types::{NetworkParameters, PendingStatus, PendingTransactionInfo};
use crate::error::{CoreError, CoreResult};

/// User-supplied payment, as collected by a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    /// Amount in whole currency units.
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub note: Option<String>,
}

impl TransactionRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount: Some(amount),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Validate the request and build the payment it describes.
    pub fn build_payment(&self, params: &NetworkParameters) -> CoreResult<PaymentTransaction> {
        let sender = parse_address("from", &self.from)?;
        let receiver = parse_address("to", &self.to)?;
        let amount = self
            .amount
            .ok_or_else(|| CoreError::InvalidRequest("amount is required".to_string()))?;
        let amount = to_base_units(amount)?;

        PaymentTransaction::new(
            sender,
            receiver,
            amount,
            self.note.as_deref().unwrap_or_default(),
            params,
        )
    }
}

fn parse_address(field: &str, value: &str) -> CoreResult<Address> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::InvalidRequest(format!("'{}' address is required", field)));
    }
    value
        .parse()
        .map_err(|e| CoreError::InvalidRequest(format!("'{}' address is invalid: {}", field, e)))
}

/// Lifecycle state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrchestratorState {
    /// Wallet not connected.
    Disconnected,
    /// Wallet connected, no network parameters cached yet.
    Connected,
    /// Wallet connected and parameters cached.
    Ready,
    /// A submission is in flight.
    Submitting,
    /// Last submission broadcast, not yet settled.
    AwaitingConfirmation,
    /// Last submission confirmed.
    Confirmed,
    /// Last submission dropped from the pool.
    Rejected,
}

impl OrchestratorState {
    /// States from which a new submission may start. `Submitting` is
    /// included because a dropped submission future leaves it behind.
    pub fn accepts_submission(&self) -> bool {
        matches!(
            self,
            OrchestratorState::Ready
                | OrchestratorState::Submitting
                | OrchestratorState::AwaitingConfirmation
                | OrchestratorState::Confirmed
                | OrchestratorState::Rejected
        )
    }

    /// States that a status poll may move between.
    pub fn is_tracking(&self) -> bool {
        matches!(
            self,
            OrchestratorState::AwaitingConfirmation
                | OrchestratorState::Confirmed
                | OrchestratorState::Rejected
        )
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of one status poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub transaction_id: String,
    pub status: PendingStatus,
    /// Raw node reply, for display.
    pub info: PendingTransactionInfo,
}
