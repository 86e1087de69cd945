//! Transaction orchestrator.
//!
//! # Responsibilities
//! - Sequence wallet connection, client setup and parameter refresh
//! - Build, sign and broadcast payments
//! - Remember the outstanding transaction and classify its status
//!
//! # Design Decisions
//! - Every operation takes `&mut self`, so calls on one orchestrator are
//!   serialized by the borrow checker
//! - A failed submission leaves state and the outstanding receipt untouched
//! - Results cross the public boundary as `ResultEnvelope`s

use crate::blockchain::client::ChainGateway;
use crate::blockchain::types::{
    Account, EndpointConfig, NetworkParameters, PendingStatus, TransactionReceipt,
};
use crate::blockchain::wallet::WalletGateway;
use crate::envelope::ResultEnvelope;
use crate::error::{CoreError, CoreResult};
use crate::observability::metrics;
use crate::payments::types::{OrchestratorState, StatusReport, TransactionRequest};

/// Stateful coordinator between the wallet and the chain client.
pub struct TransactionOrchestrator {
    wallet: WalletGateway,
    chain: ChainGateway,
    ledger: String,
    state: OrchestratorState,
    parameters: Option<NetworkParameters>,
    outstanding: Option<TransactionReceipt>,
}

impl TransactionOrchestrator {
    pub fn new(wallet: WalletGateway, chain: ChainGateway, ledger: impl Into<String>) -> Self {
        Self {
            wallet,
            chain,
            ledger: ledger.into(),
            state: OrchestratorState::Disconnected,
            parameters: None,
            outstanding: None,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Last successfully fetched network parameters.
    pub fn parameters(&self) -> Option<&NetworkParameters> {
        self.parameters.as_ref()
    }

    /// Receipt of the most recent successful submission.
    pub fn outstanding(&self) -> Option<&TransactionReceipt> {
        self.outstanding.as_ref()
    }

    pub fn ledger(&self) -> &str {
        &self.ledger
    }

    pub async fn connect(&mut self) -> ResultEnvelope<()> {
        self.try_connect().await.into()
    }

    async fn try_connect(&mut self) -> CoreResult<()> {
        self.wallet.try_connect().await?;
        self.state = if self.parameters.is_some() {
            OrchestratorState::Ready
        } else {
            OrchestratorState::Connected
        };
        tracing::debug!(state = %self.state, "Orchestrator connected");
        Ok(())
    }

    /// Forget the wallet session. Cached parameters and the outstanding
    /// receipt are kept.
    pub fn disconnect(&mut self) {
        self.wallet.disconnect();
        self.state = OrchestratorState::Disconnected;
    }

    pub async fn list_accounts(&self) -> ResultEnvelope<Vec<Account>> {
        self.wallet.try_list_accounts(&self.ledger).await.into()
    }

    /// Build a node client and health-check it.
    pub async fn setup_client(&mut self, config: &EndpointConfig) -> ResultEnvelope<()> {
        self.chain.try_health_check(config).await.into()
    }

    /// Fetch and cache fresh network parameters.
    pub async fn refresh_parameters(&mut self) -> ResultEnvelope<NetworkParameters> {
        self.try_refresh_parameters().await.into()
    }

    async fn try_refresh_parameters(&mut self) -> CoreResult<NetworkParameters> {
        let params = self.chain.try_fetch_network_parameters().await?;
        self.parameters = Some(params.clone());
        if self.state == OrchestratorState::Connected {
            self.state = OrchestratorState::Ready;
        }
        Ok(params)
    }

    /// Build, sign and broadcast a payment.
    pub async fn submit(&mut self, request: &TransactionRequest) -> ResultEnvelope<TransactionReceipt> {
        self.try_submit(request).await.into()
    }

    async fn try_submit(&mut self, request: &TransactionRequest) -> CoreResult<TransactionReceipt> {
        let params = match &self.parameters {
            None => return Err(CoreError::ParametersUnavailable),
            Some(_) if !self.state.accepts_submission() => return Err(CoreError::NotConnected),
            Some(params) => params.clone(),
        };

        let previous = self.state;
        self.state = OrchestratorState::Submitting;

        let result = self.sign_and_send(request, &params).await;
        match result {
            Ok(receipt) => {
                metrics::record_submission("success");
                tracing::info!(tx_id = %receipt.transaction_id, "Payment submitted");
                self.outstanding = Some(receipt.clone());
                self.state = OrchestratorState::AwaitingConfirmation;
                Ok(receipt)
            }
            Err(e) => {
                metrics::record_submission("failure");
                tracing::warn!(error = %e, "Payment submission failed");
                self.state = previous;
                Err(e)
            }
        }
    }

    async fn sign_and_send(
        &self,
        request: &TransactionRequest,
        params: &NetworkParameters,
    ) -> CoreResult<TransactionReceipt> {
        let payment = request.build_payment(params)?;
        let local_id = payment.id();
        tracing::debug!(
            tx_id = %local_id,
            amount = payment.amount,
            fee = payment.fee,
            "Payment built"
        );

        let signed = self.wallet.try_request_signature(&payment.encode()).await?;
        if !signed.tx_id.is_empty() && signed.tx_id != local_id {
            tracing::warn!(local = %local_id, wallet = %signed.tx_id, "Wallet reported a different transaction id");
        }

        self.wallet.try_broadcast(&signed, &self.ledger).await
    }

    /// Query the node for the outstanding transaction's status.
    pub async fn poll_status(&mut self) -> ResultEnvelope<StatusReport> {
        self.try_poll_status().await.into()
    }

    async fn try_poll_status(&mut self) -> CoreResult<StatusReport> {
        let transaction_id = self
            .outstanding
            .as_ref()
            .map(|r| r.transaction_id.clone())
            .ok_or(CoreError::NoOutstandingTransaction)?;

        let info = self.chain.try_fetch_pending_status(&transaction_id).await?;
        let status = info.status();
        metrics::record_poll(status.label());

        if self.state.is_tracking() {
            self.state = match status {
                PendingStatus::Confirmed { .. } => OrchestratorState::Confirmed,
                PendingStatus::Rejected { .. } => OrchestratorState::Rejected,
                PendingStatus::Pending => OrchestratorState::AwaitingConfirmation,
            };
        }

        Ok(StatusReport {
            transaction_id,
            status,
            info,
        })
    }
}
