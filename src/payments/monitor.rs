//! Confirmation watcher.
//!
//! Repeats `poll_status` on an orchestrator until the outstanding
//! transaction settles, a poll fails, attempts run out, or the caller
//! cancels.

use std::future::Future;

use crate::config::PollingConfig;
use crate::envelope::ResultEnvelope;
use crate::payments::orchestrator::TransactionOrchestrator;
use crate::payments::types::StatusReport;
use crate::resilience::poll_delay;

/// Drives status polls with backoff between them.
#[derive(Debug, Clone)]
pub struct ConfirmationWatcher {
    config: PollingConfig,
}

impl ConfirmationWatcher {
    pub fn new(config: PollingConfig) -> Self {
        Self { config }
    }

    /// Poll until a terminal classification or a failure.
    ///
    /// Returns the last envelope seen. When attempts run out or `cancel`
    /// resolves, that is the most recent pending report.
    pub async fn watch<F>(
        &self,
        orchestrator: &mut TransactionOrchestrator,
        cancel: F,
    ) -> ResultEnvelope<StatusReport>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        let mut envelope = orchestrator.poll_status().await;

        loop {
            match envelope.data() {
                Some(report) if report.status.is_terminal() => {
                    tracing::info!(
                        tx_id = %report.transaction_id,
                        status = report.status.label(),
                        attempt,
                        "Transaction settled"
                    );
                    return envelope;
                }
                Some(report) => {
                    tracing::debug!(tx_id = %report.transaction_id, attempt, "Transaction still pending");
                }
                None => return envelope,
            }

            attempt += 1;
            if attempt >= attempts {
                tracing::warn!(attempts, "Transaction not settled when watch ended");
                return envelope;
            }

            let delay = poll_delay(attempt, &self.config);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut cancel => {
                    tracing::info!(attempt, "Confirmation watch cancelled");
                    return envelope;
                }
            }

            envelope = orchestrator.poll_status().await;
        }
    }
}
