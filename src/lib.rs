//! Wallet-signed payment orchestration for Algorand-style networks.

pub mod blockchain;
pub mod config;
pub mod envelope;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod payments;
pub mod resilience;

pub use config::schema::AppConfig;
pub use envelope::ResultEnvelope;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use lifecycle::Shutdown;
pub use payments::{ConfirmationWatcher, TransactionOrchestrator, TransactionRequest};
