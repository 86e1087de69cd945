//! Payment orchestration.
//!
//! # Data Flow
//! ```text
//! TransactionRequest
//!     → orchestrator.rs (build with cached parameters)
//!     → WalletGateway (sign, broadcast)
//!     → TransactionReceipt (kept as the outstanding transaction)
//!     → monitor.rs (poll until settled)
//!     → StatusReport
//! ```

pub mod monitor;
pub mod orchestrator;
pub mod types;

pub use monitor::ConfirmationWatcher;
pub use orchestrator::TransactionOrchestrator;
pub use types::{OrchestratorState, StatusReport, TransactionRequest};
