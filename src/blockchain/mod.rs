//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! EndpointConfig
//!     → client.rs (node health, parameters, pending status)
//!     → types.rs (NetworkParameters)
//!     → transaction.rs + codec.rs (canonical payment bytes, id)
//!     → wallet.rs → bridge.rs (sign, broadcast)
//! ```
//!
//! # Security Constraints
//! - Keys stay inside the wallet; only unsigned bytes leave this crate
//! - The API key is never logged
//! - Every node and bridge request has a timeout

pub mod address;
pub mod bridge;
pub mod client;
pub mod codec;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use address::Address;
pub use bridge::HttpWalletBridge;
pub use client::{AlgodClient, AlgodConnector, ChainClient, ChainConnector, ChainGateway};
pub use transaction::PaymentTransaction;
pub use types::{
    Account, NetworkParameters, PendingStatus, PendingTransactionInfo, SignedBlob, TransactionReceipt,
};
pub use wallet::{ExtensionError, WalletExtension, WalletGateway};
