//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, env override)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → EndpointConfig handed to the orchestrator's client setup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - The API key may come from the environment instead of the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, EndpointConfig, ObservabilityConfig, PollingConfig, WalletConfig};
