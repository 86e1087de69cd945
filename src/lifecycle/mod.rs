//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Ctrl-C → Shutdown::trigger → every wait() future resolves
//!        → confirmation watch returns its last report
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
