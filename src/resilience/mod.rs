//! Timing helpers for repeated node queries.

pub mod backoff;

pub use backoff::poll_delay;
