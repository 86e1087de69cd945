//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateways and orchestrator produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never API keys or signed blobs
//! - Metric macros are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
