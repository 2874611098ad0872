//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → structured log events (tracing, initialized in main)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout log output, filtered by RUST_LOG
//!     → Prometheus scrape endpoint (opt-in)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments) and no-ops without an exporter
//! - Request outcome is a low-cardinality label, never the URL

pub mod metrics;
