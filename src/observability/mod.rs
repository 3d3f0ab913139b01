//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, middleware and listener produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never pre-formatted strings
//! - Metric updates are no-ops until a recorder is installed, so the core
//!   can be embedded without pulling in an exporter

pub mod logging;
pub mod metrics;
