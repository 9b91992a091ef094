//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration, dispatch, hooks, reloads:
//!     → logging.rs (structured tracing events, stderr)
//! HTTP host:
//!     → metrics.rs (request counter + latency histogram)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Request ID is carried on every dispatch event
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
