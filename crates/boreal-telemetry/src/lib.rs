//! Observability layer for the boreal monitoring agent.
//!
//! Two concerns live here:
//! - **Logging**: human-readable and JSON-formatted `tracing-subscriber`
//!   initialisers driven by `RUST_LOG`.
//! - **Metrics**: a thread-safe counters/gauges registry with Prometheus
//!   text export, shared by every scheduler bound to the same client.
//!
//! The agent core never logs to a concrete sink directly: it emits `tracing`
//! events and records into an injected [`metrics::MetricsRegistry`], so tests
//! can observe behaviour without capturing process output.

pub mod logging;
pub mod metrics;
