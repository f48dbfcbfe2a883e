//! Standalone scheduling core of the boreal monitoring agent.
//!
//! A [`standalone::Standalone`] owns one check and a fixed interval, runs
//! its own timing loop in whatever task the caller spawns for it, and hands
//! every result to the client's transport as a serialized
//! [`result::ResultEnvelope`]. This is "standalone mode": the agent
//! self-schedules its checks instead of waiting for a server to dispatch
//! them.
//!
//! Modules:
//! - [`config`] — typed standalone configuration plus validation of the
//!   loosely-typed attribute map it is built from.
//! - [`client`] — the identity/transport/metrics handle schedulers bind to.
//! - [`shutdown`] — idempotent cooperative stop signal for the loop.
//! - [`result`] — the published wire payload and its routing constants.
//! - [`standalone`] — the scheduler lifecycle, timing loop, and tick
//!   procedure.

pub mod client;
pub mod config;
pub mod result;
pub mod shutdown;
pub mod standalone;

pub use client::ClientHandle;
pub use config::{Attributes, ConfigError, StandaloneConfig};
pub use shutdown::ShutdownSignal;
pub use standalone::{Standalone, StartError};
