//! Transport layer for the boreal monitoring agent.
//!
//! The agent core only ever talks to the [`publisher::Publisher`] capability;
//! how bytes reach a backend is a transport concern. This crate ships one
//! concrete transport, [`memory::MemoryTransport`], an in-process broadcast
//! bus used for embedding and tests. Wire transports implement the same
//! trait in their own crates.

pub mod memory;
pub mod publisher;
