//! Check capability layer for the boreal monitoring agent.
//!
//! Defines the [`check::Check`] trait that check variants implement and the
//! [`types::CheckOutput`] snapshot they produce. The only built-in variant is
//! [`check::ExternalCheck`], which runs a configured command line through the
//! platform shell.

pub mod check;
pub mod types;
