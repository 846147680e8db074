//! Shared types, adapter traits, and error types for the Warden guard.
//!
//! This crate contains the foundational types that are shared between the
//! core guard, the server and all adapter implementations, so adapter crates
//! do not depend on the guard itself.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod error;
pub mod notify_adapter;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
