//! Adaptive IP reputation and rate limiting guard for Axum services.
//!
//! The guard keeps an in-memory projection of blocked addresses that is
//! checked on every request, counts requests in fixed windows, and escalates
//! repeated offenders to automatic blocks. Persistence and alert delivery
//! are pluggable through the adapter traits of `warden-types`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod guard;
pub mod memory_store;
pub mod notifier;
pub mod prelude;

pub use app::Warden;

// vim: ts=4
