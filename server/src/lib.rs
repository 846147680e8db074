//! Warden server library: configuration, routes and handlers.
//!
//! The binary in `main.rs` only initializes logging and calls [`app::run`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod handler;
pub mod middleware;
pub mod prelude;
pub mod routes;
pub mod types;

pub use app::{App, AppState};

// vim: ts=4
