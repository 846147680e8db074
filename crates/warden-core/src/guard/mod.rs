//! Request guard: block registry, violation tracking and rate limiting.

pub mod config;
pub mod error;
pub mod extractors;
pub mod limiter;
pub mod middleware;
pub mod registry;
pub mod tier;
pub mod tracker;
pub mod window;

pub use config::{GuardConfig, TierLimits, WindowConfig};
pub use error::GuardError;
pub use extractors::extract_client_ip;
pub use limiter::RateLimiter;
pub use middleware::{BlockLayer, GuardLayer, RateLimitLayer};
pub use registry::BlockRegistry;
pub use tier::{ExtensionTier, HeaderTier, TierResolver};
pub use tracker::ViolationTracker;

use std::future::Future;
use std::time::Duration;

use crate::prelude::*;

/// Bound a store call. A slow store surfaces as `Error::Timeout`.
pub(crate) async fn with_timeout<T>(
	limit: Duration,
	fut: impl Future<Output = WdResult<T>>,
) -> WdResult<T> {
	tokio::time::timeout(limit, fut).await.map_err(|_| Error::Timeout)?
}

// vim: ts=4
