//! Guard Configuration
//!
//! Every policy number of the guard lives here as a named field so that the
//! server (or an embedding application) can override it.

use std::time::Duration;

use warden_types::types::Tier;

const FIFTEEN_MINUTES: Duration = Duration::from_secs(15 * 60);
const ONE_DAY: Duration = Duration::from_secs(24 * 3600);

/// A single fixed window: at most `max_requests` per `window` per address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
	pub window: Duration,
	pub max_requests: u32,
	/// Message returned to rejected callers
	pub message: Box<str>,
}

impl WindowConfig {
	pub fn new(window: Duration, max_requests: u32) -> Self {
		Self { window, max_requests, message: DEFAULT_LIMIT_MESSAGE.into() }
	}

	pub fn with_message(mut self, message: impl Into<Box<str>>) -> Self {
		self.message = message.into();
		self
	}
}

pub const DEFAULT_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Per-tier windows used by the tiered guard
#[derive(Clone, Debug)]
pub struct TierLimits {
	pub free: WindowConfig,
	pub basic: WindowConfig,
	pub premium: WindowConfig,
}

impl TierLimits {
	pub fn get(&self, tier: Tier) -> &WindowConfig {
		match tier {
			Tier::Free => &self.free,
			Tier::Basic => &self.basic,
			Tier::Premium => &self.premium,
		}
	}
}

impl Default for TierLimits {
	fn default() -> Self {
		Self {
			free: WindowConfig::new(FIFTEEN_MINUTES, 50),
			basic: WindowConfig::new(FIFTEEN_MINUTES, 200),
			premium: WindowConfig::new(FIFTEEN_MINUTES, 1000),
		}
	}
}

/// Main guard configuration
#[derive(Clone, Debug)]
pub struct GuardConfig {
	/// How often the block cache is reconciled with the store
	pub refresh_interval: Duration,
	/// How often expired blocks are deactivated
	pub sweep_interval: Duration,
	/// Upper bound for a single store call
	pub store_timeout: Duration,

	/// Failed attempts inside `failed_attempt_window` that trigger an automatic block
	pub failed_attempt_threshold: u32,
	pub failed_attempt_window: Duration,
	/// Rate limit violations inside `violation_window` that trigger an automatic block
	pub violation_threshold: u32,
	pub violation_window: Duration,
	/// Expiry of automatic blocks
	pub auto_block_duration: Duration,

	/// Window used by `RateLimiter::default_window` and as tier fallback
	pub default_window: WindowConfig,
	pub tiers: TierLimits,
	/// Maximum number of addresses tracked per window (memory limit)
	pub max_tracked_addresses: usize,
	/// Upper bound of the page size accepted by `BlockRegistry::list_blocked`
	pub list_max_page_size: u32,
}

impl Default for GuardConfig {
	fn default() -> Self {
		Self {
			refresh_interval: Duration::from_secs(3600),
			sweep_interval: Duration::from_secs(600),
			store_timeout: Duration::from_secs(5),
			failed_attempt_threshold: 5,
			failed_attempt_window: ONE_DAY,
			violation_threshold: 3,
			violation_window: ONE_DAY,
			auto_block_duration: ONE_DAY,
			default_window: WindowConfig::new(FIFTEEN_MINUTES, 100),
			tiers: TierLimits::default(),
			max_tracked_addresses: 100_000,
			list_max_page_size: 100,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tier_limits_lookup() {
		let tiers = TierLimits::default();
		assert_eq!(tiers.get(Tier::Free).max_requests, 50);
		assert_eq!(tiers.get(Tier::Basic).max_requests, 200);
		assert_eq!(tiers.get(Tier::Premium).max_requests, 1000);
		assert_eq!(tiers.get(Tier::Premium).window, FIFTEEN_MINUTES);
	}
}

// vim: ts=4
