//! Guard bundle
//!
//! Wires the block registry, the violation tracker and the rate limiter
//! around one store and one notifier. Construct it once at process start and
//! hand it (or its parts) to the router.

use std::sync::Arc;

use warden_types::notify_adapter::NotifyAdapter;
use warden_types::store_adapter::StoreAdapter;

use crate::guard::{
	BlockRegistry, GuardConfig, GuardLayer, RateLimiter, TierResolver, ViolationTracker,
};
use crate::notifier::Notifier;

#[derive(Debug, Clone)]
pub struct Warden {
	pub registry: Arc<BlockRegistry>,
	pub tracker: Arc<ViolationTracker>,
	pub limiter: Arc<RateLimiter>,
	config: Arc<GuardConfig>,
}

impl Warden {
	pub fn new(
		config: GuardConfig,
		store: Arc<dyn StoreAdapter>,
		notify: Option<Arc<dyn NotifyAdapter>>,
	) -> Self {
		let notifier = notify.map_or_else(Notifier::disabled, Notifier::new);
		let registry = Arc::new(BlockRegistry::new(&config, store.clone(), notifier.clone()));
		let tracker =
			Arc::new(ViolationTracker::new(&config, store, registry.clone(), notifier));
		let limiter = Arc::new(RateLimiter::new(&config, registry.clone(), tracker.clone()));

		Self { registry, tracker, limiter, config: Arc::new(config) }
	}

	pub fn config(&self) -> &GuardConfig {
		&self.config
	}

	/// Start the refresh and sweep loops
	pub fn start(&self) {
		self.registry.start();
	}

	pub fn stop(&self) {
		self.registry.stop();
	}

	/// Block check followed by the tiered rate limit
	pub fn layer(&self, resolver: impl TierResolver + 'static) -> GuardLayer {
		GuardLayer::new(self.registry.middleware(), self.limiter.tiered_guard(resolver))
	}
}

// vim: ts=4
