//! Rate Limiter
//!
//! Produces fixed-window rate limit layers. Every guard checks the block
//! registry before counting, and reports rejected requests to the violation
//! tracker on a background task so the 429 response never waits on the store.

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use parking_lot::Mutex;

use warden_types::types::{SYSTEM_ACTOR, now};

use super::config::{GuardConfig, TierLimits, WindowConfig};
use super::error::GuardError;
use super::extractors::{canonical_ip, extract_client_ip};
use super::middleware::RateLimitLayer;
use super::registry::BlockRegistry;
use super::tier::TierResolver;
use super::tracker::ViolationTracker;
use super::window::{FixedWindow, WindowDecision};
use crate::prelude::*;

const VIOLATIONS_REASON: &str = "Automatic block: repeated rate limit violations";

/// Window selection of one guard
pub(crate) enum RatePolicy {
	Fixed(Arc<FixedWindow>),
	Tiered {
		resolver: Box<dyn TierResolver>,
		free: Arc<FixedWindow>,
		basic: Arc<FixedWindow>,
		premium: Arc<FixedWindow>,
		/// Used when no tier resolves
		fallback: Arc<FixedWindow>,
	},
}

impl RatePolicy {
	fn window_for(&self, req: &Request<Body>) -> &FixedWindow {
		let window = match self {
			RatePolicy::Fixed(window) => window,
			RatePolicy::Tiered { resolver, free, basic, premium, fallback } => {
				match resolver.resolve(req) {
					Some(Tier::Free) => free,
					Some(Tier::Basic) => basic,
					Some(Tier::Premium) => premium,
					None => fallback,
				}
			}
		};
		window.as_ref()
	}
}

pub struct RateLimiter {
	registry: Arc<BlockRegistry>,
	tracker: Arc<ViolationTracker>,
	default_config: WindowConfig,
	tiers: TierLimits,
	max_tracked: usize,
	/// Every window handed out, so `forget` can reach all of them
	windows: Mutex<Vec<Arc<FixedWindow>>>,
}

impl RateLimiter {
	pub fn new(
		config: &GuardConfig,
		registry: Arc<BlockRegistry>,
		tracker: Arc<ViolationTracker>,
	) -> Self {
		Self {
			registry,
			tracker,
			default_config: config.default_window.clone(),
			tiers: config.tiers.clone(),
			max_tracked: config.max_tracked_addresses,
			windows: Mutex::new(Vec::new()),
		}
	}

	fn window(&self, config: WindowConfig) -> Arc<FixedWindow> {
		let window = Arc::new(FixedWindow::new(config, self.max_tracked));
		self.windows.lock().push(Arc::clone(&window));
		window
	}

	/// Guard using the configured default window
	pub fn default_window(self: &Arc<Self>) -> RateLimitLayer {
		let window = self.window(self.default_config.clone());
		RateLimitLayer::new(Arc::clone(self), RatePolicy::Fixed(window))
	}

	/// Guard with caller supplied window, limit and rejection message
	pub fn custom_window(self: &Arc<Self>, config: WindowConfig) -> RateLimitLayer {
		let window = self.window(config);
		RateLimitLayer::new(Arc::clone(self), RatePolicy::Fixed(window))
	}

	/// Guard selecting the window by caller tier, falling back to the default window
	pub fn tiered_guard(self: &Arc<Self>, resolver: impl TierResolver + 'static) -> RateLimitLayer {
		let policy = RatePolicy::Tiered {
			resolver: Box::new(resolver),
			free: self.window(self.tiers.get(Tier::Free).clone()),
			basic: self.window(self.tiers.get(Tier::Basic).clone()),
			premium: self.window(self.tiers.get(Tier::Premium).clone()),
			fallback: self.window(self.default_config.clone()),
		};
		RateLimitLayer::new(Arc::clone(self), policy)
	}

	/// Clear the counters of an address in every window
	pub fn forget(&self, ip: IpAddr) {
		let ip = canonical_ip(ip);
		for window in self.windows.lock().iter() {
			window.forget(&ip);
		}
	}

	/// Admit or reject one request under `policy`
	pub(crate) fn check(
		self: &Arc<Self>,
		policy: &RatePolicy,
		req: &Request<Body>,
	) -> Result<(), GuardError> {
		let ip = extract_client_ip(req).ok_or(GuardError::InvalidAddress)?;
		if self.registry.is_blocked(ip) {
			return Err(GuardError::Blocked);
		}

		let window = policy.window_for(req);
		match window.hit(ip) {
			WindowDecision::Allowed { .. } => Ok(()),
			WindowDecision::Exceeded { retry_after } => {
				debug!(address = %ip, path = %req.uri().path(), "Request rejected by rate limit");
				self.report_violation(ip, req.uri().path());
				Err(GuardError::RateLimited { message: window.config().message.clone(), retry_after })
			}
		}
	}

	fn report_violation(self: &Arc<Self>, ip: IpAddr, endpoint: &str) {
		let Ok(handle) = tokio::runtime::Handle::try_current() else {
			warn!(address = %ip, "No async runtime, rate limit violation not recorded");
			return;
		};

		let limiter = Arc::clone(self);
		let endpoint = endpoint.to_string();
		handle.spawn(async move {
			if let Err(err) = limiter.escalate(ip, &endpoint).await {
				warn!(address = %ip, error = %err, "Failed to record rate limit violation");
			}
		});
	}

	async fn escalate(&self, ip: IpAddr, endpoint: &str) -> WdResult<()> {
		self.tracker.record_rate_limit_violation(ip, endpoint).await?;
		let count = self.tracker.check_and_notify_critical(ip).await?;

		if count >= self.tracker.violation_threshold() && !self.registry.is_blocked(ip) {
			let expires_at = now().after(self.tracker.auto_block_duration());
			self.registry.block_deferred(ip, SYSTEM_ACTOR, VIOLATIONS_REASON, Some(expires_at));
			warn!(address = %ip, count, "Address blocked after repeated rate limit violations");
		}
		Ok(())
	}
}

impl std::fmt::Debug for RateLimiter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RateLimiter")
			.field("default_window", &self.default_config)
			.field("windows", &self.windows.lock().len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::net::{Ipv4Addr, SocketAddr};
	use std::time::Duration;

	use axum::extract::ConnectInfo;

	use crate::memory_store::InMemoryStoreAdapter;
	use crate::notifier::Notifier;

	const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100));

	fn limiter() -> (Arc<RateLimiter>, Arc<BlockRegistry>) {
		let config = GuardConfig::default();
		let store = Arc::new(InMemoryStoreAdapter::new());
		let registry = Arc::new(BlockRegistry::new(&config, store.clone(), Notifier::disabled()));
		let tracker = Arc::new(ViolationTracker::new(
			&config,
			store,
			registry.clone(),
			Notifier::disabled(),
		));
		(Arc::new(RateLimiter::new(&config, registry.clone(), tracker)), registry)
	}

	fn request(ip: IpAddr) -> Request<Body> {
		let mut req = Request::builder().uri("/api/data").body(Body::empty()).unwrap();
		req.extensions_mut().insert(ConnectInfo(SocketAddr::new(ip, 40000)));
		req
	}

	fn fixed(limiter: &RateLimiter, max_requests: u32) -> RatePolicy {
		RatePolicy::Fixed(limiter.window(WindowConfig::new(Duration::from_secs(60), max_requests)))
	}

	#[tokio::test(start_paused = true)]
	async fn test_check_limits_and_reports() {
		let (limiter, _registry) = limiter();
		let policy = fixed(&limiter, 2);

		assert_eq!(limiter.check(&policy, &request(IP)), Ok(()));
		assert_eq!(limiter.check(&policy, &request(IP)), Ok(()));
		let err = limiter.check(&policy, &request(IP)).unwrap_err();
		assert!(matches!(err, GuardError::RateLimited { .. }));
	}

	#[tokio::test]
	async fn test_blocked_address_is_not_counted() {
		let (limiter, registry) = limiter();
		let policy = fixed(&limiter, 2);
		registry.block(IP, "admin", None, None).await.unwrap();

		assert_eq!(limiter.check(&policy, &request(IP)), Err(GuardError::Blocked));
		let RatePolicy::Fixed(window) = &policy else { unreachable!() };
		assert_eq!(window.count(&IP), 0);
	}

	#[tokio::test]
	async fn test_missing_address_is_rejected() {
		let (limiter, _registry) = limiter();
		let policy = fixed(&limiter, 2);
		let req = Request::builder().uri("/").body(Body::empty()).unwrap();
		assert_eq!(limiter.check(&policy, &req), Err(GuardError::InvalidAddress));
	}

	#[tokio::test(start_paused = true)]
	async fn test_forget_clears_all_windows() {
		let (limiter, _registry) = limiter();
		let policy = fixed(&limiter, 1);
		limiter.check(&policy, &request(IP)).unwrap();
		assert!(limiter.check(&policy, &request(IP)).is_err());

		limiter.forget(IP);
		assert_eq!(limiter.check(&policy, &request(IP)), Ok(()));
	}

	#[tokio::test]
	async fn test_tier_selection() {
		let (limiter, _registry) = limiter();
		let policy = RatePolicy::Tiered {
			resolver: Box::new(|req: &Request<Body>| req.extensions().get::<Tier>().copied()),
			free: limiter.window(WindowConfig::new(Duration::from_secs(60), 1)),
			basic: limiter.window(WindowConfig::new(Duration::from_secs(60), 2)),
			premium: limiter.window(WindowConfig::new(Duration::from_secs(60), 3)),
			fallback: limiter.window(WindowConfig::new(Duration::from_secs(60), 4)),
		};

		let mut req = request(IP);
		req.extensions_mut().insert(Tier::Basic);
		assert_eq!(policy.window_for(&req).config().max_requests, 2);
		assert_eq!(policy.window_for(&request(IP)).config().max_requests, 4);
	}
}

// vim: ts=4
