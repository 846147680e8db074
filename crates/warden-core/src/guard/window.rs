//! Fixed Window Counter
//!
//! Per-address request counters that reset at fixed time boundaries.
//! State per address: `Idle -> Counting(n, start) -> Exceeded`; the window
//! restarts with `Counting(1, now)` once `now - start > window`.

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::config::WindowConfig;

#[derive(Debug, Clone, Copy)]
struct WindowState {
	count: u32,
	started: Instant,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
	Allowed { remaining: u32 },
	/// Limit exceeded; the window closes after `retry_after`
	Exceeded { retry_after: Duration },
}

/// Fixed window counter keyed by client address
pub struct FixedWindow {
	config: WindowConfig,
	counters: Mutex<LruCache<IpAddr, WindowState>>,
}

impl FixedWindow {
	pub fn new(config: WindowConfig, max_tracked: usize) -> Self {
		let cap = NonZeroUsize::new(max_tracked).unwrap_or(NonZeroUsize::MIN);
		Self { config, counters: Mutex::new(LruCache::new(cap)) }
	}

	pub fn config(&self) -> &WindowConfig {
		&self.config
	}

	/// Count one request for `ip`
	pub fn hit(&self, ip: IpAddr) -> WindowDecision {
		let now = Instant::now();
		let mut counters = self.counters.lock();

		let state = counters.get_or_insert_mut(ip, || WindowState { count: 0, started: now });
		if now.duration_since(state.started) > self.config.window {
			*state = WindowState { count: 0, started: now };
		}
		state.count = state.count.saturating_add(1);

		if state.count > self.config.max_requests {
			let elapsed = now.duration_since(state.started);
			WindowDecision::Exceeded { retry_after: self.config.window.saturating_sub(elapsed) }
		} else {
			WindowDecision::Allowed { remaining: self.config.max_requests - state.count }
		}
	}

	/// Current count inside the open window, 0 when idle or elapsed
	pub fn count(&self, ip: &IpAddr) -> u32 {
		let counters = self.counters.lock();
		counters
			.peek(ip)
			.filter(|state| state.started.elapsed() <= self.config.window)
			.map_or(0, |state| state.count)
	}

	pub fn forget(&self, ip: &IpAddr) {
		self.counters.lock().pop(ip);
	}

	pub fn tracked(&self) -> usize {
		self.counters.lock().len()
	}
}

impl std::fmt::Debug for FixedWindow {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FixedWindow")
			.field("config", &self.config)
			.field("tracked", &self.tracked())
			.finish()
	}
}


// vim: ts=4
