//! Violation Tracker
//!
//! Records failed authentication attempts and rate limit violations per
//! address and escalates repeated offenders to an automatic block.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use warden_types::notify_adapter::{Notification, Severity};
use warden_types::store_adapter::StoreAdapter;
use warden_types::types::{SYSTEM_ACTOR, now};

use super::config::GuardConfig;
use super::extractors::canonical_ip;
use super::registry::BlockRegistry;
use super::with_timeout;
use crate::notifier::Notifier;
use crate::prelude::*;

const FAILED_ATTEMPTS_REASON: &str = "Automatic block: repeated failed authentication attempts";

#[derive(Debug)]
pub struct ViolationTracker {
	store: Arc<dyn StoreAdapter>,
	registry: Arc<BlockRegistry>,
	notifier: Notifier,
	store_timeout: Duration,
	failed_attempt_threshold: u32,
	failed_attempt_window: Duration,
	violation_threshold: u32,
	violation_window: Duration,
	auto_block_duration: Duration,
}

impl ViolationTracker {
	pub fn new(
		config: &GuardConfig,
		store: Arc<dyn StoreAdapter>,
		registry: Arc<BlockRegistry>,
		notifier: Notifier,
	) -> Self {
		Self {
			store,
			registry,
			notifier,
			store_timeout: config.store_timeout,
			failed_attempt_threshold: config.failed_attempt_threshold,
			failed_attempt_window: config.failed_attempt_window,
			violation_threshold: config.violation_threshold,
			violation_window: config.violation_window,
			auto_block_duration: config.auto_block_duration,
		}
	}

	pub fn violation_threshold(&self) -> u32 {
		self.violation_threshold
	}

	pub fn auto_block_duration(&self) -> Duration {
		self.auto_block_duration
	}

	/// Record a failed authentication attempt and escalate at the threshold
	///
	/// Returns the number of failed attempts inside the trailing window,
	/// including this one.
	pub async fn record_failed_attempt(&self, ip: IpAddr) -> WdResult<u32> {
		let ip = canonical_ip(ip);
		let address = ip.to_string();
		let at = now();

		with_timeout(self.store_timeout, self.store.insert_failed_attempt(&address, at)).await?;
		let count = self.failed_attempt_count(ip).await?;
		debug!(address = %address, count, "Failed attempt recorded");

		if count >= self.failed_attempt_threshold && !self.registry.is_blocked(ip) {
			let expires_at = at.after(self.auto_block_duration);
			self.registry.block_deferred(ip, SYSTEM_ACTOR, FAILED_ATTEMPTS_REASON, Some(expires_at));
			warn!(address = %address, count, "Address blocked after repeated failed attempts");
			self.notifier.dispatch(
				Notification::new(
					"Automatic Block",
					format!("{} blocked after {} failed attempts", address, count),
					Severity::Critical,
				)
				.field("Address", address)
				.field("Failed attempts", count.to_string())
				.field("Expires", expires_at.to_iso_string()),
			);
		}

		Ok(count)
	}

	/// Record that `ip` exceeded a rate limit on `endpoint`
	pub async fn record_rate_limit_violation(&self, ip: IpAddr, endpoint: &str) -> WdResult<()> {
		let address = canonical_ip(ip).to_string();
		with_timeout(
			self.store_timeout,
			self.store.insert_rate_limit_violation(&address, endpoint, now()),
		)
		.await?;

		info!(address = %address, endpoint = %endpoint, "Rate limit exceeded");
		self.notifier.dispatch(
			Notification::new(
				"Rate Limit Exceeded",
				format!("{} exceeded the rate limit", address),
				Severity::Warning,
			)
			.field("Address", address)
			.field("Endpoint", endpoint),
		);
		Ok(())
	}

	/// Failed attempts inside the trailing window
	pub async fn failed_attempt_count(&self, ip: IpAddr) -> WdResult<u32> {
		let address = canonical_ip(ip).to_string();
		let since = now().before(self.failed_attempt_window);
		with_timeout(self.store_timeout, self.store.count_failed_attempts(&address, since)).await
	}

	/// Rate limit violations inside the trailing window. Never notifies.
	pub async fn violation_count(&self, ip: IpAddr) -> WdResult<u32> {
		let address = canonical_ip(ip).to_string();
		let since = now().before(self.violation_window);
		with_timeout(self.store_timeout, self.store.count_rate_limit_violations(&address, since))
			.await
	}

	/// Count violations and raise a critical alert once the threshold is reached
	pub async fn check_and_notify_critical(&self, ip: IpAddr) -> WdResult<u32> {
		let count = self.violation_count(ip).await?;
		if count >= self.violation_threshold {
			let address = canonical_ip(ip).to_string();
			warn!(address = %address, count, "Critical number of rate limit violations");
			self.notifier.dispatch(
				Notification::new(
					"Critical Rate Limit Violations",
					format!("{} reached {} rate limit violations", address, count),
					Severity::Critical,
				)
				.field("Address", address)
				.field("Violations", count.to_string()),
			);
		}
		Ok(count)
	}
}


// vim: ts=4
