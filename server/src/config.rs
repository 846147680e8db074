//! Server configuration
//!
//! Read from environment variables at start-up. Every guard policy number
//! can be overridden with a `WARDEN_*` variable; invalid values abort the
//! start with `Error::ConfigError`.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;
use warden_core::guard::GuardConfig;

use crate::prelude::*;

const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
const DEFAULT_DB_PATH: &str = "./data/warden.db";
const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub listen: SocketAddr,
	pub db_path: PathBuf,
	pub webhook_url: Option<Box<str>>,
	pub webhook_timeout: Duration,
	/// Bearer token of the admin API. The admin API is disabled when unset.
	pub admin_token: Option<Box<str>>,
	/// Header carrying the caller tier, set by a trusted gateway
	pub tier_header: Option<HeaderName>,
	pub guard: GuardConfig,
}

/// Typed access to a variable source
struct Vars<F> {
	get: F,
}

impl<F> Vars<F>
where
	F: Fn(&str) -> Option<String>,
{
	fn string(&self, key: &str) -> Option<String> {
		(self.get)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
	}

	fn parse<T>(&self, key: &str) -> WdResult<Option<T>>
	where
		T: FromStr,
		T::Err: Display,
	{
		self.string(key)
			.map(|v| {
				v.parse::<T>().map_err(|err| Error::ConfigError(format!("{}: {}", key, err)))
			})
			.transpose()
	}

	/// Positive integer
	fn count(&self, key: &str) -> WdResult<Option<u32>> {
		match self.parse::<u32>(key)? {
			Some(0) => Err(Error::ConfigError(format!("{}: must be positive", key))),
			other => Ok(other),
		}
	}

	/// Positive number of seconds
	fn secs(&self, key: &str) -> WdResult<Option<Duration>> {
		match self.parse::<u64>(key)? {
			Some(0) => Err(Error::ConfigError(format!("{}: must be positive", key))),
			other => Ok(other.map(Duration::from_secs)),
		}
	}
}

impl ServerConfig {
	pub fn from_env() -> WdResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Build the configuration from an arbitrary variable source
	pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> WdResult<Self> {
		let vars = Vars { get };

		let listen = match vars.parse("LISTEN")? {
			Some(listen) => listen,
			None => DEFAULT_LISTEN
				.parse()
				.map_err(|_| Error::ConfigError("invalid default listen address".into()))?,
		};

		Ok(Self {
			listen,
			db_path: vars.string("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into()).into(),
			webhook_url: vars.string("WEBHOOK_URL").map(Into::into),
			webhook_timeout: vars.secs("WEBHOOK_TIMEOUT_SECS")?.unwrap_or(DEFAULT_WEBHOOK_TIMEOUT),
			admin_token: vars.string("ADMIN_TOKEN").map(Into::into),
			tier_header: vars.parse("WARDEN_TIER_HEADER")?,
			guard: guard_config(&vars)?,
		})
	}
}

fn guard_config<F>(vars: &Vars<F>) -> WdResult<GuardConfig>
where
	F: Fn(&str) -> Option<String>,
{
	let mut guard = GuardConfig::default();

	// Background loops
	if let Some(v) = vars.secs("WARDEN_REFRESH_INTERVAL_SECS")? {
		guard.refresh_interval = v;
	}
	if let Some(v) = vars.secs("WARDEN_SWEEP_INTERVAL_SECS")? {
		guard.sweep_interval = v;
	}
	if let Some(v) = vars.secs("WARDEN_STORE_TIMEOUT_SECS")? {
		guard.store_timeout = v;
	}

	// Escalation
	if let Some(v) = vars.count("WARDEN_FAILED_ATTEMPT_THRESHOLD")? {
		guard.failed_attempt_threshold = v;
	}
	if let Some(v) = vars.secs("WARDEN_FAILED_ATTEMPT_WINDOW_SECS")? {
		guard.failed_attempt_window = v;
	}
	if let Some(v) = vars.count("WARDEN_VIOLATION_THRESHOLD")? {
		guard.violation_threshold = v;
	}
	if let Some(v) = vars.secs("WARDEN_VIOLATION_WINDOW_SECS")? {
		guard.violation_window = v;
	}
	if let Some(v) = vars.secs("WARDEN_AUTO_BLOCK_SECS")? {
		guard.auto_block_duration = v;
	}

	// Rate limit windows
	if let Some(v) = vars.secs("WARDEN_DEFAULT_WINDOW_SECS")? {
		guard.default_window.window = v;
	}
	if let Some(v) = vars.count("WARDEN_DEFAULT_MAX_REQUESTS")? {
		guard.default_window.max_requests = v;
	}
	if let Some(v) = vars.secs("WARDEN_TIER_WINDOW_SECS")? {
		guard.tiers.free.window = v;
		guard.tiers.basic.window = v;
		guard.tiers.premium.window = v;
	}
	if let Some(v) = vars.count("WARDEN_TIER_FREE_MAX")? {
		guard.tiers.free.max_requests = v;
	}
	if let Some(v) = vars.count("WARDEN_TIER_BASIC_MAX")? {
		guard.tiers.basic.max_requests = v;
	}
	if let Some(v) = vars.count("WARDEN_TIER_PREMIUM_MAX")? {
		guard.tiers.premium.max_requests = v;
	}
	if let Some(message) = vars.string("WARDEN_LIMIT_MESSAGE") {
		let message: Box<str> = message.into();
		guard.default_window.message = message.clone();
		guard.tiers.free.message = message.clone();
		guard.tiers.basic.message = message.clone();
		guard.tiers.premium.message = message;
	}

	if let Some(v) = vars.parse::<usize>("WARDEN_MAX_TRACKED")? {
		guard.max_tracked_addresses = v.max(1);
	}
	if let Some(v) = vars.count("WARDEN_LIST_MAX_PAGE_SIZE")? {
		guard.list_max_page_size = v;
	}

	Ok(guard)
}


// vim: ts=4
