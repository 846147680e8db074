//! Adapter that persists blocked addresses and abuse events.
//!
//! The guard never caches counts or events: every rolling-window count is
//! asked from the store. Only the set of blocked addresses is projected
//! into memory by the block registry.

use async_trait::async_trait;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::{
	prelude::*,
	types::{serialize_timestamp_iso, serialize_timestamp_iso_opt},
};

/// Persisted block record. One row per address; never physically deleted.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedAddress {
	/// Canonical client address
	pub address: Box<str>,
	pub reason: Option<Box<str>>,
	/// Actor id, or `SYSTEM_ACTOR` for automatic blocks
	pub blocked_by: Box<str>,
	/// None means indefinite
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub expires_at: Option<Timestamp>,
	pub is_active: bool,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

impl BlockedAddress {
	/// Active and not past its expiry at `as_of`
	pub fn is_effective(&self, as_of: Timestamp) -> bool {
		self.is_active && self.expires_at.is_none_or(|exp| exp > as_of)
	}
}

/// Input of `StoreAdapter::upsert_blocked_address`
#[derive(Debug, Clone, Copy)]
pub struct UpsertBlockedAddress<'a> {
	pub address: &'a str,
	pub reason: Option<&'a str>,
	pub blocked_by: &'a str,
	pub expires_at: Option<Timestamp>,
	/// Used as `created_at` when the record does not exist yet
	pub now: Timestamp,
}

#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	// Blocked addresses
	//*******************

	/// Creates the record or overwrites reason, actor and expiry of the existing one,
	/// forcing it active. Returns the stored record.
	async fn upsert_blocked_address(
		&self,
		opts: &UpsertBlockedAddress<'_>,
	) -> WdResult<BlockedAddress>;

	/// Active records with no expiry or an expiry after `as_of`
	async fn find_active_blocked_addresses(&self, as_of: Timestamp)
	-> WdResult<Vec<BlockedAddress>>;

	/// Active records whose expiry is at or before `as_of`
	async fn find_expired_active_blocked_addresses(
		&self,
		as_of: Timestamp,
	) -> WdResult<Vec<BlockedAddress>>;

	/// Flips `is_active` to false. Returns whether an active record was changed.
	async fn deactivate_blocked_address(&self, address: &str) -> WdResult<bool>;

	/// Reads one record regardless of its state
	async fn read_blocked_address(&self, address: &str) -> WdResult<Option<BlockedAddress>>;

	/// Active records, newest first. `page` is 1-based.
	async fn list_active_blocked_addresses_paged(
		&self,
		page: u32,
		page_size: u32,
	) -> WdResult<ListPage<BlockedAddress>>;

	// Abuse events
	//**************
	async fn insert_failed_attempt(&self, address: &str, occurred_at: Timestamp) -> WdResult<()>;

	async fn count_failed_attempts(&self, address: &str, since: Timestamp) -> WdResult<u32>;

	async fn insert_rate_limit_violation(
		&self,
		address: &str,
		endpoint: &str,
		occurred_at: Timestamp,
	) -> WdResult<()>;

	async fn count_rate_limit_violations(&self, address: &str, since: Timestamp)
	-> WdResult<u32>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(is_active: bool, expires_at: Option<Timestamp>) -> BlockedAddress {
		BlockedAddress {
			address: "10.0.0.1".into(),
			reason: None,
			blocked_by: "admin".into(),
			expires_at,
			is_active,
			created_at: Timestamp(100),
		}
	}

	#[test]
	fn test_is_effective() {
		assert!(record(true, None).is_effective(Timestamp(1_000)));
		assert!(record(true, Some(Timestamp(1_001))).is_effective(Timestamp(1_000)));
		assert!(!record(true, Some(Timestamp(1_000))).is_effective(Timestamp(1_000)));
		assert!(!record(false, None).is_effective(Timestamp(1_000)));
	}

	#[test]
	fn test_serialize_camel_case() {
		let json = serde_json::to_value(record(true, Some(Timestamp(0)))).unwrap();
		assert_eq!(json["blockedBy"], "admin");
		assert_eq!(json["expiresAt"], "1970-01-01T00:00:00Z");
		assert_eq!(json["isActive"], true);
		assert!(json.get("reason").is_none());
	}
}

// vim: ts=4
