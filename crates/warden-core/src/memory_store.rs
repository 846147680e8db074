//! In-memory store adapter, for tests and single-process setups without a database.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use warden_types::store_adapter::{BlockedAddress, StoreAdapter, UpsertBlockedAddress};

use crate::prelude::*;

#[derive(Debug, Default)]
struct Tables {
	blocked: HashMap<Box<str>, BlockedAddress>,
	failed_attempts: Vec<(Box<str>, Timestamp)>,
	violations: Vec<(Box<str>, Box<str>, Timestamp)>,
}

#[derive(Debug, Default)]
pub struct InMemoryStoreAdapter {
	tables: Mutex<Tables>,
}

impl InMemoryStoreAdapter {
	pub fn new() -> Self {
		Self::default()
	}
}

fn count_u32(n: usize) -> u32 {
	u32::try_from(n).unwrap_or(u32::MAX)
}

#[async_trait]
impl StoreAdapter for InMemoryStoreAdapter {
	async fn upsert_blocked_address(
		&self,
		opts: &UpsertBlockedAddress<'_>,
	) -> WdResult<BlockedAddress> {
		let mut tables = self.tables.lock();
		let record = tables.blocked.entry(opts.address.into()).or_insert_with(|| BlockedAddress {
			address: opts.address.into(),
			reason: None,
			blocked_by: opts.blocked_by.into(),
			expires_at: None,
			is_active: true,
			created_at: opts.now,
		});
		record.reason = opts.reason.map(Into::into);
		record.blocked_by = opts.blocked_by.into();
		record.expires_at = opts.expires_at;
		record.is_active = true;
		Ok(record.clone())
	}

	async fn find_active_blocked_addresses(
		&self,
		as_of: Timestamp,
	) -> WdResult<Vec<BlockedAddress>> {
		let tables = self.tables.lock();
		Ok(tables.blocked.values().filter(|b| b.is_effective(as_of)).cloned().collect())
	}

	async fn find_expired_active_blocked_addresses(
		&self,
		as_of: Timestamp,
	) -> WdResult<Vec<BlockedAddress>> {
		let tables = self.tables.lock();
		Ok(tables
			.blocked
			.values()
			.filter(|b| b.is_active && b.expires_at.is_some_and(|exp| exp <= as_of))
			.cloned()
			.collect())
	}

	async fn deactivate_blocked_address(&self, address: &str) -> WdResult<bool> {
		let mut tables = self.tables.lock();
		match tables.blocked.get_mut(address) {
			Some(record) if record.is_active => {
				record.is_active = false;
				Ok(true)
			}
			_ => Ok(false),
		}
	}

	async fn read_blocked_address(&self, address: &str) -> WdResult<Option<BlockedAddress>> {
		Ok(self.tables.lock().blocked.get(address).cloned())
	}

	async fn list_active_blocked_addresses_paged(
		&self,
		page: u32,
		page_size: u32,
	) -> WdResult<ListPage<BlockedAddress>> {
		let tables = self.tables.lock();
		let mut active: Vec<_> = tables.blocked.values().filter(|b| b.is_active).cloned().collect();
		active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.address.cmp(&b.address)));

		let total = active.len() as u64;
		let offset = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
		let items = active.into_iter().skip(offset).take(page_size as usize).collect();
		Ok(ListPage { items, total, page, page_size })
	}

	async fn insert_failed_attempt(&self, address: &str, occurred_at: Timestamp) -> WdResult<()> {
		self.tables.lock().failed_attempts.push((address.into(), occurred_at));
		Ok(())
	}

	async fn count_failed_attempts(&self, address: &str, since: Timestamp) -> WdResult<u32> {
		let tables = self.tables.lock();
		Ok(count_u32(
			tables
				.failed_attempts
				.iter()
				.filter(|(addr, at)| addr.as_ref() == address && *at >= since)
				.count(),
		))
	}

	async fn insert_rate_limit_violation(
		&self,
		address: &str,
		endpoint: &str,
		occurred_at: Timestamp,
	) -> WdResult<()> {
		self.tables.lock().violations.push((address.into(), endpoint.into(), occurred_at));
		Ok(())
	}

	async fn count_rate_limit_violations(
		&self,
		address: &str,
		since: Timestamp,
	) -> WdResult<u32> {
		let tables = self.tables.lock();
		Ok(count_u32(
			tables
				.violations
				.iter()
				.filter(|(addr, _, at)| addr.as_ref() == address && *at >= since)
				.count(),
		))
	}
}


// vim: ts=4
