//! SQLite implementation of the Warden store adapter.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use warden_types::prelude::*;
use warden_types::store_adapter::{BlockedAddress, StoreAdapter, UpsertBlockedAddress};

mod blocked;
mod events;
mod schema;
mod utils;

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

impl StoreAdapterSqlite {
	/// Open (or create) the database file at `path` and initialize the schema
	pub async fn new(path: impl AsRef<Path>) -> WdResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!(path = %path.as_ref().display(), "Store opened");
		Ok(Self { db })
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterSqlite {
	// Blocked addresses
	//*******************
	async fn upsert_blocked_address(
		&self,
		opts: &UpsertBlockedAddress<'_>,
	) -> WdResult<BlockedAddress> {
		blocked::upsert(&self.db, opts).await
	}

	async fn find_active_blocked_addresses(
		&self,
		as_of: Timestamp,
	) -> WdResult<Vec<BlockedAddress>> {
		blocked::list_active(&self.db, as_of).await
	}

	async fn find_expired_active_blocked_addresses(
		&self,
		as_of: Timestamp,
	) -> WdResult<Vec<BlockedAddress>> {
		blocked::list_expired(&self.db, as_of).await
	}

	async fn deactivate_blocked_address(&self, address: &str) -> WdResult<bool> {
		blocked::deactivate(&self.db, address).await
	}

	async fn read_blocked_address(&self, address: &str) -> WdResult<Option<BlockedAddress>> {
		blocked::read(&self.db, address).await
	}

	async fn list_active_blocked_addresses_paged(
		&self,
		page: u32,
		page_size: u32,
	) -> WdResult<ListPage<BlockedAddress>> {
		blocked::list_active_paged(&self.db, page, page_size).await
	}

	// Events
	//********
	async fn insert_failed_attempt(&self, address: &str, occurred_at: Timestamp) -> WdResult<()> {
		events::insert_failed_attempt(&self.db, address, occurred_at).await
	}

	async fn count_failed_attempts(&self, address: &str, since: Timestamp) -> WdResult<u32> {
		events::count_failed_attempts(&self.db, address, since).await
	}

	async fn insert_rate_limit_violation(
		&self,
		address: &str,
		endpoint: &str,
		occurred_at: Timestamp,
	) -> WdResult<()> {
		events::insert_violation(&self.db, address, endpoint, occurred_at).await
	}

	async fn count_rate_limit_violations(
		&self,
		address: &str,
		since: Timestamp,
	) -> WdResult<u32> {
		events::count_violations(&self.db, address, since).await
	}
}

// vim: ts=4
