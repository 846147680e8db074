//! Blocked address records

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use warden_types::prelude::*;
use warden_types::store_adapter::{BlockedAddress, UpsertBlockedAddress};

use crate::utils::{collect_res, db_err, map_opt};

const COLUMNS: &str = "address, reason, blocked_by, expires_at, is_active, created_at";

fn row_to_blocked(row: &SqliteRow) -> Result<BlockedAddress, sqlx::Error> {
	Ok(BlockedAddress {
		address: row.try_get::<String, _>("address")?.into(),
		reason: row.try_get::<Option<String>, _>("reason")?.map(Into::into),
		blocked_by: row.try_get::<String, _>("blocked_by")?.into(),
		expires_at: row.try_get::<Option<i64>, _>("expires_at")?.map(Timestamp),
		is_active: row.try_get("is_active")?,
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

/// Insert or reactivate a block. `created_at` of an existing row is kept.
pub(crate) async fn upsert(
	db: &SqlitePool,
	opts: &UpsertBlockedAddress<'_>,
) -> WdResult<BlockedAddress> {
	let row = sqlx::query(&format!(
		"INSERT INTO blocked_addresses
			(address, reason, blocked_by, expires_at, is_active, created_at, updated_at)
		VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
		ON CONFLICT(address) DO UPDATE SET
			reason = excluded.reason,
			blocked_by = excluded.blocked_by,
			expires_at = excluded.expires_at,
			is_active = 1,
			updated_at = excluded.updated_at
		RETURNING {}",
		COLUMNS
	))
	.bind(opts.address)
	.bind(opts.reason)
	.bind(opts.blocked_by)
	.bind(opts.expires_at.map(|ts| ts.0))
	.bind(opts.now.0)
	.fetch_one(db)
	.await
	.map_err(db_err)?;

	row_to_blocked(&row).map_err(db_err)
}

/// Active blocks that have not expired at `as_of`
pub(crate) async fn list_active(db: &SqlitePool, as_of: Timestamp) -> WdResult<Vec<BlockedAddress>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM blocked_addresses
		WHERE is_active = 1 AND (expires_at IS NULL OR expires_at > ?1)",
		COLUMNS
	))
	.bind(as_of.0)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	collect_res(rows.iter().map(row_to_blocked))
}

/// Active blocks whose expiry is at or before `as_of`
pub(crate) async fn list_expired(
	db: &SqlitePool,
	as_of: Timestamp,
) -> WdResult<Vec<BlockedAddress>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM blocked_addresses
		WHERE is_active = 1 AND expires_at IS NOT NULL AND expires_at <= ?1",
		COLUMNS
	))
	.bind(as_of.0)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	collect_res(rows.iter().map(row_to_blocked))
}

pub(crate) async fn deactivate(db: &SqlitePool, address: &str) -> WdResult<bool> {
	let res = sqlx::query(
		"UPDATE blocked_addresses SET is_active = 0, updated_at = unixepoch()
		WHERE address = ?1 AND is_active = 1",
	)
	.bind(address)
	.execute(db)
	.await
	.map_err(db_err)?;

	Ok(res.rows_affected() > 0)
}

pub(crate) async fn read(db: &SqlitePool, address: &str) -> WdResult<Option<BlockedAddress>> {
	let row = sqlx::query(&format!("SELECT {} FROM blocked_addresses WHERE address = ?1", COLUMNS))
		.bind(address)
		.fetch_optional(db)
		.await;

	map_opt(row, row_to_blocked)
}

/// One page of active blocks, newest first
pub(crate) async fn list_active_paged(
	db: &SqlitePool,
	page: u32,
	page_size: u32,
) -> WdResult<ListPage<BlockedAddress>> {
	let total: i64 =
		sqlx::query_scalar("SELECT COUNT(*) FROM blocked_addresses WHERE is_active = 1")
			.fetch_one(db)
			.await
			.map_err(db_err)?;

	let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
	let rows = sqlx::query(&format!(
		"SELECT {} FROM blocked_addresses WHERE is_active = 1
		ORDER BY created_at DESC, address ASC
		LIMIT ?1 OFFSET ?2",
		COLUMNS
	))
	.bind(i64::from(page_size))
	.bind(offset)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	Ok(ListPage {
		items: collect_res(rows.iter().map(row_to_blocked))?,
		total: u64::try_from(total).unwrap_or_default(),
		page,
		page_size,
	})
}

// vim: ts=4
