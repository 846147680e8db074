//! Failed attempt and rate limit violation events

use sqlx::SqlitePool;

use warden_types::prelude::*;

use crate::utils::{count_u32, db_err};

pub(crate) async fn insert_failed_attempt(
	db: &SqlitePool,
	address: &str,
	at: Timestamp,
) -> WdResult<()> {
	sqlx::query("INSERT INTO failed_attempts (address, occurred_at) VALUES (?1, ?2)")
		.bind(address)
		.bind(at.0)
		.execute(db)
		.await
		.map_err(db_err)?;
	Ok(())
}

pub(crate) async fn count_failed_attempts(
	db: &SqlitePool,
	address: &str,
	since: Timestamp,
) -> WdResult<u32> {
	let count: i64 = sqlx::query_scalar(
		"SELECT COUNT(*) FROM failed_attempts WHERE address = ?1 AND occurred_at >= ?2",
	)
	.bind(address)
	.bind(since.0)
	.fetch_one(db)
	.await
	.map_err(db_err)?;
	Ok(count_u32(count))
}

pub(crate) async fn insert_violation(
	db: &SqlitePool,
	address: &str,
	endpoint: &str,
	at: Timestamp,
) -> WdResult<()> {
	sqlx::query(
		"INSERT INTO rate_limit_violations (address, endpoint, occurred_at) VALUES (?1, ?2, ?3)",
	)
	.bind(address)
	.bind(endpoint)
	.bind(at.0)
	.execute(db)
	.await
	.map_err(db_err)?;
	Ok(())
}

pub(crate) async fn count_violations(
	db: &SqlitePool,
	address: &str,
	since: Timestamp,
) -> WdResult<u32> {
	let count: i64 = sqlx::query_scalar(
		"SELECT COUNT(*) FROM rate_limit_violations WHERE address = ?1 AND occurred_at >= ?2",
	)
	.bind(address)
	.bind(since.0)
	.fetch_one(db)
	.await
	.map_err(db_err)?;
	Ok(count_u32(count))
}

// vim: ts=4
