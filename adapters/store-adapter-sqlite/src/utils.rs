//! Utility functions for database operations

use sqlx::sqlite::SqliteRow;

use warden_types::prelude::*;

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a query error to `Error::DbError`, logging it
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::DbError
}

/// Map an optional row to a value using a closure
pub(crate) fn map_opt<T, F>(row: Result<Option<SqliteRow>, sqlx::Error>, f: F) -> WdResult<Option<T>>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(Some(ref row)) => f(row).map(Some).map_err(db_err),
		Ok(None) => Ok(None),
		Err(err) => Err(db_err(err)),
	}
}

/// Collect result iterator into a vector
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>>,
) -> WdResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.map_err(db_err)?);
	}
	Ok(items)
}

/// Convert a `COUNT(*)` result, saturating at `u32::MAX`
pub(crate) fn count_u32(count: i64) -> u32 {
	u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

// vim: ts=4
