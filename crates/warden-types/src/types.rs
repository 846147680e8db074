//! Common types used throughout the guard.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::prelude::*;

/// Actor id recorded on blocks created by automatic escalation
pub const SYSTEM_ACTOR: &str = "system";

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn after(self, duration: Duration) -> Self {
		Timestamp(self.0.saturating_add(duration_secs(duration)))
	}

	pub fn before(self, duration: Duration) -> Self {
		Timestamp(self.0.saturating_sub(duration_secs(duration)))
	}

	/// RFC 3339 rendering, falls back to the raw number for out of range values
	pub fn to_iso_string(self) -> String {
		DateTime::<Utc>::from_timestamp(self.0, 0).map_or_else(
			|| self.0.to_string(),
			|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true),
		)
	}

	pub fn from_iso_str(s: &str) -> WdResult<Self> {
		DateTime::parse_from_rfc3339(s)
			.map(|dt| Timestamp(dt.timestamp()))
			.map_err(|e| Error::ValidationError(format!("invalid timestamp '{}': {}", s, e)))
	}
}

fn duration_secs(duration: Duration) -> i64 {
	i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

pub fn now() -> Timestamp {
	let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
	Timestamp(duration_secs(res))
}

pub fn serialize_timestamp_iso<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
{
	serializer.serialize_str(&ts.to_iso_string())
}

pub fn serialize_timestamp_iso_opt<S>(
	ts: &Option<Timestamp>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
{
	match ts {
		Some(ts) => serializer.serialize_str(&ts.to_iso_string()),
		None => serializer.serialize_none(),
	}
}

// Tier //
//******//
/// Caller classification selecting a rate limit window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
	Free,
	Basic,
	Premium,
}

impl Tier {
	pub fn as_str(&self) -> &'static str {
		match self {
			Tier::Free => "FREE",
			Tier::Basic => "BASIC",
			Tier::Premium => "PREMIUM",
		}
	}
}

impl std::fmt::Display for Tier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Tier {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"FREE" => Ok(Tier::Free),
			"BASIC" => Ok(Tier::Basic),
			"PREMIUM" => Ok(Tier::Premium),
			other => Err(Error::ValidationError(format!("unknown tier: {}", other))),
		}
	}
}

// ListPage //
//**********//
/// One page of a store-backed listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
	pub items: Vec<T>,
	pub total: u64,
	pub page: u32,
	pub page_size: u32,
}


// vim: ts=4
