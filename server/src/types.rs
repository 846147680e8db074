//! API response envelope and request bodies.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
	pub success: bool,
	pub data: T,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { success: true, data }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListBlockedQuery {
	pub page: Option<u32>,
	pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
	pub address: String,
	pub reason: Option<String>,
	/// ISO 8601 instant; absent means indefinite
	pub expires_at: Option<String>,
	pub actor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailedAttemptRequest {
	pub address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnblockResponse {
	pub address: String,
	pub unblocked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedAttemptResponse {
	pub address: String,
	pub failed_attempts: u32,
	pub blocked: bool,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
	pub status: &'static str,
	pub cached_blocks: usize,
	pub last_synced_at: Option<String>,
	pub background_running: bool,
}

// vim: ts=4
