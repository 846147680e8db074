//! HTTP handlers
//!
//! Admin operations on blocked addresses, the failed-attempt hook of the
//! authentication service, and the unguarded health probe.

use std::net::IpAddr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use warden_types::store_adapter::BlockedAddress;

use crate::prelude::*;
use crate::types::{
	ApiResponse, BlockRequest, FailedAttemptRequest, FailedAttemptResponse, HealthResponse,
	ListBlockedQuery, UnblockResponse,
};

const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_ACTOR: &str = "admin";

fn parse_address(address: &str) -> WdResult<IpAddr> {
	address
		.trim()
		.parse()
		.map_err(|_| Error::ValidationError(format!("invalid IP address: {}", address)))
}

/// GET /api/admin/blocked - List active blocks, newest first
pub async fn list_blocked(
	State(app): State<App>,
	Query(query): Query<ListBlockedQuery>,
) -> WdResult<Json<ApiResponse<ListPage<BlockedAddress>>>> {
	let page = query.page.unwrap_or(1);
	let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
	let blocked = app.warden.registry.list_blocked(page, limit).await?;
	Ok(Json(ApiResponse::new(blocked)))
}

/// GET /api/admin/blocked/{address} - Read the record of one address
pub async fn get_blocked(
	State(app): State<App>,
	Path(address): Path<String>,
) -> WdResult<Json<ApiResponse<BlockedAddress>>> {
	let ip = parse_address(&address)?;
	let record = app.warden.registry.read(ip).await?.ok_or(Error::NotFound)?;
	Ok(Json(ApiResponse::new(record)))
}

/// POST /api/admin/blocked - Block an address
pub async fn post_blocked(
	State(app): State<App>,
	Json(req): Json<BlockRequest>,
) -> WdResult<(StatusCode, Json<ApiResponse<BlockedAddress>>)> {
	let ip = parse_address(&req.address)?;
	let expires_at = req.expires_at.as_deref().map(Timestamp::from_iso_str).transpose()?;
	let actor = req.actor.as_deref().map(str::trim).filter(|a| !a.is_empty());

	info!(address = %ip, "POST /api/admin/blocked");
	let record = app
		.warden
		.registry
		.block(ip, actor.unwrap_or(DEFAULT_ACTOR), req.reason.as_deref(), expires_at)
		.await?;
	Ok((StatusCode::CREATED, Json(ApiResponse::new(record))))
}

/// DELETE /api/admin/blocked/{address} - Unblock an address
pub async fn delete_blocked(
	State(app): State<App>,
	Path(address): Path<String>,
) -> WdResult<Json<ApiResponse<UnblockResponse>>> {
	let ip = parse_address(&address)?;

	info!(address = %ip, "DELETE /api/admin/blocked");
	let unblocked = app.warden.registry.unblock(ip).await?;
	// Start the caller with fresh windows
	app.warden.limiter.forget(ip);

	Ok(Json(ApiResponse::new(UnblockResponse { address: ip.to_string(), unblocked })))
}

/// POST /api/auth/failed - Report a failed authentication attempt
pub async fn post_failed_attempt(
	State(app): State<App>,
	Json(req): Json<FailedAttemptRequest>,
) -> WdResult<Json<ApiResponse<FailedAttemptResponse>>> {
	let ip = parse_address(&req.address)?;
	let failed_attempts = app.warden.tracker.record_failed_attempt(ip).await?;

	Ok(Json(ApiResponse::new(FailedAttemptResponse {
		address: ip.to_string(),
		failed_attempts,
		blocked: app.warden.registry.is_blocked(ip),
	})))
}

/// GET /health
pub async fn get_health(State(app): State<App>) -> Json<ApiResponse<HealthResponse>> {
	let registry = &app.warden.registry;
	Json(ApiResponse::new(HealthResponse {
		status: "ok",
		cached_blocks: registry.cached_count(),
		last_synced_at: registry.last_synced_at().map(Timestamp::to_iso_string),
		background_running: registry.is_running(),
	}))
}

/// GET /api/data - Example resource behind the guard
pub async fn get_data() -> Json<ApiResponse<serde_json::Value>> {
	Json(ApiResponse::new(serde_json::json!({ "message": "Access granted" })))
}

// vim: ts=4
