//! Admin API and guarded route tests
//!
//! Drives the full router with `tower::ServiceExt::oneshot`, backed by the
//! in-memory store (and SQLite for the persistence round trip).

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use warden_core::Warden;
use warden_core::guard::GuardConfig;
use warden_core::memory_store::InMemoryStoreAdapter;
use warden_server::{AppState, routes};
use warden_store_adapter_sqlite::StoreAdapterSqlite;
use warden_types::store_adapter::StoreAdapter;

const TOKEN: &str = "test-token";

fn router_with(store: Arc<dyn StoreAdapter>, admin_token: Option<&str>) -> (Warden, Router) {
	let warden = Warden::new(GuardConfig::default(), store, None);
	let app = AppState::new(warden.clone(), admin_token.map(Into::into));
	(warden, routes::init(app, None))
}

fn router() -> (Warden, Router) {
	router_with(Arc::new(InMemoryStoreAdapter::new()), Some(TOKEN))
}

fn admin(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
	let builder = Request::builder()
		.method(method)
		.uri(uri)
		.header("authorization", format!("Bearer {}", TOKEN))
		.header("content-type", "application/json");
	match body {
		Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
		None => builder.body(Body::empty()).unwrap(),
	}
}

fn data_request(ip: &str) -> Request<Body> {
	Request::builder().uri("/api/data").header("x-forwarded-for", ip).body(Body::empty()).unwrap()
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
	let res = router.clone().oneshot(req).await.unwrap();
	let status = res.status();
	let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
	let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
	(status, json)
}

#[tokio::test]
async fn test_admin_requires_token() {
	let (_warden, router) = router();

	let req = Request::builder().uri("/api/admin/blocked").body(Body::empty()).unwrap();
	let (status, body) = send(&router, req).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body["success"], false);

	let req = Request::builder()
		.uri("/api/admin/blocked")
		.header("authorization", "Bearer wrong")
		.body(Body::empty())
		.unwrap();
	assert_eq!(send(&router, req).await.0, StatusCode::UNAUTHORIZED);

	// Prefix of the real token
	let req = Request::builder()
		.uri("/api/admin/blocked")
		.header("authorization", "Bearer test")
		.body(Body::empty())
		.unwrap();
	assert_eq!(send(&router, req).await.0, StatusCode::UNAUTHORIZED);

	let (status, _) = send(&router, admin(Method::GET, "/api/admin/blocked", None)).await;
	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_disabled_without_token() {
	let (_warden, router) = router_with(Arc::new(InMemoryStoreAdapter::new()), None);
	let (status, _) = send(&router, admin(Method::GET, "/api/admin/blocked", None)).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// The guarded API still works
	assert_eq!(send(&router, data_request("198.51.100.1")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_block_list_and_unblock() {
	let (_warden, router) = router();
	let ip = "198.51.100.23";

	assert_eq!(send(&router, data_request(ip)).await.0, StatusCode::OK);

	let (status, body) = send(
		&router,
		admin(Method::POST, "/api/admin/blocked", Some(json!({ "address": ip, "reason": "scraping" }))),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["data"]["address"], ip);
	assert_eq!(body["data"]["blockedBy"], "admin");
	assert_eq!(body["data"]["isActive"], true);

	let (status, body) = send(&router, data_request(ip)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["error"], "Access denied");

	let (status, body) = send(&router, admin(Method::GET, "/api/admin/blocked?page=1&limit=10", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["total"], 1);
	assert_eq!(body["data"]["items"][0]["reason"], "scraping");

	let uri = format!("/api/admin/blocked/{}", ip);
	let (status, body) = send(&router, admin(Method::DELETE, &uri, None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["unblocked"], true);
	assert_eq!(send(&router, data_request(ip)).await.0, StatusCode::OK);

	let (status, body) = send(&router, admin(Method::GET, &uri, None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["isActive"], false);

	// Unblocking again is a no-op
	let (_, body) = send(&router, admin(Method::DELETE, &uri, None)).await;
	assert_eq!(body["data"]["unblocked"], false);
}

#[tokio::test]
async fn test_invalid_input() {
	let (_warden, router) = router();

	let (status, body) = send(
		&router,
		admin(Method::POST, "/api/admin/blocked", Some(json!({ "address": "not-an-ip" }))),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "E-VALIDATION");

	let (status, _) = send(
		&router,
		admin(
			Method::POST,
			"/api/admin/blocked",
			Some(json!({ "address": "10.0.0.1", "expiresAt": "2001-01-01T00:00:00Z" })),
		),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = send(&router, admin(Method::GET, "/api/admin/blocked/10.9.9.9", None)).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_attempts_hook_blocks() {
	let (warden, router) = router();
	let ip = "192.0.2.44";

	for expected in 1..=4 {
		let (status, body) = send(
			&router,
			admin(Method::POST, "/api/auth/failed", Some(json!({ "address": ip }))),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["data"]["failedAttempts"], expected);
		assert_eq!(body["data"]["blocked"], false);
	}

	let (_, body) =
		send(&router, admin(Method::POST, "/api/auth/failed", Some(json!({ "address": ip })))).await;
	assert_eq!(body["data"]["blocked"], true);
	assert!(warden.registry.is_blocked(ip.parse().unwrap()));
	assert_eq!(send(&router, data_request(ip)).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health() {
	let (_warden, router) = router();
	let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
	let (status, body) = send(&router, req).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["status"], "ok");
	assert_eq!(body["data"]["cachedBlocks"], 0);
	assert_eq!(body["data"]["backgroundRunning"], false);
}

#[tokio::test]
async fn test_blocks_survive_restart_with_sqlite() {
	let temp_dir = tempfile::TempDir::new().unwrap();
	let path = temp_dir.path().join("warden.db");

	{
		let store = Arc::new(StoreAdapterSqlite::new(&path).await.unwrap());
		let (_warden, router) = router_with(store, Some(TOKEN));
		let (status, _) = send(
			&router,
			admin(Method::POST, "/api/admin/blocked", Some(json!({ "address": "203.0.113.9" }))),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
	}

	// A fresh process only knows the block after its first refresh
	let store = Arc::new(StoreAdapterSqlite::new(&path).await.unwrap());
	let (warden, router) = router_with(store, Some(TOKEN));
	assert_eq!(send(&router, data_request("203.0.113.9")).await.0, StatusCode::OK);

	warden.registry.refresh().await.unwrap();
	assert_eq!(send(&router, data_request("203.0.113.9")).await.0, StatusCode::FORBIDDEN);
}

// vim: ts=4
