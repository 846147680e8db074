use axum::http::HeaderName;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use warden_core::guard::{ExtensionTier, HeaderTier};

use crate::handler;
use crate::middleware::require_admin;
use crate::prelude::*;

fn init_admin(app: &App) -> Router<App> {
	Router::new()
		.route("/api/admin/blocked", get(handler::list_blocked).post(handler::post_blocked))
		.route(
			"/api/admin/blocked/{address}",
			get(handler::get_blocked).delete(handler::delete_blocked),
		)
		.route("/api/auth/failed", post(handler::post_failed_attempt))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_admin))
}

fn init_guarded(app: &App, tier_header: Option<HeaderName>) -> Router<App> {
	let guard = match tier_header {
		Some(header) => app.warden.layer(HeaderTier::new(header)),
		None => app.warden.layer(ExtensionTier),
	};

	Router::new().route("/api/data", get(handler::get_data)).layer(guard)
}

pub fn init(app: App, tier_header: Option<HeaderName>) -> Router {
	let mut router = Router::new()
		.route("/health", get(handler::get_health))
		.merge(init_guarded(&app, tier_header));

	if app.admin_token.is_some() {
		router = router.merge(init_admin(&app));
	} else {
		warn!("ADMIN_TOKEN not set, admin API disabled");
	}

	router.layer(TraceLayer::new_for_http()).with_state(app)
}

// vim: ts=4
