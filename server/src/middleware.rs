//! Admin API authentication

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::prelude::*;

/// Constant-time token check. Length mismatches compare unequal.
fn token_matches(provided: &str, expected: &str) -> bool {
	provided.trim().as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Require `Authorization: Bearer <ADMIN_TOKEN>`
pub async fn require_admin(State(app): State<App>, req: Request, next: Next) -> WdResult<Response> {
	let Some(expected) = app.admin_token.as_deref() else {
		return Err(Error::PermissionDenied);
	};

	let provided = req
		.headers()
		.get(AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.ok_or(Error::Unauthorized)?;

	if !token_matches(provided, expected) {
		warn!(path = %req.uri().path(), "Rejected admin request with invalid token");
		return Err(Error::Unauthorized);
	}

	Ok(next.run(req).await)
}


// vim: ts=4
