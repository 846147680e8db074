//! Guard Rejection Types
//!
//! Rejections produced on the request path. Each one renders the
//! `{success: false, error, message}` body expected by API clients.

use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Request rejected by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
	/// Caller address is blocked. The block reason is never exposed.
	Blocked,
	/// Fixed window exceeded
	RateLimited {
		message: Box<str>,
		/// Time until the current window closes
		retry_after: Duration,
	},
	/// No client address could be determined for the request
	InvalidAddress,
}

impl GuardError {
	pub fn status(&self) -> StatusCode {
		match self {
			GuardError::Blocked => StatusCode::FORBIDDEN,
			GuardError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
			GuardError::InvalidAddress => StatusCode::BAD_REQUEST,
		}
	}
}

impl std::fmt::Display for GuardError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			GuardError::Blocked => write!(f, "Address blocked"),
			GuardError::RateLimited { retry_after, .. } => {
				write!(f, "Rate limited, retry after {:?}", retry_after)
			}
			GuardError::InvalidAddress => write!(f, "Unable to determine client address"),
		}
	}
}

impl std::error::Error for GuardError {}

impl IntoResponse for GuardError {
	fn into_response(self) -> Response {
		let status = self.status();
		match self {
			GuardError::Blocked => {
				let body = serde_json::json!({
					"success": false,
					"error": "Access denied",
					"message": "Access to this resource has been denied.",
				});
				(status, Json(body)).into_response()
			}
			GuardError::RateLimited { message, retry_after } => {
				// Round up so clients never retry inside the window
				let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
				let body = serde_json::json!({
					"success": false,
					"error": "Too many requests",
					"message": message,
				});

				let mut response = (status, Json(body)).into_response();
				if let Ok(val) = retry_secs.to_string().parse() {
					response.headers_mut().insert("Retry-After", val);
				}
				response
			}
			GuardError::InvalidAddress => {
				let body = serde_json::json!({
					"success": false,
					"error": "Bad request",
					"message": "Unable to determine client address.",
				});
				(status, Json(body)).into_response()
			}
		}
	}
}


// vim: ts=4
