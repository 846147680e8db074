//! Error type shared by the guard, its adapters and the server.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

pub type WdResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	Unauthorized,
	PermissionDenied,
	DbError,
	Timeout,
	ValidationError(String),
	ServiceUnavailable(String),
	NetworkError(String),
	ConfigError(String),
	Internal(String),
}

impl Error {
	/// Stable machine readable code, used in API responses and log fields
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-NOT-FOUND",
			Error::Unauthorized => "E-UNAUTHORIZED",
			Error::PermissionDenied => "E-PERMISSION-DENIED",
			Error::DbError => "E-DB",
			Error::Timeout => "E-TIMEOUT",
			Error::ValidationError(_) => "E-VALIDATION",
			Error::ServiceUnavailable(_) => "E-UNAVAILABLE",
			Error::NetworkError(_) => "E-NETWORK",
			Error::ConfigError(_) => "E-CONFIG",
			Error::Internal(_) => "E-INTERNAL",
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::Timeout => write!(f, "operation timed out"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::NetworkError(msg) => write!(f, "network error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Error::Internal(err.to_string())
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::ValidationError(err.to_string())
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
			Error::ServiceUnavailable(_) | Error::DbError => StatusCode::SERVICE_UNAVAILABLE,
			Error::NetworkError(_) => StatusCode::BAD_GATEWAY,
			Error::ConfigError(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};

		// Internal details stay in the logs
		let message = match &self {
			Error::ValidationError(msg) => msg.clone(),
			Error::NotFound => "Resource not found".to_string(),
			Error::Unauthorized => "Authentication required".to_string(),
			Error::PermissionDenied => "Access denied".to_string(),
			_ => "Internal server error".to_string(),
		};

		let body = serde_json::json!({
			"success": false,
			"error": self.code(),
			"message": message,
		});
		(status, Json(body)).into_response()
	}
}

// vim: ts=4
