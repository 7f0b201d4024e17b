use axum::{
	extract::{rejection::JsonRejection, FromRequest},
	response::{IntoResponse, Response},
	Json,
};
use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to API callers.
///
/// Domain errors carry a short message that is safe to show to the client.
/// Anything else collapses into `Server`, which is logged here and answered
/// with a generic 500.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	Validation(String),

	/// Wrong login credentials or an unusable password-reset token.
	#[error("{0}")]
	Credentials(String),

	/// Missing, malformed or expired bearer token.
	#[error("{0}")]
	Unauthorized(String),

	#[error("{0}")]
	Conflict(String),

	#[error(transparent)]
	Server(#[from] anyhow::Error),
}

/// JSON request body whose rejections answer like any other bad input.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::Validation(rejection.body_text())
	}
}

/// A status column held a value none of the known variants spell.
#[derive(Debug, Error)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(pub String);

impl ApiError {
	pub fn not_found(msg: impl Into<String>) -> Self {
		ApiError::NotFound(msg.into())
	}

	pub fn validation(msg: impl Into<String>) -> Self {
		ApiError::Validation(msg.into())
	}

	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::Validation(_) | ApiError::Credentials(_) => StatusCode::BAD_REQUEST,
			ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			ApiError::Conflict(_) => StatusCode::CONFLICT,
			ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let message = match &self {
			ApiError::Server(err) => {
				log::error!("request failed: {:#}", err);
				"Internal server error".to_string()
			}
			other => other.to_string(),
		};
		(status, Json(json!({ "message": message }))).into_response()
	}
}
