pub mod jwt;
pub mod opaque;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use hyper::header::AUTHORIZATION;

use crate::{app::AppState, error::ApiError, users::User};

/// The caller behind a valid bearer token, loaded fresh from the store.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let token = parts
			.headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
			.filter(|token| !token.is_empty())
			.ok_or_else(|| ApiError::Unauthorized("No token".into()))?;

		let claims = state.tokens.verify(token).map_err(|e| {
			log::debug!("rejected bearer token: {}", e);
			ApiError::Unauthorized("Token invalid".into())
		})?;

		match state.store.find_user_by_id(claims.id).await? {
			Some(user) => Ok(AuthUser(user)),
			None => Err(ApiError::Unauthorized("Invalid token".into())),
		}
	}
}
