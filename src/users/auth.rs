use axum::{extract::State, Json};
use chrono::Utc;
use hyper::StatusCode;
use serde_json::{json, Value};

use super::{
	password::{hash_password, verify_password},
	User,
};
use crate::{
	app::AppState,
	error::{ApiError, Payload},
	store::DuplicateEmail,
	tokens::opaque::reset_token,
};

const BAD_LOGIN: &str = "Invalid email or password";
const USER_EXISTS: &str = "User already exists with this email";

#[derive(serde::Deserialize, Debug)]
pub struct Signup {
	#[serde(default)]
	name: String,
	#[serde(default)]
	email: String,
	#[serde(default)]
	password: String,
}

#[derive(serde::Deserialize, Debug)]
pub struct Logins {
	#[serde(default)]
	email: String,
	#[serde(default)]
	password: String,
}

#[derive(serde::Deserialize, Debug)]
pub struct ForgotPassword {
	#[serde(default)]
	email: String,
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPassword {
	#[serde(default)]
	reset_token: String,
	#[serde(default)]
	new_password: String,
}

fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

pub async fn signup(State(state): State<AppState>, Payload(form): Payload<Signup>) -> Result<(StatusCode, Json<Value>), ApiError> {
	let email = normalize_email(&form.email);
	if form.name.trim().is_empty() || email.is_empty() || form.password.is_empty() {
		return Err(ApiError::validation("Name, email and password are required"));
	}
	if state.store.find_user_by_email(&email).await?.is_some() {
		return Err(ApiError::validation(USER_EXISTS));
	}

	let user = User::new(form.name.trim().to_owned(), email, hash_password(&form.password)?);
	// a concurrent signup can still win between the lookup and the insert
	if let Err(err) = state.store.insert_user(&user).await {
		if err.is::<DuplicateEmail>() {
			return Err(ApiError::validation(USER_EXISTS));
		}
		return Err(err.into());
	}
	log::info!("registered user {}", user.id);

	Ok((
		StatusCode::CREATED,
		Json(json!({ "message": "Registration successful! You can now login." })),
	))
}

pub async fn login(State(state): State<AppState>, Payload(logins): Payload<Logins>) -> Result<Json<Value>, ApiError> {
	let email = normalize_email(&logins.email);
	let Some(user) = state.store.find_user_by_email(&email).await? else {
		return Err(ApiError::Credentials(BAD_LOGIN.into()));
	};
	if !verify_password(&logins.password, &user.password_hash)? {
		return Err(ApiError::Credentials(BAD_LOGIN.into()));
	}

	let token = state.tokens.issue(user.id, &user.email)?;
	Ok(Json(json!({
		"message": "Login successful!",
		"token": token,
		"user": { "id": user.id, "name": user.name, "email": user.email },
	})))
}

/// Issues a short-lived reset token. There is no mail delivery, so the token
/// goes back in the response body.
pub async fn forgot_password(State(state): State<AppState>, Payload(form): Payload<ForgotPassword>) -> Result<Json<Value>, ApiError> {
	let Some(mut user) = state.store.find_user_by_email(&normalize_email(&form.email)).await? else {
		return Err(ApiError::not_found("Email not found"));
	};

	let token = reset_token();
	let now = Utc::now();
	user.reset_token = Some(token.clone());
	user.reset_token_expire = Some(now + state.reset_ttl);
	user.updated_at = now;
	state.store.update_user(&user).await?;

	Ok(Json(json!({ "message": "Password reset token generated", "resetToken": token })))
}

pub async fn reset_password(State(state): State<AppState>, Payload(form): Payload<ResetPassword>) -> Result<Json<Value>, ApiError> {
	let now = Utc::now();
	let user = if form.reset_token.is_empty() {
		None
	} else {
		state.store.find_user_by_reset_token(&form.reset_token, now).await?
	};
	let Some(mut user) = user else {
		return Err(ApiError::Credentials("Invalid or expired reset token".into()));
	};
	if form.new_password.is_empty() {
		return Err(ApiError::validation("New password is required"));
	}

	user.password_hash = hash_password(&form.new_password)?;
	user.reset_token = None;
	user.reset_token_expire = None;
	user.updated_at = now;
	state.store.update_user(&user).await?;
	log::info!("password reset for user {}", user.id);

	Ok(Json(json!({ "message": "Password reset successful" })))
}
