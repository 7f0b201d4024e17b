use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use super::User;
use crate::{
	app::AppState,
	error::{ApiError, Payload},
	tokens::AuthUser,
};

/// Fields a customer may change on their own profile. Absent fields keep
/// their stored value.
#[derive(serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
	name: Option<String>,
	phone: Option<String>,
	address: Option<String>,
	license_number: Option<String>,
}

pub async fn get_profile(AuthUser(user): AuthUser) -> Json<User> {
	Json(user)
}

pub async fn update_profile(
	State(state): State<AppState>,
	AuthUser(mut user): AuthUser,
	Payload(update): Payload<ProfileUpdate>,
) -> Result<Json<Value>, ApiError> {
	if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
		user.name = name.trim().to_owned();
	}
	if update.phone.is_some() {
		user.phone = update.phone;
	}
	if update.address.is_some() {
		user.address = update.address;
	}
	if update.license_number.is_some() {
		user.license_number = update.license_number;
	}
	user.updated_at = Utc::now();
	state.store.update_user(&user).await?;

	Ok(Json(json!({ "message": "Profile updated", "user": user })))
}
