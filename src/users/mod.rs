pub mod auth;
pub mod password;
pub mod profile;

use chrono::{DateTime, Utc};
use postgres_from_row::FromRow;
use uuid::Uuid;

/// A registered customer.
///
/// Credentials and the pending reset token never leave the server: they are
/// skipped when the user is serialized into a response.
#[derive(Debug, Clone, serde::Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	#[serde(skip_serializing)]
	pub password_hash: String,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub license_number: Option<String>,
	#[serde(skip_serializing)]
	pub reset_token: Option<String>,
	#[serde(skip_serializing)]
	pub reset_token_expire: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	pub fn new(name: String, email: String, password_hash: String) -> Self {
		let now = Utc::now();
		User {
			id: Uuid::new_v4(),
			name,
			email,
			password_hash,
			phone: None,
			address: None,
			license_number: None,
			reset_token: None,
			reset_token_expire: None,
			created_at: now,
			updated_at: now,
		}
	}
}
