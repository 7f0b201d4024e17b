use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use tower_http::cors::CorsLayer;

use crate::{
	cars::cars::{get_car, get_cars},
	file_server::{image_handler, page_handler},
	payment_gateway::{
		payments::{create_intent, payment_history, process},
		simulator::ChargeSimulator,
	},
	rental::booking::{book, my_bookings},
	store::Store,
	tokens::jwt::TokenIssuer,
	users::{
		auth::{forgot_password, login, reset_password, signup},
		profile::{get_profile, update_profile},
	},
};

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
	pub store: Arc<dyn Store>,
	pub tokens: Arc<TokenIssuer>,
	pub charges: Arc<dyn ChargeSimulator>,
	pub reset_ttl: chrono::Duration,
	pub static_dir: Arc<str>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/auth/signup", post(signup))
		.route("/api/auth/login", post(login))
		.route("/api/auth/forgot-password", post(forgot_password))
		.route("/api/auth/reset-password", post(reset_password))
		.route("/api/cars", get(get_cars))
		.route("/api/cars/:id", get(get_car))
		.route("/api/bookings", post(book))
		.route("/api/bookings/my-bookings", get(my_bookings))
		.route("/api/users/profile", get(get_profile).put(update_profile))
		.route("/api/payments/create-intent", post(create_intent))
		.route("/api/payments/process", post(process))
		.route("/api/payments/history", get(payment_history))
		.route("/images/:file", get(image_handler))
		.route("/", get(page_handler))
		.route("/home", get(page_handler))
		.route("/cars", get(page_handler))
		.route("/booking", get(page_handler))
		.route("/profile", get(page_handler))
		.route("/contact", get(page_handler))
		.route("/payment", get(page_handler))
		.layer(CorsLayer::permissive())
		.with_state(state)
}

#[cfg(test)]
pub mod test_support {
	use std::sync::Arc;

	use axum::{
		body::Body,
		http::{header, Method, Request},
		Router,
	};
	use hyper::StatusCode;
	use serde_json::Value;
	use tower::ServiceExt;

	use super::{router, AppState};
	use crate::{
		cars::sample_fleet,
		payment_gateway::simulator::FixedCharge,
		store::{MemoryStore, Store},
		tokens::jwt::TokenIssuer,
	};

	pub fn state_with(store: Arc<MemoryStore>, approve: bool) -> AppState {
		AppState {
			store,
			tokens: Arc::new(TokenIssuer::new("test-secret", chrono::Duration::days(7))),
			charges: Arc::new(FixedCharge(approve)),
			reset_ttl: chrono::Duration::minutes(10),
			static_dir: Arc::from("public"),
		}
	}

	/// Memory store with the sample fleet already loaded.
	pub async fn seeded_store() -> Arc<MemoryStore> {
		let store = Arc::new(MemoryStore::new());
		store.insert_cars(&sample_fleet()).await.unwrap();
		store
	}

	pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
		let mut builder = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
		}
		let body = match body {
			Some(json) => {
				builder = builder.header(header::CONTENT_TYPE, "application/json");
				Body::from(json.to_string())
			}
			None => Body::empty(),
		};
		let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
		let status = resp.status();
		let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
		let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
		(status, json)
	}

	/// Registers and logs in a user, returning the bearer token.
	pub async fn sign_in(app: &Router, email: &str) -> String {
		let (status, _) = send(
			app,
			Method::POST,
			"/api/auth/signup",
			None,
			Some(serde_json::json!({"name": "Test Driver", "email": email, "password": "s3cret-pass"})),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);

		let (status, body) = send(
			app,
			Method::POST,
			"/api/auth/login",
			None,
			Some(serde_json::json!({"email": email, "password": "s3cret-pass"})),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		body["token"].as_str().unwrap().to_owned()
	}

	pub fn app(store: Arc<MemoryStore>, approve: bool) -> Router {
		router(state_with(store, approve))
	}
}
