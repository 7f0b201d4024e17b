use axum::{
	extract::{Path, State},
	Json,
};
use uuid::Uuid;

use super::{sample_fleet, Car};
use crate::{app::AppState, error::ApiError, store::Store};

pub async fn get_cars(State(state): State<AppState>) -> Result<Json<Vec<Car>>, ApiError> {
	Ok(Json(state.store.list_cars().await?))
}

pub async fn get_car(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Car>, ApiError> {
	// an id that is not even a uuid cannot name a car
	let Ok(id) = Uuid::parse_str(&id) else {
		return Err(ApiError::not_found("Car not found"));
	};
	match state.store.find_car(id).await? {
		Some(car) => Ok(Json(car)),
		None => Err(ApiError::not_found("Car not found")),
	}
}

/// Fills an empty catalog with the sample fleet. Returns how many cars were added.
pub async fn seed_catalog(store: &dyn Store) -> anyhow::Result<usize> {
	if store.count_cars().await? > 0 {
		return Ok(0);
	}
	let fleet = sample_fleet();
	store.insert_cars(&fleet).await?;
	Ok(fleet.len())
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use axum::http::Method;
	use hyper::StatusCode;

	use super::*;
	use crate::{
		app::test_support::{app, send},
		store::MemoryStore,
	};

	#[tokio::test]
	async fn seeding_only_fills_an_empty_catalog() {
		let store = MemoryStore::new();
		assert_eq!(seed_catalog(&store).await.unwrap(), 6);
		assert_eq!(seed_catalog(&store).await.unwrap(), 0);
		assert_eq!(store.count_cars().await.unwrap(), 6);
	}

	#[tokio::test]
	async fn catalog_lookup() {
		let store = Arc::new(MemoryStore::new());
		seed_catalog(store.as_ref()).await.unwrap();
		let app = app(store, true);

		let (status, body) = send(&app, Method::GET, "/api/cars", None, None).await;
		assert_eq!(status, StatusCode::OK);
		let cars = body.as_array().unwrap();
		assert_eq!(cars.len(), 6);
		assert_eq!(cars[0]["name"], "Toyota Corolla");
		assert_eq!(cars[0]["type"], "Sedan");

		let id = cars[3]["id"].as_str().unwrap();
		let (status, body) = send(&app, Method::GET, &format!("/api/cars/{}", id), None, None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["name"], "Ford Mustang");
		assert_eq!(body["transmission"], "Manual");

		let (status, _) = send(&app, Method::GET, &format!("/api/cars/{}", Uuid::new_v4()), None, None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		let (status, body) = send(&app, Method::GET, "/api/cars/not-an-id", None, None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["message"], "Car not found");
	}
}
