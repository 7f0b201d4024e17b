use std::collections::HashMap;

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hyper::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{Booking, BookingStatus, BookingWithCar, PaymentStatus, DEFAULT_PICKUP_LOCATION};
use crate::{
	app::AppState,
	error::{ApiError, Payload},
	store::Store,
	tokens::AuthUser,
};

const DAY_MS: i64 = 86_400_000;

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
	pub car_id: String,
	pub start_date: String,
	pub end_date: String,
	#[serde(default)]
	pub pickup_location: Option<String>,
}

/// Whole rental days covering `start..end`, rounding any part day up.
pub fn total_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
	let ms = (end - start).num_milliseconds();
	let days = ms.div_euclid(DAY_MS);
	if ms.rem_euclid(DAY_MS) == 0 {
		days
	} else {
		days + 1
	}
}

// Local date-times without an offset, as sent by `datetime-local` inputs.
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S%.f"];

/// RFC 3339 timestamps, or ISO dates and date-times without an offset, which
/// are taken as UTC (a bare date is midnight).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
	let raw = raw.trim();
	if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
		return Some(ts.with_timezone(&Utc));
	}
	if let Some(local) = LOCAL_FORMATS
		.iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
	{
		return Some(local.and_utc());
	}
	NaiveDate::parse_from_str(raw, "%Y-%m-%d")
		.ok()
		.and_then(|d| d.and_hms_opt(0, 0, 0))
		.map(|dt| dt.and_utc())
}

/// Prices a rental of one car and stores it as a Pending, unpaid booking.
pub async fn create_booking(store: &dyn Store, user_id: Uuid, request: NewBooking) -> Result<BookingWithCar, ApiError> {
	let car = match Uuid::parse_str(request.car_id.trim()) {
		Ok(id) => store.find_car(id).await?,
		Err(_) => None,
	};
	let Some(car) = car else {
		return Err(ApiError::not_found("Car not found"));
	};

	let (Some(start), Some(end)) = (parse_date(&request.start_date), parse_date(&request.end_date)) else {
		return Err(ApiError::validation("Invalid start or end date"));
	};
	if end <= start {
		return Err(ApiError::validation("End date must be after start date"));
	}

	let days = total_days(start, end);
	let pickup_location = request
		.pickup_location
		.map(|p| p.trim().to_owned())
		.filter(|p| !p.is_empty())
		.unwrap_or_else(|| DEFAULT_PICKUP_LOCATION.to_owned());

	let now = Utc::now();
	let booking = Booking {
		id: Uuid::new_v4(),
		user_id,
		car_id: car.id,
		start_date: start,
		end_date: end,
		total_days: days,
		total_price: car.price * days as f64,
		status: BookingStatus::Pending,
		pickup_location,
		payment_status: PaymentStatus::Pending,
		payment_method: None,
		payment_id: None,
		payment_date: None,
		customer_name: None,
		customer_email: None,
		customer_phone: None,
		created_at: now,
		updated_at: now,
	};
	store.insert_booking(&booking).await?;
	log::info!(
		"booking {} created for user {}: {} x {} days = {}",
		booking.id,
		user_id,
		car.name,
		days,
		booking.total_price
	);

	Ok(BookingWithCar { booking, car: Some(car) })
}

/// The user's bookings, newest first, each with its car.
pub async fn list_bookings(store: &dyn Store, user_id: Uuid) -> Result<Vec<BookingWithCar>, ApiError> {
	let bookings = store.list_bookings_for_user(user_id).await?;
	let cars: HashMap<Uuid, _> = store.list_cars().await?.into_iter().map(|c| (c.id, c)).collect();
	Ok(bookings
		.into_iter()
		.map(|booking| {
			let car = cars.get(&booking.car_id).cloned();
			BookingWithCar { booking, car }
		})
		.collect())
}

pub async fn book(
	State(state): State<AppState>,
	AuthUser(user): AuthUser,
	Payload(request): Payload<NewBooking>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
	let booking = create_booking(state.store.as_ref(), user.id, request).await?;
	Ok((
		StatusCode::CREATED,
		Json(json!({ "message": "Booking successful", "booking": booking })),
	))
}

pub async fn my_bookings(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<BookingWithCar>>, ApiError> {
	Ok(Json(list_bookings(state.store.as_ref(), user.id).await?))
}

#[cfg(test)]
mod tests {
	use axum::http::Method;
	use chrono::TimeZone;

	use super::*;
	use crate::{
		app::test_support::{app, seeded_store, send, sign_in},
		store::MemoryStore,
	};

	fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
	}

	fn request(car_id: Uuid, start: &str, end: &str) -> NewBooking {
		NewBooking {
			car_id: car_id.to_string(),
			start_date: start.into(),
			end_date: end.into(),
			pickup_location: None,
		}
	}

	async fn corolla(store: &MemoryStore) -> Uuid {
		store.list_cars().await.unwrap().into_iter().find(|c| c.name == "Toyota Corolla").unwrap().id
	}

	#[test]
	fn day_count_rounds_partial_days_up() {
		assert_eq!(total_days(utc(2024, 1, 1, 0), utc(2024, 1, 4, 0)), 3);
		assert_eq!(total_days(utc(2024, 1, 1, 0), utc(2024, 1, 1, 1)), 1);
		assert_eq!(total_days(utc(2024, 1, 1, 10), utc(2024, 1, 3, 9)), 2);
		assert_eq!(total_days(utc(2024, 1, 1, 10), utc(2024, 1, 3, 11)), 3);
		assert_eq!(total_days(utc(2024, 1, 2, 0), utc(2024, 1, 1, 1)), 0);
	}

	#[test]
	fn dates_parse_with_or_without_offset() {
		assert_eq!(parse_date("2024-01-04"), Some(utc(2024, 1, 4, 0)));
		assert_eq!(parse_date("2024-01-04T05:00:00Z"), Some(utc(2024, 1, 4, 5)));
		assert_eq!(parse_date("2024-01-04T07:00:00+02:00"), Some(utc(2024, 1, 4, 5)));
		assert_eq!(parse_date("2024-01-04T05:30"), Some(utc(2024, 1, 4, 5) + chrono::Duration::minutes(30)));
		assert_eq!(parse_date("2024-01-04T05:00:00"), Some(utc(2024, 1, 4, 5)));
		assert_eq!(parse_date("2024-01-04T05:00:00.250"), Some(utc(2024, 1, 4, 5) + chrono::Duration::milliseconds(250)));
		assert_eq!(parse_date("2024-01-04T25:00"), None);
		assert_eq!(parse_date("next tuesday"), None);
	}

	#[tokio::test]
	async fn three_day_corolla_costs_120() {
		let store = seeded_store().await;
		let user = Uuid::new_v4();
		let car_id = corolla(&store).await;

		let created = create_booking(store.as_ref(), user, request(car_id, "2024-01-01", "2024-01-04")).await.unwrap();
		assert_eq!(created.booking.total_days, 3);
		assert_eq!(created.booking.total_price, 120.0);
		assert_eq!(created.booking.status, BookingStatus::Pending);
		assert_eq!(created.booking.payment_status, PaymentStatus::Pending);
		assert_eq!(created.booking.pickup_location, DEFAULT_PICKUP_LOCATION);
		assert_eq!(created.car.unwrap().name, "Toyota Corolla");
	}

	#[tokio::test]
	async fn price_is_rate_times_days_for_every_car() {
		let store = seeded_store().await;
		let user = Uuid::new_v4();
		for car in store.list_cars().await.unwrap() {
			for (end, days) in [("2024-03-02T00:00:00Z", 1), ("2024-03-08T12:00:00Z", 8)] {
				let created = create_booking(store.as_ref(), user, request(car.id, "2024-03-01T00:00:00Z", end)).await.unwrap();
				assert_eq!(created.booking.total_days, days);
				assert_eq!(created.booking.total_price, car.price * days as f64);
			}
		}
	}

	#[tokio::test]
	async fn unknown_car_writes_nothing() {
		let store = seeded_store().await;
		let user = Uuid::new_v4();

		for car_id in [Uuid::new_v4().to_string(), "garbage".to_string()] {
			let req = NewBooking {
				car_id,
				start_date: "2024-01-01".into(),
				end_date: "2024-01-04".into(),
				pickup_location: None,
			};
			let err = create_booking(store.as_ref(), user, req).await.unwrap_err();
			assert!(matches!(err, ApiError::NotFound(_)));
		}
		assert!(store.list_bookings_for_user(user).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn inverted_dates_are_rejected() {
		let store = seeded_store().await;
		let car_id = corolla(&store).await;
		let user = Uuid::new_v4();
		for (start, end) in [("2024-01-04", "2024-01-01"), ("2024-01-04", "2024-01-04")] {
			let err = create_booking(store.as_ref(), user, request(car_id, start, end)).await.unwrap_err();
			assert!(matches!(err, ApiError::Validation(_)));
		}
		assert!(store.list_bookings_for_user(user).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn listing_is_own_and_newest_first() {
		let store = seeded_store().await;
		let app = app(store.clone(), true);
		let car_id = corolla(&store).await;
		let ann = sign_in(&app, "ann@example.com").await;
		let bob = sign_in(&app, "bob@example.com").await;

		for (token, start) in [(&ann, "2024-05-01"), (&bob, "2024-05-02"), (&ann, "2024-05-03")] {
			let body = json!({"carId": car_id, "startDate": start, "endDate": "2024-06-01", "pickupLocation": "Airport"});
			let (status, created) = send(&app, Method::POST, "/api/bookings", Some(token.as_str()), Some(body)).await;
			assert_eq!(status, StatusCode::CREATED);
			assert_eq!(created["message"], "Booking successful");
			assert_eq!(created["booking"]["pickupLocation"], "Airport");
			assert_eq!(created["booking"]["car"]["name"], "Toyota Corolla");
		}

		let (status, list) = send(&app, Method::GET, "/api/bookings/my-bookings", Some(&ann), None).await;
		assert_eq!(status, StatusCode::OK);
		let list = list.as_array().unwrap();
		assert_eq!(list.len(), 2);
		assert!(list[0]["startDate"].as_str().unwrap().starts_with("2024-05-03"));
		assert!(list[1]["startDate"].as_str().unwrap().starts_with("2024-05-01"));
		assert_eq!(list[0]["car"]["price"], 40.0);

		let (status, _) = send(&app, Method::GET, "/api/bookings/my-bookings", None, None).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn missing_start_date_is_a_bad_request() {
		let store = seeded_store().await;
		let app = app(store.clone(), true);
		let car_id = corolla(&store).await;
		let token = sign_in(&app, "ann@example.com").await;

		let body = json!({"carId": car_id, "endDate": "2024-01-04"});
		let (status, body) = send(&app, Method::POST, "/api/bookings", Some(&token), Some(body)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(body["message"].as_str().is_some_and(|m| m.contains("startDate")));
	}

	#[tokio::test]
	async fn datetime_local_dates_are_accepted() {
		let store = seeded_store().await;
		let app = app(store.clone(), true);
		let car_id = corolla(&store).await;
		let token = sign_in(&app, "ann@example.com").await;

		let body = json!({"carId": car_id, "startDate": "2024-01-01T10:00", "endDate": "2024-01-04T10:00"});
		let (status, created) = send(&app, Method::POST, "/api/bookings", Some(&token), Some(body)).await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(created["booking"]["totalDays"], 3);
		assert_eq!(created["booking"]["totalPrice"], 120.0);
	}

	#[tokio::test]
	async fn booking_a_missing_car_over_http_is_404() {
		let app = app(seeded_store().await, true);
		let token = sign_in(&app, "ann@example.com").await;
		let body = json!({"carId": Uuid::new_v4(), "startDate": "2024-01-01", "endDate": "2024-01-04"});
		let (status, body) = send(&app, Method::POST, "/api/bookings", Some(&token), Some(body)).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["message"], "Car not found");
	}
}
