pub mod cars;

use chrono::{DateTime, Utc};
use postgres_from_row::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
	pub id: Uuid,
	pub name: String,
	/// Daily rate.
	pub price: f64,
	pub image: String,
	#[serde(rename = "type")]
	pub car_type: String,
	pub seats: i32,
	pub transmission: String,
	pub fuel: String,
	pub available: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Car {
	pub fn new(name: &str, price: f64, image: &str, car_type: &str, seats: i32, transmission: &str, fuel: &str) -> Self {
		let now = Utc::now();
		Car {
			id: Uuid::new_v4(),
			name: name.to_owned(),
			price,
			image: image.to_owned(),
			car_type: car_type.to_owned(),
			seats,
			transmission: transmission.to_owned(),
			fuel: fuel.to_owned(),
			available: true,
			created_at: now,
			updated_at: now,
		}
	}
}

/// Fleet inserted into an empty catalog at startup.
pub fn sample_fleet() -> Vec<Car> {
	vec![
		Car::new("Toyota Corolla", 40.0, "images/1.jpeg", "Sedan", 5, "Automatic", "Petrol"),
		Car::new("Mercedes Benz", 120.0, "images/2.jpg", "Luxury", 5, "Automatic", "Petrol"),
		Car::new("Honda Civic", 55.0, "images/3.jpg", "Sedan", 5, "Automatic", "Petrol"),
		Car::new("Ford Mustang", 85.0, "images/4.jpeg", "Sports", 4, "Manual", "Petrol"),
		Car::new("Toyota RAV4", 65.0, "images/5.jpeg", "SUV", 5, "Automatic", "Hybrid"),
		Car::new("BMW 3 Series", 95.0, "images/6.jpeg", "Luxury", 5, "Automatic", "Petrol"),
	]
}
