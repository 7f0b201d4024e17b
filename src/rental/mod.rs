pub mod booking;

use chrono::{DateTime, Utc};
use postgres_from_row::FromRow;
use uuid::Uuid;

use crate::{cars::Car, error::UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BookingStatus {
	Pending,
	Confirmed,
	Cancelled,
}

impl BookingStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			BookingStatus::Pending => "Pending",
			BookingStatus::Confirmed => "Confirmed",
			BookingStatus::Cancelled => "Cancelled",
		}
	}
}

impl TryFrom<String> for BookingStatus {
	type Error = UnknownStatus;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		match s.as_str() {
			"Pending" => Ok(BookingStatus::Pending),
			"Confirmed" => Ok(BookingStatus::Confirmed),
			"Cancelled" => Ok(BookingStatus::Cancelled),
			_ => Err(UnknownStatus(s)),
		}
	}
}

/// Where a booking stands with respect to money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PaymentStatus {
	Pending,
	Paid,
	Failed,
	Refunded,
}

impl PaymentStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			PaymentStatus::Pending => "Pending",
			PaymentStatus::Paid => "Paid",
			PaymentStatus::Failed => "Failed",
			PaymentStatus::Refunded => "Refunded",
		}
	}
}

impl TryFrom<String> for PaymentStatus {
	type Error = UnknownStatus;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		match s.as_str() {
			"Pending" => Ok(PaymentStatus::Pending),
			"Paid" => Ok(PaymentStatus::Paid),
			"Failed" => Ok(PaymentStatus::Failed),
			"Refunded" => Ok(PaymentStatus::Refunded),
			_ => Err(UnknownStatus(s)),
		}
	}
}

pub const DEFAULT_PICKUP_LOCATION: &str = "Main Office";

#[derive(Debug, Clone, serde::Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
	pub id: Uuid,
	pub user_id: Uuid,
	pub car_id: Uuid,
	pub start_date: DateTime<Utc>,
	pub end_date: DateTime<Utc>,
	pub total_days: i64,
	pub total_price: f64,
	pub status: BookingStatus,
	pub pickup_location: String,
	pub payment_status: PaymentStatus,
	pub payment_method: Option<String>,
	pub payment_id: Option<Uuid>,
	pub payment_date: Option<DateTime<Utc>>,
	pub customer_name: Option<String>,
	pub customer_email: Option<String>,
	pub customer_phone: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A booking with its car inlined, the shape every booking endpoint returns.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BookingWithCar {
	#[serde(flatten)]
	pub booking: Booking,
	pub car: Option<Car>,
}
