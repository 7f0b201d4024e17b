pub mod card;
pub mod payments;
pub mod simulator;

use chrono::{DateTime, Utc};
use postgres_from_row::FromRow;
use uuid::Uuid;

use crate::{error::UnknownStatus, rental::Booking};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Lifecycle of a ledger entry. Only `Completed` is ever written today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ChargeStatus {
	Pending,
	Completed,
	Failed,
	Refunded,
}

impl ChargeStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ChargeStatus::Pending => "Pending",
			ChargeStatus::Completed => "Completed",
			ChargeStatus::Failed => "Failed",
			ChargeStatus::Refunded => "Refunded",
		}
	}
}

impl TryFrom<String> for ChargeStatus {
	type Error = UnknownStatus;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		match s.as_str() {
			"Pending" => Ok(ChargeStatus::Pending),
			"Completed" => Ok(ChargeStatus::Completed),
			"Failed" => Ok(ChargeStatus::Failed),
			"Refunded" => Ok(ChargeStatus::Refunded),
			_ => Err(UnknownStatus(s)),
		}
	}
}

/// Ledger entry for one successful charge against a booking.
#[derive(Debug, Clone, serde::Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
	pub id: Uuid,
	pub booking_id: Uuid,
	pub user_id: Uuid,
	pub amount: f64,
	pub currency: String,
	pub payment_method: String,
	pub payment_status: ChargeStatus,
	pub payment_intent_id: Option<String>,
	pub transaction_id: Option<String>,
	pub customer_email: String,
	pub customer_name: String,
	pub card_last4: Option<String>,
	pub card_brand: Option<String>,
	pub paid_at: Option<DateTime<Utc>>,
	pub refunded_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PaymentWithBooking {
	#[serde(flatten)]
	pub payment: Payment,
	pub booking: Option<Booking>,
}
