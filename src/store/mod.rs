pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{cars::Car, payment_gateway::Payment, rental::Booking, users::User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Everything needed to settle a booking once a charge has been approved.
#[derive(Debug, Clone)]
pub struct ConfirmPayment {
	pub booking_id: Uuid,
	pub payer_id: Uuid,
	pub payment_method: String,
	pub customer_name: String,
	pub customer_email: String,
	pub customer_phone: Option<String>,
	/// Ledger row to write; its `booking_id` and `user_id` match the fields above.
	pub payment: Payment,
}

/// Raised by `insert_user` when the email is already registered.
#[derive(Debug, thiserror::Error)]
#[error("duplicate email {0}")]
pub struct DuplicateEmail(pub String);

#[derive(Debug)]
pub enum Confirmation {
	Confirmed { booking: Booking, payment: Payment },
	/// No booking with that id belongs to the payer.
	Missing,
	/// The booking exists but is no longer waiting for payment.
	AlreadySettled,
}

/// Persistence for users, the car catalog, bookings and the payment ledger.
///
/// Listing methods return rows newest first by `created_at`.
#[async_trait]
pub trait Store: Send + Sync {
	async fn insert_user(&self, user: &User) -> Result<()>;
	async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
	/// Matches only tokens whose expiry is strictly after `now`.
	async fn find_user_by_reset_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>>;
	async fn update_user(&self, user: &User) -> Result<()>;

	async fn count_cars(&self) -> Result<i64>;
	async fn insert_cars(&self, cars: &[Car]) -> Result<()>;
	/// Catalog order, oldest listing first.
	async fn list_cars(&self) -> Result<Vec<Car>>;
	async fn find_car(&self, id: Uuid) -> Result<Option<Car>>;

	async fn insert_booking(&self, booking: &Booking) -> Result<()>;
	async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>>;
	async fn list_bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>>;

	/// Moves a payer's Pending booking to Confirmed/Paid and records the
	/// ledger row in one step. Nothing is written unless the booking is
	/// still payment-Pending at the moment of the update.
	async fn confirm_payment(&self, confirm: &ConfirmPayment) -> Result<Confirmation>;
	async fn list_payments_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>>;
}
