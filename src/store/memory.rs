use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Confirmation, ConfirmPayment, DuplicateEmail, Store};
use crate::{
	cars::Car,
	payment_gateway::Payment,
	rental::{Booking, BookingStatus, PaymentStatus},
	users::User,
};

#[derive(Default)]
struct Tables {
	users: Vec<User>,
	cars: Vec<Car>,
	bookings: Vec<Booking>,
	payments: Vec<Payment>,
}

/// Process-local store. Data lives as long as the value does.
#[derive(Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

/// Later inserts win ties so equal timestamps still list newest first.
fn newest_first<T: Clone>(rows: impl DoubleEndedIterator<Item = T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
	let mut rows: Vec<T> = rows.rev().collect();
	rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
	rows
}

#[async_trait]
impl Store for MemoryStore {
	async fn insert_user(&self, user: &User) -> Result<()> {
		let mut tables = self.tables.write().await;
		if tables.users.iter().any(|u| u.email == user.email) {
			bail!(DuplicateEmail(user.email.clone()));
		}
		tables.users.push(user.clone());
		Ok(())
	}

	async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
		Ok(self.tables.read().await.users.iter().find(|u| u.id == id).cloned())
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
		Ok(self.tables.read().await.users.iter().find(|u| u.email == email).cloned())
	}

	async fn find_user_by_reset_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>> {
		let tables = self.tables.read().await;
		let user = tables.users.iter().find(|u| {
			u.reset_token.as_deref() == Some(token) && u.reset_token_expire.map_or(false, |expire| expire > now)
		});
		Ok(user.cloned())
	}

	async fn update_user(&self, user: &User) -> Result<()> {
		let mut tables = self.tables.write().await;
		match tables.users.iter_mut().find(|u| u.id == user.id) {
			Some(row) => {
				*row = user.clone();
				Ok(())
			}
			None => bail!("no user {}", user.id),
		}
	}

	async fn count_cars(&self) -> Result<i64> {
		Ok(self.tables.read().await.cars.len() as i64)
	}

	async fn insert_cars(&self, cars: &[Car]) -> Result<()> {
		self.tables.write().await.cars.extend_from_slice(cars);
		Ok(())
	}

	async fn list_cars(&self) -> Result<Vec<Car>> {
		Ok(self.tables.read().await.cars.clone())
	}

	async fn find_car(&self, id: Uuid) -> Result<Option<Car>> {
		Ok(self.tables.read().await.cars.iter().find(|c| c.id == id).cloned())
	}

	async fn insert_booking(&self, booking: &Booking) -> Result<()> {
		self.tables.write().await.bookings.push(booking.clone());
		Ok(())
	}

	async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
		Ok(self.tables.read().await.bookings.iter().find(|b| b.id == id).cloned())
	}

	async fn list_bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>> {
		let tables = self.tables.read().await;
		let own = tables.bookings.iter().filter(|b| b.user_id == user_id).cloned();
		Ok(newest_first(own, |b| b.created_at))
	}

	async fn confirm_payment(&self, confirm: &ConfirmPayment) -> Result<Confirmation> {
		let mut tables = self.tables.write().await;
		let Some(booking) = tables
			.bookings
			.iter_mut()
			.find(|b| b.id == confirm.booking_id && b.user_id == confirm.payer_id)
		else {
			return Ok(Confirmation::Missing);
		};
		if booking.payment_status != PaymentStatus::Pending {
			return Ok(Confirmation::AlreadySettled);
		}

		let paid_at = confirm.payment.paid_at.unwrap_or(confirm.payment.created_at);
		booking.status = BookingStatus::Confirmed;
		booking.payment_status = PaymentStatus::Paid;
		booking.payment_method = Some(confirm.payment_method.clone());
		booking.payment_id = Some(confirm.payment.id);
		booking.payment_date = Some(paid_at);
		booking.customer_name = Some(confirm.customer_name.clone());
		booking.customer_email = Some(confirm.customer_email.clone());
		booking.customer_phone = confirm.customer_phone.clone();
		booking.updated_at = paid_at;
		let booking = booking.clone();

		tables.payments.push(confirm.payment.clone());
		Ok(Confirmation::Confirmed {
			booking,
			payment: confirm.payment.clone(),
		})
	}

	async fn list_payments_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>> {
		let tables = self.tables.read().await;
		let own = tables.payments.iter().filter(|p| p.user_id == user_id).cloned();
		Ok(newest_first(own, |p| p.created_at))
	}
}
