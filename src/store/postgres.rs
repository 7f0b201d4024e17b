use std::error::Error;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postgres_from_row::FromRow;
use tokio_postgres::{
	error::SqlState,
	types::{FromSql, Type},
	Client, Row,
};
use uuid::Uuid;

use super::{Confirmation, ConfirmPayment, DuplicateEmail, Store};
use crate::{
	cars::Car,
	db_client::{db_client, ensure_schema},
	error::UnknownStatus,
	payment_gateway::{ChargeStatus, Payment},
	rental::{Booking, BookingStatus, PaymentStatus},
	users::User,
};

pub struct PgStore {
	client: Client,
}

impl PgStore {
	pub async fn open(config_string: &str) -> Result<Self> {
		let client = db_client(config_string).await?;
		ensure_schema(&client).await?;
		Ok(PgStore { client })
	}
}

fn decode<T: FromRow>(rows: &[Row]) -> Result<Vec<T>> {
	rows.iter().map(|row| T::try_from_row(row).map_err(Into::into)).collect()
}

fn decode_opt<T: FromRow>(row: Option<Row>) -> Result<Option<T>> {
	row.map(|row| T::try_from_row(&row)).transpose().map_err(Into::into)
}

// Status columns are plain TEXT holding the variant name.
fn text_status<'a, T>(ty: &Type, raw: &'a [u8]) -> Result<T, Box<dyn Error + Sync + Send>>
where
	T: TryFrom<String, Error = UnknownStatus>,
{
	let text = <&str as FromSql>::from_sql(ty, raw)?;
	Ok(T::try_from(text.to_owned())?)
}

impl<'a> FromSql<'a> for BookingStatus {
	fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
		text_status(ty, raw)
	}

	fn accepts(ty: &Type) -> bool {
		<&str as FromSql>::accepts(ty)
	}
}

impl<'a> FromSql<'a> for PaymentStatus {
	fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
		text_status(ty, raw)
	}

	fn accepts(ty: &Type) -> bool {
		<&str as FromSql>::accepts(ty)
	}
}

impl<'a> FromSql<'a> for ChargeStatus {
	fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
		text_status(ty, raw)
	}

	fn accepts(ty: &Type) -> bool {
		<&str as FromSql>::accepts(ty)
	}
}

// The update only matches a Pending booking owned by the payer, and the
// ledger insert reads from its RETURNING set, so both land or neither does.
const CONFIRM_PAYMENT: &str = "
WITH settled AS (
	UPDATE bookings
	SET status = 'Confirmed', payment_status = 'Paid', payment_method = $3, payment_id = $4,
		payment_date = $5, customer_name = $6, customer_email = $7, customer_phone = $8, updated_at = $5
	WHERE id = $1 AND user_id = $2 AND payment_status = 'Pending'
	RETURNING id
)
INSERT INTO payments (id, booking_id, user_id, amount, currency, payment_method, payment_status,
	payment_intent_id, transaction_id, customer_email, customer_name, card_last4, card_brand,
	paid_at, refunded_at, created_at, updated_at)
SELECT $4::uuid, settled.id, $2::uuid, $9::float8, $10::text, $3::text, $11::text,
	$12::text, $13::text, $7::text, $6::text, $14::text, $15::text,
	$5::timestamptz, NULL, $16::timestamptz, $16::timestamptz
FROM settled
RETURNING *";

#[async_trait]
impl Store for PgStore {
	async fn insert_user(&self, user: &User) -> Result<()> {
		let statement = "INSERT INTO users (id,name,email,password_hash,phone,address,license_number,reset_token,reset_token_expire,created_at,updated_at) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)";
		self.client
			.execute(
				statement,
				&[
					&user.id,
					&user.name,
					&user.email,
					&user.password_hash,
					&user.phone,
					&user.address,
					&user.license_number,
					&user.reset_token,
					&user.reset_token_expire,
					&user.created_at,
					&user.updated_at,
				],
			)
			.await
			.map_err(|e| {
				if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
					anyhow::Error::new(DuplicateEmail(user.email.clone()))
				} else {
					anyhow::Error::new(e).context("insert user")
				}
			})?;
		Ok(())
	}

	async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
		let row = self.client.query_opt("SELECT * FROM users WHERE id=$1", &[&id]).await?;
		decode_opt(row)
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
		let row = self.client.query_opt("SELECT * FROM users WHERE email=$1", &[&email]).await?;
		decode_opt(row)
	}

	async fn find_user_by_reset_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>> {
		let row = self
			.client
			.query_opt(
				"SELECT * FROM users WHERE reset_token=$1 AND reset_token_expire > $2",
				&[&token, &now],
			)
			.await?;
		decode_opt(row)
	}

	async fn update_user(&self, user: &User) -> Result<()> {
		let statement = "UPDATE users SET name=$2,email=$3,password_hash=$4,phone=$5,address=$6,license_number=$7,reset_token=$8,reset_token_expire=$9,updated_at=$10 WHERE id=$1";
		self.client
			.execute(
				statement,
				&[
					&user.id,
					&user.name,
					&user.email,
					&user.password_hash,
					&user.phone,
					&user.address,
					&user.license_number,
					&user.reset_token,
					&user.reset_token_expire,
					&user.updated_at,
				],
			)
			.await
			.context("update user")?;
		Ok(())
	}

	async fn count_cars(&self) -> Result<i64> {
		let row = self.client.query_one("SELECT COUNT(*) FROM cars", &[]).await?;
		Ok(row.try_get(0)?)
	}

	async fn insert_cars(&self, cars: &[Car]) -> Result<()> {
		let statement = self
			.client
			.prepare("INSERT INTO cars (id,name,price,image,car_type,seats,transmission,fuel,available,created_at,updated_at) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)")
			.await?;
		for car in cars {
			self.client
				.execute(
					&statement,
					&[
						&car.id,
						&car.name,
						&car.price,
						&car.image,
						&car.car_type,
						&car.seats,
						&car.transmission,
						&car.fuel,
						&car.available,
						&car.created_at,
						&car.updated_at,
					],
				)
				.await
				.with_context(|| format!("insert car {}", car.name))?;
		}
		Ok(())
	}

	async fn list_cars(&self) -> Result<Vec<Car>> {
		let rows = self.client.query("SELECT * FROM cars ORDER BY created_at", &[]).await?;
		decode(&rows)
	}

	async fn find_car(&self, id: Uuid) -> Result<Option<Car>> {
		let row = self.client.query_opt("SELECT * FROM cars WHERE id=$1", &[&id]).await?;
		decode_opt(row)
	}

	async fn insert_booking(&self, booking: &Booking) -> Result<()> {
		let statement = "INSERT INTO bookings (id,user_id,car_id,start_date,end_date,total_days,total_price,status,pickup_location,payment_status,payment_method,payment_id,payment_date,customer_name,customer_email,customer_phone,created_at,updated_at) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)";
		self.client
			.execute(
				statement,
				&[
					&booking.id,
					&booking.user_id,
					&booking.car_id,
					&booking.start_date,
					&booking.end_date,
					&booking.total_days,
					&booking.total_price,
					&booking.status.as_str(),
					&booking.pickup_location,
					&booking.payment_status.as_str(),
					&booking.payment_method,
					&booking.payment_id,
					&booking.payment_date,
					&booking.customer_name,
					&booking.customer_email,
					&booking.customer_phone,
					&booking.created_at,
					&booking.updated_at,
				],
			)
			.await
			.context("insert booking")?;
		Ok(())
	}

	async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
		let row = self.client.query_opt("SELECT * FROM bookings WHERE id=$1", &[&id]).await?;
		decode_opt(row)
	}

	async fn list_bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>> {
		let rows = self
			.client
			.query("SELECT * FROM bookings WHERE user_id=$1 ORDER BY created_at DESC", &[&user_id])
			.await?;
		decode(&rows)
	}

	async fn confirm_payment(&self, confirm: &ConfirmPayment) -> Result<Confirmation> {
		let payment = &confirm.payment;
		let paid_at = payment.paid_at.unwrap_or(payment.created_at);
		let row = self
			.client
			.query_opt(
				CONFIRM_PAYMENT,
				&[
					&confirm.booking_id,
					&confirm.payer_id,
					&confirm.payment_method,
					&payment.id,
					&paid_at,
					&confirm.customer_name,
					&confirm.customer_email,
					&confirm.customer_phone,
					&payment.amount,
					&payment.currency,
					&payment.payment_status.as_str(),
					&payment.payment_intent_id,
					&payment.transaction_id,
					&payment.card_last4,
					&payment.card_brand,
					&payment.created_at,
				],
			)
			.await
			.context("confirm payment")?;

		let booking = self.find_booking(confirm.booking_id).await?;
		match (row, booking) {
			(Some(row), Some(booking)) => Ok(Confirmation::Confirmed {
				booking,
				payment: Payment::try_from_row(&row)?,
			}),
			(None, Some(booking)) if booking.user_id == confirm.payer_id => Ok(Confirmation::AlreadySettled),
			_ => Ok(Confirmation::Missing),
		}
	}

	async fn list_payments_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>> {
		let rows = self
			.client
			.query("SELECT * FROM payments WHERE user_id=$1 ORDER BY created_at DESC", &[&user_id])
			.await?;
		decode(&rows)
	}
}
