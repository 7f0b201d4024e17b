use std::collections::HashMap;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use hyper::StatusCode;
use serde_json::json;
use uuid::Uuid;

use super::{
	card::{card_brand, card_last4},
	simulator::ChargeSimulator,
	ChargeStatus, Payment, PaymentWithBooking, DEFAULT_CURRENCY,
};
use crate::{
	app::AppState,
	error::{ApiError, Payload},
	rental::{Booking, PaymentStatus},
	store::{Confirmation, ConfirmPayment, Store},
	tokens::{
		opaque::{client_secret, intent_id, transaction_id},
		AuthUser,
	},
	users::User,
};

const DECLINED: &str = "Payment failed. Please try again or use a different payment method.";

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
	#[serde(default)]
	pub booking_id: String,
	pub payment_method: Option<String>,
	pub card_number: Option<String>,
	pub expiry_date: Option<String>,
	pub cvv: Option<String>,
	pub cardholder_name: Option<String>,
	/// Charged amount; the booking's total when left out.
	pub amount: Option<f64>,
}

#[derive(Debug)]
pub enum PaymentOutcome {
	Approved { booking: Booking, payment: Payment },
	/// The simulated charge bounced. Nothing was written.
	Declined,
}

fn present(field: &Option<String>) -> Option<&str> {
	field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Runs a simulated card charge for one of the payer's bookings.
///
/// On approval the booking becomes Confirmed/Paid and a Completed ledger row
/// is written together; a booking that is no longer Pending is a conflict,
/// so a second attempt can never produce a second ledger row.
pub async fn process_payment(
	store: &dyn Store,
	charges: &dyn ChargeSimulator,
	payer: &User,
	request: PaymentRequest,
) -> Result<PaymentOutcome, ApiError> {
	let (Some(card_number), Some(_), Some(_), Some(cardholder_name)) = (
		present(&request.card_number),
		present(&request.expiry_date),
		present(&request.cvv),
		present(&request.cardholder_name),
	) else {
		return Err(ApiError::validation("All payment fields are required"));
	};

	if !charges.approve() {
		log::warn!("simulated charge declined for booking {} (user {})", request.booking_id, payer.id);
		return Ok(PaymentOutcome::Declined);
	}

	let booking = match Uuid::parse_str(request.booking_id.trim()) {
		Ok(id) => store.find_booking(id).await?,
		Err(_) => None,
	};
	let Some(booking) = booking.filter(|b| b.user_id == payer.id) else {
		return Err(ApiError::not_found("Booking not found"));
	};
	if booking.payment_status != PaymentStatus::Pending {
		return Err(ApiError::Conflict("Booking has already been paid".into()));
	}

	let payment_method = present(&request.payment_method).unwrap_or("card").to_owned();
	let now = Utc::now();
	let payment = Payment {
		id: Uuid::new_v4(),
		booking_id: booking.id,
		user_id: payer.id,
		amount: request.amount.unwrap_or(booking.total_price),
		currency: DEFAULT_CURRENCY.to_owned(),
		payment_method: payment_method.clone(),
		payment_status: ChargeStatus::Completed,
		payment_intent_id: Some(intent_id()),
		transaction_id: Some(transaction_id()),
		customer_email: payer.email.clone(),
		customer_name: cardholder_name.to_owned(),
		card_last4: Some(card_last4(card_number)),
		card_brand: Some(card_brand(card_number).to_owned()),
		paid_at: Some(now),
		refunded_at: None,
		created_at: now,
		updated_at: now,
	};
	let confirm = ConfirmPayment {
		booking_id: booking.id,
		payer_id: payer.id,
		payment_method,
		customer_name: cardholder_name.to_owned(),
		customer_email: payer.email.clone(),
		customer_phone: payer.phone.clone(),
		payment,
	};

	match store.confirm_payment(&confirm).await? {
		Confirmation::Confirmed { booking, payment } => {
			log::info!("booking {} paid: {} {} by {}", booking.id, payment.amount, payment.currency, payer.id);
			Ok(PaymentOutcome::Approved { booking, payment })
		}
		Confirmation::Missing => Err(ApiError::not_found("Booking not found")),
		// lost a race with another attempt on the same booking
		Confirmation::AlreadySettled => Err(ApiError::Conflict("Booking has already been paid".into())),
	}
}

/// Placeholder for a gateway-issued intent; nothing leaves the process.
#[derive(Debug, serde::Serialize)]
pub struct PaymentIntent {
	pub id: String,
	pub client_secret: String,
	pub amount: Option<f64>,
	pub currency: &'static str,
	pub status: &'static str,
}

impl PaymentIntent {
	pub fn new(amount: Option<f64>) -> Self {
		PaymentIntent {
			id: intent_id(),
			client_secret: client_secret(),
			amount,
			currency: "usd",
			status: "requires_payment_method",
		}
	}
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
	#[serde(default)]
	booking_id: Option<String>,
	#[serde(default)]
	amount: Option<f64>,
}

pub async fn create_intent(AuthUser(user): AuthUser, Payload(request): Payload<IntentRequest>) -> impl IntoResponse {
	let intent = PaymentIntent::new(request.amount);
	log::debug!(
		"intent {} for booking {:?} ({:?} {}) by {}",
		intent.id,
		request.booking_id,
		intent.amount,
		intent.currency,
		user.id
	);
	Json(json!({
		"success": true,
		"clientSecret": intent.client_secret,
		"paymentIntentId": intent.id,
	}))
}

pub async fn process(
	State(state): State<AppState>,
	AuthUser(user): AuthUser,
	Payload(request): Payload<PaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let outcome = process_payment(state.store.as_ref(), state.charges.as_ref(), &user, request).await?;
	Ok(match outcome {
		PaymentOutcome::Approved { booking, payment } => (
			StatusCode::OK,
			Json(json!({
				"success": true,
				"message": "Payment successful! Your booking is confirmed.",
				"booking": booking,
				"payment": payment,
			})),
		),
		PaymentOutcome::Declined => (StatusCode::BAD_REQUEST, Json(json!({ "success": false, "message": DECLINED }))),
	})
}

/// The caller's ledger, newest first, each entry with its booking.
pub async fn list_payments(store: &dyn Store, user_id: Uuid) -> Result<Vec<PaymentWithBooking>, ApiError> {
	let payments = store.list_payments_for_user(user_id).await?;
	let bookings: HashMap<Uuid, Booking> = store
		.list_bookings_for_user(user_id)
		.await?
		.into_iter()
		.map(|b| (b.id, b))
		.collect();
	Ok(payments
		.into_iter()
		.map(|payment| {
			let booking = bookings.get(&payment.booking_id).cloned();
			PaymentWithBooking { payment, booking }
		})
		.collect())
}

pub async fn payment_history(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<Vec<PaymentWithBooking>>, ApiError> {
	Ok(Json(list_payments(state.store.as_ref(), user.id).await?))
}
