use anyhow::{Context, Result};
use tokio_postgres::{Client, NoTls};

// Concurrent CREATE ... IF NOT EXISTS can still collide, so instances take
// an advisory lock for the duration.
const SCHEMA: &str = "
BEGIN;
SELECT pg_advisory_xact_lock(7235443029);

CREATE TABLE IF NOT EXISTS users (
	id UUID PRIMARY KEY,
	name TEXT NOT NULL,
	email TEXT NOT NULL UNIQUE,
	password_hash TEXT NOT NULL,
	phone TEXT,
	address TEXT,
	license_number TEXT,
	reset_token TEXT,
	reset_token_expire TIMESTAMPTZ,
	created_at TIMESTAMPTZ NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS cars (
	id UUID PRIMARY KEY,
	name TEXT NOT NULL,
	price DOUBLE PRECISION NOT NULL,
	image TEXT NOT NULL,
	car_type TEXT NOT NULL,
	seats INTEGER NOT NULL,
	transmission TEXT NOT NULL,
	fuel TEXT NOT NULL,
	available BOOLEAN NOT NULL DEFAULT TRUE,
	created_at TIMESTAMPTZ NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS bookings (
	id UUID PRIMARY KEY,
	user_id UUID NOT NULL REFERENCES users(id),
	car_id UUID NOT NULL REFERENCES cars(id),
	start_date TIMESTAMPTZ NOT NULL,
	end_date TIMESTAMPTZ NOT NULL,
	total_days BIGINT NOT NULL,
	total_price DOUBLE PRECISION NOT NULL,
	status TEXT NOT NULL DEFAULT 'Pending',
	pickup_location TEXT NOT NULL DEFAULT 'Main Office',
	payment_status TEXT NOT NULL DEFAULT 'Pending',
	payment_method TEXT,
	payment_id UUID,
	payment_date TIMESTAMPTZ,
	customer_name TEXT,
	customer_email TEXT,
	customer_phone TEXT,
	created_at TIMESTAMPTZ NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS bookings_user_created ON bookings (user_id, created_at DESC);

CREATE TABLE IF NOT EXISTS payments (
	id UUID PRIMARY KEY,
	booking_id UUID NOT NULL REFERENCES bookings(id),
	user_id UUID NOT NULL REFERENCES users(id),
	amount DOUBLE PRECISION NOT NULL,
	currency TEXT NOT NULL DEFAULT 'USD',
	payment_method TEXT NOT NULL,
	payment_status TEXT NOT NULL DEFAULT 'Pending',
	payment_intent_id TEXT,
	transaction_id TEXT,
	customer_email TEXT NOT NULL,
	customer_name TEXT NOT NULL,
	card_last4 TEXT,
	card_brand TEXT,
	paid_at TIMESTAMPTZ,
	refunded_at TIMESTAMPTZ,
	created_at TIMESTAMPTZ NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS payments_user_created ON payments (user_id, created_at DESC);

COMMIT;
";

/// Opens a connection and drives it on a background task.
pub async fn db_client(config_string: &str) -> Result<Client> {
	let (client, connection) = tokio_postgres::connect(config_string, NoTls)
		.await
		.context("failed to connect to postgres")?;

	tokio::spawn(async move {
		if let Err(e) = connection.await {
			log::error!("Connection error: {}", e);
		}
	});

	Ok(client)
}

pub async fn ensure_schema(client: &Client) -> Result<()> {
	client.batch_execute(SCHEMA).await.context("failed to create schema")
}
