use std::sync::Arc;

use anyhow::Context;
use log::{error, info};
use tokio::net::TcpListener;

mod app;
mod cars;
mod db_client;
mod error;
mod file_server;
mod payment_gateway;
mod rental;
mod settings;
mod store;
mod tokens;
mod users;

use app::{router, AppState};
use settings::{AppConfig, Backend};
use payment_gateway::simulator::{ChargeSimulator, FixedCharge, RandomCharge};
use store::{MemoryStore, PgStore, Store};
use tokens::jwt::TokenIssuer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	dotenvy::dotenv().ok();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = AppConfig::load().context("failed to load configuration")?;

	let store: Arc<dyn Store> = match config.database.backend {
		Backend::Postgres => Arc::new(PgStore::open(&config.database.url).await?),
		Backend::Memory => {
			info!("using in-memory store; data is lost on exit");
			Arc::new(MemoryStore::new())
		}
	};
	info!("store opened ({:?})", config.database.backend);

	match cars::cars::seed_catalog(store.as_ref()).await {
		Ok(0) => {}
		Ok(n) => info!("added {} sample cars to the catalog", n),
		Err(e) => error!("failed to seed catalog: {:#}", e),
	}

	let charges: Arc<dyn ChargeSimulator> = match (config.payments.fixed_outcome, config.payments.seed) {
		(Some(outcome), _) => {
			info!("every simulated charge will be {}", if outcome { "approved" } else { "declined" });
			Arc::new(FixedCharge(outcome))
		}
		(None, Some(seed)) => Arc::new(RandomCharge::seeded(config.payments.success_rate, seed)),
		(None, None) => Arc::new(RandomCharge::new(config.payments.success_rate)),
	};

	let state = AppState {
		store: store.clone(),
		tokens: Arc::new(TokenIssuer::new(
			&config.auth.jwt_secret,
			chrono::Duration::days(config.auth.token_ttl_days),
		)),
		charges,
		reset_ttl: chrono::Duration::minutes(config.auth.reset_token_ttl_minutes),
		static_dir: Arc::from(config.static_dir.as_str()),
	};

	let addr = format!("{}:{}", config.server.host, config.server.port);
	let listener = TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {}", addr))?;
	info!("server running on {}", addr);

	axum::serve(listener, router(state))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	drop(store);
	info!("store closed, bye");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("shutdown requested");
}
