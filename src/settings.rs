use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
	Postgres,
	Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
	pub url: String,
	pub backend: Backend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
	pub jwt_secret: String,
	pub token_ttl_days: i64,
	pub reset_token_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
	pub success_rate: f64,
	pub seed: Option<u64>,
	/// Resolve every charge this way instead of drawing.
	pub fixed_outcome: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
	pub server: ServerConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub payments: PaymentsConfig,
	pub static_dir: String,
}

impl AppConfig {
	pub fn load() -> Result<Self, ConfigError> {
		let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

		let config = Self::defaults()?
			.add_source(File::with_name("config/default").required(false))
			.add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
			// RIDEEASE_SERVER__PORT=8080 sets server.port
			.add_source(
				Environment::with_prefix("RIDEEASE")
					.prefix_separator("_")
					.separator("__")
					.try_parsing(true),
			)
			.build()?;
		Self::from_config(config)
	}

	fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
		Config::builder()
			.set_default("server.host", "0.0.0.0")?
			.set_default("server.port", 5000)?
			.set_default("database.url", "host=localhost user=rideease password=rideease dbname=rideease")?
			.set_default("database.backend", "postgres")?
			.set_default("auth.jwt_secret", "change_me_before_deploying")?
			.set_default("auth.token_ttl_days", 7)?
			.set_default("auth.reset_token_ttl_minutes", 10)?
			.set_default("payments.success_rate", 0.9)?
			.set_default("static_dir", "public")
	}

	fn from_config(config: Config) -> Result<Self, ConfigError> {
		let app: AppConfig = config.try_deserialize()?;
		let rate = app.payments.success_rate;
		if !(0.0..=1.0).contains(&rate) {
			return Err(ConfigError::Message(format!(
				"payments.success_rate must be between 0 and 1, got {}",
				rate
			)));
		}
		Ok(app)
	}
}
