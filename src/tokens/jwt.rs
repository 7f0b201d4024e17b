use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	pub id: Uuid,
	pub email: String,
	pub iat: i64,
	pub exp: i64,
}

/// Signs and checks HS256 bearer tokens.
pub struct TokenIssuer {
	encoding: EncodingKey,
	decoding: DecodingKey,
	ttl: Duration,
}

impl TokenIssuer {
	pub fn new(secret: &str, ttl: Duration) -> Self {
		TokenIssuer {
			encoding: EncodingKey::from_secret(secret.as_bytes()),
			decoding: DecodingKey::from_secret(secret.as_bytes()),
			ttl,
		}
	}

	pub fn issue(&self, id: Uuid, email: &str) -> Result<String> {
		let now = Utc::now();
		let claims = Claims {
			id,
			email: email.to_owned(),
			iat: now.timestamp(),
			exp: (now + self.ttl).timestamp(),
		};
		Ok(encode(&Header::default(), &claims, &self.encoding)?)
	}

	/// Fails on a bad signature, a malformed token or an expired one.
	pub fn verify(&self, token: &str) -> Result<Claims> {
		let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
		Ok(data.claims)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn issued_tokens_verify() {
		let issuer = TokenIssuer::new("secret", Duration::days(7));
		let id = Uuid::new_v4();
		let token = issuer.issue(id, "ann@example.com").unwrap();

		let claims = issuer.verify(&token).unwrap();
		assert_eq!(claims.id, id);
		assert_eq!(claims.email, "ann@example.com");
		assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
	}

	#[test]
	fn wrong_secret_and_expiry_are_rejected() {
		let issuer = TokenIssuer::new("secret", Duration::days(7));
		let token = issuer.issue(Uuid::new_v4(), "ann@example.com").unwrap();
		assert!(TokenIssuer::new("other", Duration::days(7)).verify(&token).is_err());

		// well past the default 60s leeway
		let expired = TokenIssuer::new("secret", Duration::minutes(-10));
		let token = expired.issue(Uuid::new_v4(), "ann@example.com").unwrap();
		assert!(expired.verify(&token).is_err());
	}
}
