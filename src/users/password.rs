use anyhow::{anyhow, Result};
use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};

pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|e| anyhow!("failed to hash password: {}", e))?;
	Ok(hash.to_string())
}

/// A mismatch is `Ok(false)`; only an unparsable stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
	let parsed = PasswordHash::new(password_hash).map_err(|e| anyhow!("failed to parse password hash: {}", e))?;
	Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hashes_are_salted_and_verify() {
		let first = hash_password("hunter22").unwrap();
		let second = hash_password("hunter22").unwrap();
		assert_ne!(first, second);
		assert!(verify_password("hunter22", &first).unwrap());
		assert!(!verify_password("hunter23", &first).unwrap());
	}

	#[test]
	fn garbage_hash_is_an_error() {
		assert!(verify_password("anything", "not-a-phc-string").is_err());
	}
}
