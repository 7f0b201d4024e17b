use rand::{distributions::Uniform, Rng, RngCore};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn base36(len: usize) -> String {
	let pick = Uniform::from(0..BASE36.len());
	rand::thread_rng()
		.sample_iter(pick)
		.take(len)
		.map(|i| BASE36[i] as char)
		.collect()
}

/// `pi_` followed by 9 base36 characters.
pub fn intent_id() -> String {
	format!("pi_{}", base36(9))
}

pub fn transaction_id() -> String {
	format!("txn_{}", base36(9))
}

pub fn client_secret() -> String {
	format!("pi_{}_secret", base36(24))
}

/// 20 random bytes, hex encoded.
pub fn reset_token() -> String {
	let mut bytes = [0u8; 20];
	rand::thread_rng().fill_bytes(&mut bytes);
	bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shapes() {
		let id = intent_id();
		assert_eq!(id.len(), 12);
		assert!(id.starts_with("pi_"));
		assert!(id[3..].bytes().all(|b| BASE36.contains(&b)));

		assert!(transaction_id().starts_with("txn_"));

		let secret = client_secret();
		assert!(secret.starts_with("pi_") && secret.ends_with("_secret"));
		assert_eq!(secret.len(), 3 + 24 + 7);

		let token = reset_token();
		assert_eq!(token.len(), 40);
		assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[test]
	fn ids_do_not_repeat() {
		assert_ne!(intent_id(), intent_id());
		assert_ne!(reset_token(), reset_token());
	}
}
