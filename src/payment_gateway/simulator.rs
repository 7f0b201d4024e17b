use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

/// Decides whether a simulated card charge goes through.
pub trait ChargeSimulator: Send + Sync {
	fn approve(&self) -> bool;
}

/// Approves a fixed share of charges at random.
pub struct RandomCharge {
	success_rate: f64,
	rng: Option<Mutex<StdRng>>,
}

// gen_bool panics outside [0, 1]; NaN falls back to the default rate.
fn probability(rate: f64) -> f64 {
	if rate.is_nan() {
		DEFAULT_SUCCESS_RATE
	} else {
		rate.clamp(0.0, 1.0)
	}
}

impl RandomCharge {
	pub fn new(success_rate: f64) -> Self {
		RandomCharge {
			success_rate: probability(success_rate),
			rng: None,
		}
	}

	/// Same draw sequence on every run for a given seed.
	pub fn seeded(success_rate: f64, seed: u64) -> Self {
		RandomCharge {
			success_rate: probability(success_rate),
			rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
		}
	}
}

impl Default for RandomCharge {
	fn default() -> Self {
		RandomCharge::new(DEFAULT_SUCCESS_RATE)
	}
}

impl ChargeSimulator for RandomCharge {
	fn approve(&self) -> bool {
		match &self.rng {
			Some(rng) => match rng.lock() {
				Ok(mut rng) => rng.gen_bool(self.success_rate),
				Err(poisoned) => poisoned.into_inner().gen_bool(self.success_rate),
			},
			None => rand::thread_rng().gen_bool(self.success_rate),
		}
	}
}

/// Always gives the same answer.
pub struct FixedCharge(pub bool);

impl ChargeSimulator for FixedCharge {
	fn approve(&self) -> bool {
		self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn seeded_draws_repeat() {
		let a = RandomCharge::seeded(DEFAULT_SUCCESS_RATE, 42);
		let b = RandomCharge::seeded(DEFAULT_SUCCESS_RATE, 42);
		let first: Vec<bool> = (0..64).map(|_| a.approve()).collect();
		let second: Vec<bool> = (0..64).map(|_| b.approve()).collect();
		assert_eq!(first, second);
	}

	#[test]
	fn default_rate_is_roughly_ninety_percent() {
		let charges = RandomCharge::seeded(DEFAULT_SUCCESS_RATE, 7);
		let approved = (0..10_000).filter(|_| charges.approve()).count();
		assert!((8_700..=9_300).contains(&approved), "approved {approved} of 10000");
	}

	#[test]
	fn extremes_are_deterministic() {
		assert!((0..100).all(|_| RandomCharge::new(1.0).approve()));
		assert!((0..100).all(|_| !RandomCharge::new(0.0).approve()));
		assert!(FixedCharge(true).approve());
		assert!(!FixedCharge(false).approve());
	}

	#[test]
	fn out_of_range_rates_never_panic() {
		for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 2.0, -1.0] {
			let charges = RandomCharge::seeded(rate, 3);
			for _ in 0..16 {
				charges.approve();
			}
		}
		assert!(RandomCharge::new(f64::INFINITY).approve());
		assert!(!RandomCharge::new(f64::NEG_INFINITY).approve());
	}
}
