/// Network guessed from the leading digit only. This is not a BIN lookup and
/// does no Luhn check.
pub fn card_brand(card_number: &str) -> &'static str {
	match card_number.trim_start().chars().next() {
		Some('4') => "Visa",
		Some('5') => "MasterCard",
		Some('3') => "American Express",
		Some('6') => "Discover",
		_ => "Unknown",
	}
}

pub fn card_last4(card_number: &str) -> String {
	let chars: Vec<char> = card_number.chars().collect();
	let start = chars.len().saturating_sub(4);
	chars[start..].iter().collect()
}
