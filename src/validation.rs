//! Boolean form validators mirroring the backend's input rules.

// std
use std::ops::RangeBounds;
// self
use crate::{_prelude::*, constants};

const SAFE_IMAGE_SCHEMES: [&str; 3] = ["http", "https", "data"];
const DANGEROUS_PREFIXES: [&str; 3] = ["javascript:", "vbscript:", "file:"];

/// Returns `true` when `value` is non-empty after trimming.
pub fn is_required(value: &str) -> bool {
	!value.trim().is_empty()
}

/// Returns `true` when the trimmed character count of `value` falls inside `bounds`.
pub fn is_length_valid(value: &str, bounds: impl RangeBounds<usize>) -> bool {
	bounds.contains(&value.trim().chars().count())
}

/// Returns `true` when `password` meets the minimum length.
pub fn is_password_valid(password: &str) -> bool {
	is_length_valid(password, constants::MIN_PASSWORD_LENGTH..)
}

/// Returns `true` for a non-blank label within the maximum length.
pub fn is_label_valid(label: &str) -> bool {
	is_required(label) && is_length_valid(label, 1..=constants::MAX_ITEM_LABEL_LENGTH)
}

/// Returns `true` when `rating` lies on the rating scale.
pub fn is_rating_valid(rating: i64) -> bool {
	(constants::RATING_SCALE_MIN..=constants::RATING_SCALE_MAX).contains(&rating)
}

/// Returns `true` for `local@domain.tld`-shaped input without whitespace.
///
/// The domain needs a dot with at least one character on each side; no further RFC 5322
/// checks are made.
pub fn is_valid_email(email: &str) -> bool {
	if email.chars().any(char::is_whitespace) {
		return false;
	}

	let Some((local, domain)) = email.split_once('@') else {
		return false;
	};

	if local.is_empty() || domain.contains('@') {
		return false;
	}

	domain.char_indices().any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Returns `true` when `url` is empty or cannot smuggle script execution into an `<img>`.
///
/// Absolute URLs must use `http`, `https`, or `data`. Input that does not parse as an absolute
/// URL is treated as relative and accepted unless it starts with a script or file scheme.
pub fn is_safe_image_url(url: &str) -> bool {
	let trimmed = url.trim();

	if trimmed.is_empty() {
		return true;
	}

	match Url::parse(trimmed) {
		Ok(parsed) => SAFE_IMAGE_SCHEMES.contains(&parsed.scheme()),
		Err(_) => {
			let lower = trimmed.to_lowercase();

			!DANGEROUS_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
		},
	}
}

/// Returns `true` when `url` is safe and within the maximum stored length.
pub fn is_image_url_valid(url: &str) -> bool {
	is_safe_image_url(url) && is_length_valid(url, ..=constants::MAX_IMAGE_URL_LENGTH)
}

/// Returns `true` when every field named in `required` is present and non-blank in `form`.
///
/// Strings are trimmed; `null` and missing fields fail; any other JSON value passes.
pub fn are_required_fields_filled(form: &serde_json::Value, required: &[&str]) -> bool {
	required.iter().all(|field| match form.get(field) {
		None | Some(serde_json::Value::Null) => false,
		Some(serde_json::Value::String(value)) => is_required(value),
		Some(_) => true,
	})
}

/// Quotes `value` for a CSV cell, doubling embedded quotes.
pub fn sanitize_for_csv(value: impl Display) -> String {
	format!("\"{}\"", value.to_string().replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn image_urls_reject_script_schemes() {
		assert!(is_safe_image_url("https://x/y.jpg"));
		assert!(is_safe_image_url("http://cdn.example.com/a.png"));
		assert!(is_safe_image_url("data:image/png;base64,AAAA"));
		assert!(is_safe_image_url(""));
		assert!(is_safe_image_url("   "));
		assert!(is_safe_image_url("/images/cover.png"));
		assert!(is_safe_image_url("cover.png"));
		assert!(!is_safe_image_url("javascript:alert(1)"));
		assert!(!is_safe_image_url("  JavaScript:alert(1)"));
		assert!(!is_safe_image_url("vbscript:msgbox(1)"));
		assert!(!is_safe_image_url("file:///etc/passwd"));
		assert!(!is_safe_image_url("ftp://example.com/a.png"));
	}

	#[test]
	fn image_url_length_is_bounded() {
		let long = format!("https://example.com/{}", "a".repeat(constants::MAX_IMAGE_URL_LENGTH));

		assert!(is_image_url_valid("https://example.com/a.png"));
		assert!(!is_image_url_valid(&long));
	}

	#[test]
	fn emails_need_local_part_and_dotted_domain() {
		assert!(is_valid_email("user@example.com"));
		assert!(is_valid_email("a.b+c@sub.example.co"));
		assert!(!is_valid_email("user@example"));
		assert!(!is_valid_email("user@.com"));
		assert!(!is_valid_email("user@example."));
		assert!(!is_valid_email("@example.com"));
		assert!(!is_valid_email("us er@example.com"));
		assert!(!is_valid_email("user@@example.com"));
		assert!(!is_valid_email(""));
	}

	#[test]
	fn lengths_are_measured_after_trimming() {
		assert!(is_required(" x "));
		assert!(!is_required("   "));
		assert!(is_length_valid("  abc  ", 3..=3));
		assert!(!is_password_valid("short"));
		assert!(!is_password_valid("  1234567  "));
		assert!(is_password_valid("12345678"));
		assert!(is_label_valid("Chrono Trigger"));
		assert!(!is_label_valid(""));
		assert!(!is_label_valid(&"x".repeat(constants::MAX_ITEM_LABEL_LENGTH + 1)));
	}

	#[test]
	fn ratings_follow_the_scale() {
		assert!(is_rating_valid(0));
		assert!(is_rating_valid(10));
		assert!(!is_rating_valid(-1));
		assert!(!is_rating_valid(11));
	}

	#[test]
	fn required_fields_check_every_name() {
		let form = serde_json::json!({ "name": "Games", "datasource": "", "count": 0, "owner": null });

		assert!(are_required_fields_filled(&form, &["name", "count"]));
		assert!(!are_required_fields_filled(&form, &["name", "datasource"]));
		assert!(!are_required_fields_filled(&form, &["owner"]));
		assert!(!are_required_fields_filled(&form, &["missing"]));
		assert!(are_required_fields_filled(&form, &[]));
	}

	#[test]
	fn csv_cells_are_quoted() {
		assert_eq!(sanitize_for_csv("plain"), "\"plain\"");
		assert_eq!(sanitize_for_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
		assert_eq!(sanitize_for_csv(42), "\"42\"");
	}
}
