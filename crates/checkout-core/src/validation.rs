//! Field validation for the checkout form.
//!
//! Everything here is pure: no I/O and no hidden state, so a full pass over
//! an unchanged draft always yields the same map.

use checkout_types::{FieldError, FormField, OrderDraft, PaymentSlip, ValidationErrors};
use regex::Regex;
use std::sync::LazyLock;

/// MIME types accepted for the payment slip.
pub const ACCEPTED_SLIP_MIME_TYPES: [&str; 4] =
	["image/jpeg", "image/png", "application/pdf", "image/heic"];

/// Extensions offered by the file picker. Advisory only; the MIME check decides.
pub const ACCEPTED_SLIP_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "pdf", "heic"];

static THAI_PHONE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^0[0-9]{9}$").expect("valid phone pattern"));

static POSTAL_CODE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("valid postal code pattern"));

static EMAIL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Local mobile format: ten digits starting with a single 0, once every
/// non-digit is removed. Country-code forms such as `+66...` are rejected.
pub fn validate_thai_phone(phone: &str) -> bool {
	let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
	THAI_PHONE.is_match(&digits)
}

/// Exactly five ASCII digits.
pub fn validate_postal_code(code: &str) -> bool {
	POSTAL_CODE.is_match(code)
}

pub fn validate_email(email: &str) -> bool {
	EMAIL.is_match(email)
}

/// Only the declared MIME type is checked; file size is unbounded.
pub fn validate_payment_slip_file(slip: &PaymentSlip) -> bool {
	ACCEPTED_SLIP_MIME_TYPES.contains(&slip.mime_type.as_str())
}

/// Runs every field check and returns the complete error map.
pub fn validate_draft(draft: &OrderDraft) -> ValidationErrors {
	let mut errors = ValidationErrors::new();

	if draft.full_name.trim().is_empty() {
		errors.insert(FormField::FullName, FieldError::FullNameRequired);
	}
	if draft.email.trim().is_empty() {
		errors.insert(FormField::Email, FieldError::EmailRequired);
	} else if !validate_email(&draft.email) {
		errors.insert(FormField::Email, FieldError::EmailInvalid);
	}
	if !validate_thai_phone(&draft.phone) {
		errors.insert(FormField::Phone, FieldError::PhoneInvalid);
	}
	if draft.province.is_empty() {
		errors.insert(FormField::Province, FieldError::ProvinceRequired);
	}
	if draft.district.trim().is_empty() {
		errors.insert(FormField::District, FieldError::DistrictRequired);
	}
	if !validate_postal_code(&draft.postal_code) {
		errors.insert(FormField::PostalCode, FieldError::PostalCodeInvalid);
	}
	if draft.address.trim().is_empty() {
		errors.insert(FormField::Address, FieldError::AddressRequired);
	}
	match &draft.payment_slip {
		None => errors.insert(FormField::PaymentFile, FieldError::PaymentSlipRequired),
		Some(slip) if !validate_payment_slip_file(slip) => {
			errors.insert(FormField::PaymentFile, FieldError::FileTypeInvalid)
		}
		Some(_) => {}
	}

	errors
}

#[cfg(test)]
mod tests {
	use super::*;

	fn valid_draft() -> OrderDraft {
		OrderDraft {
			full_name: "Somchai Jaidee".to_string(),
			email: "somchai@example.com".to_string(),
			phone: "081-234-5678".to_string(),
			province: "Bangkok".to_string(),
			district: "Pathum Wan".to_string(),
			postal_code: "10330".to_string(),
			address: "99 Rama I Road".to_string(),
			notes: String::new(),
			payment_slip: Some(PaymentSlip::from_bytes(
				"slip.jpg",
				"image/jpeg",
				vec![0xFF, 0xD8, 0xFF],
			)),
		}
	}

	#[test]
	fn test_thai_phone() {
		let cases = [
			("081-234-5678", true),
			("0812345678", true),
			("081 234 5678", true),
			("(02) 123-4567", false),
			("123456789", false),
			("08123456789", false),
			("1812345678", false),
			("+66812345678", false),
			("", false),
		];
		for (input, expected) in cases {
			assert_eq!(validate_thai_phone(input), expected, "{:?}", input);
		}
	}

	#[test]
	fn test_postal_code() {
		let cases = [
			("10110", true),
			("00000", true),
			("101100", false),
			("1011", false),
			("1011a", false),
			(" 10110", false),
			("๑๐๑๑๐", false),
		];
		for (input, expected) in cases {
			assert_eq!(validate_postal_code(input), expected, "{:?}", input);
		}
	}

	#[test]
	fn test_payment_slip_mime_types() {
		for mime in ACCEPTED_SLIP_MIME_TYPES {
			let slip = PaymentSlip::from_bytes("slip", mime, vec![1]);
			assert!(validate_payment_slip_file(&slip), "{}", mime);
		}
		let text = PaymentSlip::from_bytes("notes.txt", "text/plain", vec![1]);
		assert!(!validate_payment_slip_file(&text));
		let gif = PaymentSlip::from_bytes("slip.gif", "image/gif", vec![1]);
		assert!(!validate_payment_slip_file(&gif));
	}

	#[test]
	fn test_email_shape() {
		assert!(validate_email("a@b.co"));
		assert!(!validate_email("a@b"));
		assert!(!validate_email("a b@c.co"));
		assert!(!validate_email("@b.co"));
	}

	#[test]
	fn test_empty_draft_has_eight_errors() {
		let errors = validate_draft(&OrderDraft::default());
		let fields: Vec<FormField> = errors.fields().collect();
		assert_eq!(
			fields,
			vec![
				FormField::FullName,
				FormField::Email,
				FormField::Phone,
				FormField::Province,
				FormField::District,
				FormField::PostalCode,
				FormField::Address,
				FormField::PaymentFile,
			]
		);
		assert_eq!(errors.get(FormField::Email), Some(FieldError::EmailRequired));
		assert_eq!(
			errors.get(FormField::PaymentFile),
			Some(FieldError::PaymentSlipRequired)
		);
	}

	#[test]
	fn test_valid_draft_has_no_errors() {
		assert!(validate_draft(&valid_draft()).is_empty());
	}

	#[test]
	fn test_whitespace_only_fields_are_blank() {
		let mut draft = valid_draft();
		draft.full_name = "   ".to_string();
		draft.district = "\t".to_string();
		draft.email = "not-an-email".to_string();

		let errors = validate_draft(&draft);
		assert_eq!(errors.len(), 3);
		assert_eq!(errors.get(FormField::Email), Some(FieldError::EmailInvalid));
	}

	#[test]
	fn test_disallowed_slip_type() {
		let mut draft = valid_draft();
		draft.payment_slip = Some(PaymentSlip::from_bytes("slip.txt", "text/plain", vec![1]));
		let errors = validate_draft(&draft);
		assert_eq!(
			errors.get(FormField::PaymentFile),
			Some(FieldError::FileTypeInvalid)
		);
	}

	#[test]
	fn test_validation_is_idempotent() {
		let mut draft = valid_draft();
		draft.phone = "12345".to_string();
		draft.postal_code = "abc".to_string();

		let first = serde_json::to_string(&validate_draft(&draft)).unwrap();
		let second = serde_json::to_string(&validate_draft(&draft)).unwrap();
		assert_eq!(first, second);
	}
}
