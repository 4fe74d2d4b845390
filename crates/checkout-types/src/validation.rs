//! Field errors and the validation error map.

use crate::draft::FormField;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// A problem with one form field.
///
/// The `Display` text is what the customer sees; `key` is the stable
/// translation key for clients that localise messages themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
	#[error("Please enter your full name.")]
	FullNameRequired,
	#[error("Please enter your email address.")]
	EmailRequired,
	#[error("Please enter a valid email address.")]
	EmailInvalid,
	#[error("Please enter a valid 10-digit phone number starting with 0.")]
	PhoneInvalid,
	#[error("Please select your province.")]
	ProvinceRequired,
	#[error("Please enter your district.")]
	DistrictRequired,
	#[error("Please enter a valid 5-digit postal code.")]
	PostalCodeInvalid,
	#[error("Please enter your shipping address.")]
	AddressRequired,
	#[error("Please upload your payment slip.")]
	PaymentSlipRequired,
	#[error("Payment slip must be a JPG, PNG, PDF or HEIC file.")]
	FileTypeInvalid,
	#[error("We couldn't read your payment slip, please attach it again.")]
	PaymentSlipUnreadable,
	#[error("Submission failed, please try again.")]
	SubmitFailed,
}

impl FieldError {
	pub fn key(&self) -> &'static str {
		match self {
			FieldError::FullNameRequired => "checkout.errors.full_name_required",
			FieldError::EmailRequired => "checkout.errors.email_required",
			FieldError::EmailInvalid => "checkout.errors.email_invalid",
			FieldError::PhoneInvalid => "checkout.errors.phone_invalid",
			FieldError::ProvinceRequired => "checkout.errors.province_required",
			FieldError::DistrictRequired => "checkout.errors.district_required",
			FieldError::PostalCodeInvalid => "checkout.errors.postal_code_invalid",
			FieldError::AddressRequired => "checkout.errors.address_required",
			FieldError::PaymentSlipRequired => "checkout.errors.payment_slip_required",
			FieldError::FileTypeInvalid => "checkout.errors.file_type_invalid",
			FieldError::PaymentSlipUnreadable => "checkout.errors.payment_slip_unreadable",
			FieldError::SubmitFailed => "checkout.errors.submit_failed",
		}
	}
}

impl Serialize for FieldError {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Field name to error message.
///
/// No entry for a field only means no error has been recorded for it since
/// the last full validation pass; it is not proof the field is valid.
/// Ordered, so two serialisations of the same map are byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<FormField, FieldError>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// A map holding only a submission-level error.
	pub fn submission(error: FieldError) -> Self {
		let mut errors = Self::new();
		errors.insert(FormField::Submit, error);
		errors
	}

	/// Records an error, replacing any earlier one for the same field.
	pub fn insert(&mut self, field: FormField, error: FieldError) {
		self.0.insert(field, error);
	}

	/// Drops the entry for `field`, returning it if there was one.
	pub fn clear_field(&mut self, field: FormField) -> Option<FieldError> {
		self.0.remove(&field)
	}

	pub fn get(&self, field: FormField) -> Option<FieldError> {
		self.0.get(&field).copied()
	}

	pub fn contains(&self, field: FormField) -> bool {
		self.0.contains_key(&field)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
		self.0.keys().copied()
	}
}
