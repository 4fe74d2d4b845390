//! Form state: the draft being edited plus its current error map.

use crate::error::SubmitError;
use crate::submitter::OrderSubmitter;
use crate::validation::{validate_draft, validate_payment_slip_file};
use checkout_types::{
	FieldError, FormField, OrderDraft, PaymentSlip, SubmissionReceipt, ValidationErrors,
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
	draft: OrderDraft,
	errors: ValidationErrors,
}

impl CheckoutForm {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn draft(&self) -> &OrderDraft {
		&self.draft
	}

	pub fn errors(&self) -> &ValidationErrors {
		&self.errors
	}

	pub fn submission_error(&self) -> Option<FieldError> {
		self.errors.get(FormField::Submit)
	}

	/// Updates a text field and drops whatever error it had. Other entries
	/// are left alone until the next full pass.
	pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> bool {
		if !self.draft.set(field, value) {
			return false;
		}
		self.errors.clear_field(field);
		true
	}

	/// Keeps the slip only if its type is accepted.
	pub fn attach_payment_slip(&mut self, slip: PaymentSlip) -> bool {
		if validate_payment_slip_file(&slip) {
			self.draft.payment_slip = Some(slip);
			self.errors.clear_field(FormField::PaymentFile);
			true
		} else {
			debug!(mime_type = %slip.mime_type, "Rejected payment slip type");
			self.errors
				.insert(FormField::PaymentFile, FieldError::FileTypeInvalid);
			false
		}
	}

	/// Full pass; replaces the error map. Returns whether the draft is valid.
	pub fn validate(&mut self) -> bool {
		self.errors = validate_draft(&self.draft);
		self.errors.is_empty()
	}

	/// Submits the draft and folds the outcome into the error map.
	///
	/// A failure after validation replaces the map with the submission
	/// error alone. The draft is kept whatever happens, so a failed attempt
	/// can be retried without re-entering anything.
	pub async fn submit(
		&mut self,
		submitter: &OrderSubmitter,
	) -> Result<SubmissionReceipt, SubmitError> {
		let result = submitter.submit(&self.draft).await;
		match &result {
			Ok(_) => self.errors = ValidationErrors::new(),
			Err(SubmitError::Invalid(errors)) => self.errors = errors.clone(),
			Err(SubmitError::InProgress) => {}
			Err(err) => {
				if let Some(error) = err.field_error() {
					self.errors = ValidationErrors::submission(error);
				}
			}
		}
		result
	}
}
