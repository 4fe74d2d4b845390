//! Errors surfaced by the checkout operations.

use crate::encoder::EncodeError;
use checkout_delivery::DeliveryError;
use checkout_storage::StorageError;
use checkout_types::{FieldError, ValidationErrors};
use thiserror::Error;

/// Whether the customer can do anything about a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
	/// Fix the input or try again; the draft is kept.
	Recoverable,
	/// Something on our side is broken; retrying will not help.
	Fatal,
}

#[derive(Debug, Error)]
pub enum SubmitError {
	#[error("Order form has {} invalid field(s)", .0.len())]
	Invalid(ValidationErrors),

	#[error("A submission is already in progress")]
	InProgress,

	#[error("Payment slip encoding failed: {0}")]
	Encoding(#[from] EncodeError),

	#[error("Order delivery failed: {0}")]
	Delivery(#[from] DeliveryError),

	#[error("Handoff storage failed: {0}")]
	Storage(#[from] StorageError),
}

impl SubmitError {
	pub fn kind(&self) -> SubmissionKind {
		match self {
			SubmitError::Storage(_) => SubmissionKind::Fatal,
			_ => SubmissionKind::Recoverable,
		}
	}

	/// The submission-level error to show next to the submit button, if any.
	///
	/// Field-level problems and the in-flight guard have none.
	pub fn field_error(&self) -> Option<FieldError> {
		match self {
			SubmitError::Invalid(_) | SubmitError::InProgress => None,
			SubmitError::Encoding(_) => Some(FieldError::PaymentSlipUnreadable),
			SubmitError::Delivery(_) | SubmitError::Storage(_) => Some(FieldError::SubmitFailed),
		}
	}

	/// Text for the customer. Never includes transport details.
	pub fn user_message(&self) -> String {
		match self {
			SubmitError::Invalid(_) => "Please correct the highlighted fields.".to_string(),
			SubmitError::InProgress => "Your order is already being submitted.".to_string(),
			_ => self
				.field_error()
				.unwrap_or(FieldError::SubmitFailed)
				.to_string(),
		}
	}
}

#[derive(Debug, Error)]
pub enum NewsletterError {
	#[error("Invalid newsletter email")]
	InvalidEmail(FieldError),

	#[error("Newsletter delivery failed: {0}")]
	Delivery(#[from] DeliveryError),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_kinds_and_messages() {
		let delivery = SubmitError::from(DeliveryError::Status {
			status: 500,
			reason: "Internal Server Error".to_string(),
		});
		assert_eq!(delivery.kind(), SubmissionKind::Recoverable);
		assert_eq!(delivery.user_message(), "Submission failed, please try again.");
		assert!(!delivery.user_message().contains("500"));

		let encoding = SubmitError::from(EncodeError::MalformedDataUrl("slip.png".to_string()));
		assert_eq!(encoding.kind(), SubmissionKind::Recoverable);
		assert_eq!(
			encoding.user_message(),
			"We couldn't read your payment slip, please attach it again."
		);

		let storage = SubmitError::from(StorageError::Backend("disk full".to_string()));
		assert_eq!(storage.kind(), SubmissionKind::Fatal);
		assert_eq!(storage.field_error(), Some(FieldError::SubmitFailed));

		assert_eq!(SubmitError::InProgress.field_error(), None);
	}
}
