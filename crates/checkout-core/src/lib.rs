//! Checkout pipeline.
//!
//! A draft goes through [`validation`], has its slip turned into base64 by
//! [`encoder`], is numbered and sent by [`submitter`], and is read back by
//! [`confirmation`] for the thank-you view. [`form`] holds the editable
//! state in front of all that.

pub mod confirmation;
pub mod encoder;
pub mod error;
pub mod form;
pub mod handoff;
pub mod newsletter;
pub mod preorder;
pub mod submitter;
pub mod validation;

pub use confirmation::load_confirmation;
pub use encoder::{encode_payment_slip, EncodeError};
pub use error::{NewsletterError, SubmissionKind, SubmitError};
pub use form::CheckoutForm;
pub use handoff::{HandoffRecord, HandoffStore};
pub use newsletter::NewsletterSignup;
pub use preorder::PreOrderWindow;
pub use submitter::{OrderSubmitter, SubmitterSettings};
pub use validation::{
	ACCEPTED_SLIP_EXTENSIONS, ACCEPTED_SLIP_MIME_TYPES, validate_draft, validate_email, validate_payment_slip_file, validate_postal_code,
	validate_thai_phone,
};
