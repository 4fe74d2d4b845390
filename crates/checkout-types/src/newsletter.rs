//! Newsletter signup payload.

use serde::Serialize;

/// Source tag sent with every newsletter signup.
pub const NEWSLETTER_SOURCE: &str = "newsletter_form";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsletterPayload {
	pub email: String,
	pub timestamp: String,
	pub source: String,
}

impl NewsletterPayload {
	pub fn new(email: impl Into<String>, timestamp: impl Into<String>) -> Self {
		Self {
			email: email.into(),
			timestamp: timestamp.into(),
			source: NEWSLETTER_SOURCE.to_string(),
		}
	}
}
