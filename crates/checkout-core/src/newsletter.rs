//! Newsletter signup from the landing page footer.

use crate::error::NewsletterError;
use crate::validation::validate_email;
use checkout_delivery::NewsletterDelivery;
use checkout_types::{iso_timestamp, FieldError, NewsletterPayload};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct NewsletterSignup {
	delivery: Arc<dyn NewsletterDelivery>,
}

impl NewsletterSignup {
	pub fn new(delivery: Arc<dyn NewsletterDelivery>) -> Self {
		Self { delivery }
	}

	pub async fn subscribe(&self, email: &str) -> Result<NewsletterPayload, NewsletterError> {
		let email = email.trim();
		if email.is_empty() {
			return Err(NewsletterError::InvalidEmail(FieldError::EmailRequired));
		}
		if !validate_email(email) {
			return Err(NewsletterError::InvalidEmail(FieldError::EmailInvalid));
		}

		let payload = NewsletterPayload::new(email, iso_timestamp(Utc::now()));
		self.delivery.deliver_signup(&payload).await?;
		info!(channel = self.delivery.name(), "Newsletter signup recorded");
		Ok(payload)
	}
}
