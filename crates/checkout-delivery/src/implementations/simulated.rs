//! Local stand-in used when no webhook URL is configured.

use crate::{DeliveryError, NewsletterDelivery, OrderDelivery};
use async_trait::async_trait;
use checkout_types::{NewsletterPayload, OrderPayload};
use std::time::Duration;
use tracing::info;

/// Logs instead of posting, then waits a fixed delay.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDelivery {
	delay: Duration,
}

impl SimulatedDelivery {
	pub fn new(delay: Duration) -> Self {
		Self { delay }
	}
}

#[async_trait]
impl OrderDelivery for SimulatedDelivery {
	fn name(&self) -> &str {
		"simulated"
	}

	fn is_simulated(&self) -> bool {
		true
	}

	async fn deliver_order(&self, payload: &OrderPayload) -> Result<(), DeliveryError> {
		info!(
			order_number = %payload.order_number,
			full_name = %payload.full_name,
			province = %payload.province,
			total_amount = %payload.total_amount,
			currency = %payload.currency,
			"Order data (webhook not configured)"
		);
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		Ok(())
	}
}

#[async_trait]
impl NewsletterDelivery for SimulatedDelivery {
	fn name(&self) -> &str {
		"simulated"
	}

	async fn deliver_signup(&self, payload: &NewsletterPayload) -> Result<(), DeliveryError> {
		info!(
			source = %payload.source,
			timestamp = %payload.timestamp,
			"Newsletter submission (webhook not configured)"
		);
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		Ok(())
	}
}
