// checkout-delivery/src/lib.rs

//! Outbound delivery of orders and newsletter signups.
//!
//! The external order-processing system is an opaque webhook. The only
//! contract is: send well-formed JSON, treat 2xx as success and anything
//! else as failure. Nothing here retries; a retry is the customer clicking
//! submit again.

use async_trait::async_trait;
use checkout_types::{NewsletterPayload, OrderPayload, WebhookSettings};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub mod implementations;

pub use implementations::simulated::SimulatedDelivery;
pub use implementations::webhook::WebhookDelivery;

#[derive(Debug, Error)]
pub enum DeliveryError {
	/// The endpoint answered with a non-2xx status.
	#[error("Webhook request failed: {status} {reason}")]
	Status { status: u16, reason: String },

	/// The request never got a response (DNS, connect, timeout, ...).
	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Sends a submitted order to the order-processing system.
#[async_trait]
pub trait OrderDelivery: Send + Sync {
	/// Short name for logs.
	fn name(&self) -> &str;

	/// Simulated channels make no network call, so the payment slip is
	/// never encoded for them.
	fn is_simulated(&self) -> bool {
		false
	}

	async fn deliver_order(&self, payload: &OrderPayload) -> Result<(), DeliveryError>;
}

/// Sends a newsletter signup.
#[async_trait]
pub trait NewsletterDelivery: Send + Sync {
	fn name(&self) -> &str;

	async fn deliver_signup(&self, payload: &NewsletterPayload) -> Result<(), DeliveryError>;
}

/// Order channel for the given settings: the webhook if one is configured,
/// otherwise a simulation that waits `simulated_delay`.
pub fn create_order_delivery(
	settings: &WebhookSettings,
	simulated_delay: Duration,
) -> Result<Arc<dyn OrderDelivery>, DeliveryError> {
	match &settings.order_url {
		Some(url) => Ok(Arc::new(WebhookDelivery::new(url, settings.timeout())?)),
		None => {
			info!("Order webhook not configured, orders will be simulated");
			Ok(Arc::new(SimulatedDelivery::new(simulated_delay)))
		}
	}
}

/// Newsletter channel for the given settings. The simulation does not wait.
pub fn create_newsletter_delivery(
	settings: &WebhookSettings,
) -> Result<Arc<dyn NewsletterDelivery>, DeliveryError> {
	match &settings.newsletter_url {
		Some(url) => Ok(Arc::new(WebhookDelivery::new(url, settings.timeout())?)),
		None => {
			info!("Newsletter webhook not configured, signups will only be logged");
			Ok(Arc::new(SimulatedDelivery::new(Duration::ZERO)))
		}
	}
}
