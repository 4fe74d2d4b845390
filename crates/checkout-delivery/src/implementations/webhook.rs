//! JSON webhook delivery over HTTP.

use crate::{DeliveryError, NewsletterDelivery, OrderDelivery};
use async_trait::async_trait;
use checkout_types::{NewsletterPayload, OrderPayload};
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header carrying the order number, so the receiver can drop duplicates
/// when the customer retries after a lost response.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Posts JSON bodies to one webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
	client: Client,
	url: Url,
}

impl WebhookDelivery {
	/// `timeout` of `None` waits for the endpoint indefinitely.
	pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, DeliveryError> {
		let url = Url::parse(url)
			.map_err(|e| DeliveryError::Configuration(format!("Invalid webhook URL: {}", e)))?;

		let mut builder = Client::builder();
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|e| DeliveryError::Configuration(e.to_string()))?;

		Ok(Self { client, url })
	}

	/// Host of the endpoint. Full URLs often embed secrets and are not logged.
	pub fn host(&self) -> &str {
		self.url.host_str().unwrap_or("unknown")
	}

	async fn post<T: Serialize + ?Sized>(
		&self,
		body: &T,
		idempotency_key: Option<&str>,
	) -> Result<(), DeliveryError> {
		let mut request = self.client.post(self.url.clone()).json(body);
		if let Some(key) = idempotency_key {
			request = request.header(IDEMPOTENCY_KEY_HEADER, key);
		}

		debug!(host = %self.host(), "Posting to webhook");
		let response = request
			.send()
			.await
			.map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;

		let status = response.status();
		if !status.is_success() {
			warn!(host = %self.host(), status = status.as_u16(), "Webhook rejected request");
			return Err(DeliveryError::Status {
				status: status.as_u16(),
				reason: status.canonical_reason().unwrap_or_default().to_string(),
			});
		}

		Ok(())
	}
}

#[async_trait]
impl OrderDelivery for WebhookDelivery {
	fn name(&self) -> &str {
		"webhook"
	}

	async fn deliver_order(&self, payload: &OrderPayload) -> Result<(), DeliveryError> {
		self.post(payload, Some(&payload.order_number)).await?;
		info!(order_number = %payload.order_number, "Order submitted successfully to webhook");
		Ok(())
	}
}

#[async_trait]
impl NewsletterDelivery for WebhookDelivery {
	fn name(&self) -> &str {
		"webhook"
	}

	async fn deliver_signup(&self, payload: &NewsletterPayload) -> Result<(), DeliveryError> {
		self.post(payload, None).await?;
		info!("Newsletter signup submitted to webhook");
		Ok(())
	}
}
