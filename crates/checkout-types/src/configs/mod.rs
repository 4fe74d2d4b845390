//! Configuration types for the checkout service.
//!
//! Loading, environment substitution and validation live in
//! `checkout-config`; these are only the shapes.

use crate::order::{Pricing, DEFAULT_ORDER_PREFIX};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete service configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckoutConfig {
	/// Order pricing, numbering and pre-order settings
	pub checkout: CheckoutSettings,
	/// Outbound webhook endpoints
	pub webhooks: WebhookSettings,
	/// Session handoff storage
	pub storage: StorageConfig,
	/// HTTP listener
	pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckoutSettings {
	/// Uppercase prefix of generated order numbers
	pub order_prefix: String,
	/// Fixed total sent with every order
	pub total_amount: String,
	/// Three-letter currency code sent with every order
	pub currency: String,
	/// Delay used in place of the webhook call when no order webhook is set
	pub simulated_delay_ms: u64,
	/// Local time at which pre-orders open
	pub pre_order_opens_at: NaiveDateTime,
	/// Default log filter when RUST_LOG is not set
	pub log_level: String,
}

impl Default for CheckoutSettings {
	fn default() -> Self {
		let pricing = Pricing::default();
		Self {
			order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
			total_amount: pricing.total_amount,
			currency: pricing.currency,
			simulated_delay_ms: 1000,
			pre_order_opens_at: default_pre_order_opening(),
			log_level: "info".to_string(),
		}
	}
}

impl CheckoutSettings {
	pub fn pricing(&self) -> Pricing {
		Pricing {
			total_amount: self.total_amount.clone(),
			currency: self.currency.clone(),
		}
	}

	pub fn simulated_delay(&self) -> Duration {
		Duration::from_millis(self.simulated_delay_ms)
	}
}

/// 2025-12-12 00:00, local time.
pub fn default_pre_order_opening() -> NaiveDateTime {
	NaiveDate::from_ymd_opt(2025, 12, 12)
		.and_then(|d| d.and_hms_opt(0, 0, 0))
		.unwrap_or_default()
}

/// Webhook endpoints. `None` switches the flow to local simulation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookSettings {
	/// Order submission endpoint
	pub order_url: Option<String>,
	/// Newsletter signup endpoint
	pub newsletter_url: Option<String>,
	/// Request timeout; unset means wait indefinitely
	pub timeout_secs: Option<u64>,
}

impl WebhookSettings {
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_secs.map(Duration::from_secs)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	#[default]
	Memory,
	File,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
	pub backend: StorageBackend,
	/// Base directory for the file backend
	pub path: Option<PathBuf>,
	/// How long a session's handoff record and submitter outlive its last use
	pub session_ttl_secs: u64,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: StorageBackend::default(),
			path: None,
			session_ttl_secs: 24 * 60 * 60,
		}
	}
}

impl StorageConfig {
	pub fn session_ttl(&self) -> Duration {
		Duration::from_secs(self.session_ttl_secs)
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
		}
	}
}

impl ServerSettings {
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}
