//! Order numbers and the order webhook payload.

use crate::draft::OrderDraft;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix used when none is configured.
pub const DEFAULT_ORDER_PREFIX: &str = "NNM";

/// Order identifier of the form `PREFIX-YYYYMMDD-RRRR`.
///
/// The four-digit suffix is random and never checked against earlier orders,
/// so two orders on the same day collide with probability about 1/10000.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
	pub fn generate<R: Rng + ?Sized>(prefix: &str, date: NaiveDate, rng: &mut R) -> Self {
		let suffix: u16 = rng.gen_range(0..10_000);
		Self(format!("{}-{}-{:04}", prefix, date.format("%Y%m%d"), suffix))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<String> for OrderNumber {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl fmt::Display for OrderNumber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Fixed price of the single pre-order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
	/// Decimal amount as a string, e.g. `"1420"`.
	pub total_amount: String,
	/// ISO 4217 code.
	pub currency: String,
}

impl Default for Pricing {
	fn default() -> Self {
		Self {
			total_amount: "1420".to_string(),
			currency: "THB".to_string(),
		}
	}
}

/// A payment slip re-encoded for embedding in JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSlip {
	/// Standard base64, without any `data:` prefix.
	pub data: String,
	pub file_name: String,
	pub mime_type: String,
}

/// JSON body posted to the order webhook.
///
/// Lives only for the duration of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
	pub order_number: String,
	pub full_name: String,
	pub email: String,
	pub phone: String,
	pub province: String,
	pub district: String,
	pub postal_code: String,
	pub address: String,
	pub notes: String,
	pub payment_slip: Option<String>,
	pub payment_slip_file_name: Option<String>,
	pub payment_slip_mime_type: Option<String>,
	pub timestamp: String,
	pub total_amount: String,
	pub currency: String,
}

impl OrderPayload {
	pub fn new(
		order_number: &OrderNumber,
		draft: &OrderDraft,
		slip: Option<EncodedSlip>,
		submitted_at: DateTime<Utc>,
		pricing: &Pricing,
	) -> Self {
		let (payment_slip, payment_slip_file_name, payment_slip_mime_type) = match slip {
			Some(slip) => (Some(slip.data), Some(slip.file_name), Some(slip.mime_type)),
			None => (None, None, None),
		};

		Self {
			order_number: order_number.to_string(),
			full_name: draft.full_name.clone(),
			email: draft.email.clone(),
			phone: draft.phone.clone(),
			province: draft.province.clone(),
			district: draft.district.clone(),
			postal_code: draft.postal_code.clone(),
			address: draft.address.clone(),
			notes: draft.notes.clone(),
			payment_slip,
			payment_slip_file_name,
			payment_slip_mime_type,
			timestamp: iso_timestamp(submitted_at),
			total_amount: pricing.total_amount.clone(),
			currency: pricing.currency.clone(),
		}
	}
}

/// `2025-12-12T03:04:05.123Z`, the shape browsers produce for `toISOString`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Client-side destinations a checkout step can send the customer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
	Home,
	ThankYou,
}

impl Route {
	pub fn path(&self) -> &'static str {
		match self {
			Route::Home => "/",
			Route::ThankYou => "/thank-you",
		}
	}
}

/// Result of a completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
	pub order_number: OrderNumber,
	pub redirect: Route,
}
