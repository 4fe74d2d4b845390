//! What the thank-you view reads back after a submission.

use crate::draft::OrderDraft;
use crate::order::Route;
use serde::{Deserialize, Serialize};

/// Handoff key holding the last order number as a plain string.
pub const LAST_ORDER_NUMBER_KEY: &str = "lastOrderNumber";

/// Handoff key holding the last draft as JSON.
pub const LAST_FORM_DATA_KEY: &str = "lastFormData";

/// Name shown when the stored draft has none.
pub const FALLBACK_CUSTOMER_NAME: &str = "Customer";

/// Order number plus the draft fields, as written at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRecord {
	pub order_number: String,
	pub form_data: OrderDraft,
}

/// Order summary shown on the thank-you page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
	pub number: String,
	pub name: String,
	pub email: String,
	pub phone: String,
	pub address: String,
}

impl From<ConfirmationRecord> for OrderDetails {
	fn from(record: ConfirmationRecord) -> Self {
		let form = record.form_data;
		let name = if form.full_name.trim().is_empty() {
			FALLBACK_CUSTOMER_NAME.to_string()
		} else {
			form.full_name
		};

		Self {
			number: record.order_number,
			name,
			email: form.email,
			phone: form.phone,
			address: form.address,
		}
	}
}

/// The two states of the confirmation view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationView {
	Displayed(OrderDetails),
	Redirect(Route),
}
