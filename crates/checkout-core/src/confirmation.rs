//! Confirmation handoff: what the thank-you view shows, if anything.

use crate::handoff::HandoffStore;
use checkout_types::{ConfirmationRecord, ConfirmationView, OrderDetails, Route};
use tracing::{debug, warn};

/// One-shot read of the handoff record.
///
/// Shows the order when both the order number and the draft are present;
/// otherwise sends the customer home. A missing record is not an error.
pub async fn load_confirmation(handoff: &HandoffStore) -> ConfirmationView {
	match read_record(handoff).await {
		Some(record) => ConfirmationView::Displayed(OrderDetails::from(record)),
		None => {
			debug!(session = %handoff.session_id(), "No confirmation data, redirecting home");
			ConfirmationView::Redirect(Route::Home)
		}
	}
}

async fn read_record(handoff: &HandoffStore) -> Option<ConfirmationRecord> {
	let order_number = match handoff.last_order_number().await {
		Ok(number) => number?,
		Err(e) => {
			warn!(session = %handoff.session_id(), error = %e, "Failed to read order number");
			return None;
		}
	};
	let form_data = match handoff.last_form_data().await {
		Ok(form) => form?,
		Err(e) => {
			warn!(session = %handoff.session_id(), error = %e, "Failed to read form data");
			return None;
		}
	};

	Some(ConfirmationRecord {
		order_number,
		form_data,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use checkout_storage::{MemoryStorage, StorageService};
	use checkout_types::{OrderDraft, OrderNumber, LAST_FORM_DATA_KEY, LAST_ORDER_NUMBER_KEY};
	use std::sync::Arc;

	fn storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	#[tokio::test]
	async fn test_displays_recorded_order() {
		let handoff = HandoffStore::new(storage(), "tab");
		let draft = OrderDraft {
			full_name: "Malee Srisuk".to_string(),
			email: "malee@example.com".to_string(),
			phone: "0891234567".to_string(),
			address: "12 Nimman Road".to_string(),
			..Default::default()
		};
		handoff
			.record_submission(&OrderNumber::from("NNM-20251212-4321".to_string()), &draft)
			.await
			.unwrap();

		let view = load_confirmation(&handoff).await;
		assert_eq!(
			view,
			ConfirmationView::Displayed(OrderDetails {
				number: "NNM-20251212-4321".to_string(),
				name: "Malee Srisuk".to_string(),
				email: "malee@example.com".to_string(),
				phone: "0891234567".to_string(),
				address: "12 Nimman Road".to_string(),
			})
		);
	}

	#[tokio::test]
	async fn test_redirects_without_record() {
		let handoff = HandoffStore::new(storage(), "fresh-tab");
		assert_eq!(
			load_confirmation(&handoff).await,
			ConfirmationView::Redirect(Route::Home)
		);
	}

	#[tokio::test]
	async fn test_redirects_with_partial_record() {
		let shared = storage();
		shared
			.store_text("tab", LAST_ORDER_NUMBER_KEY, "NNM-20251212-0001")
			.await
			.unwrap();
		let handoff = HandoffStore::new(shared.clone(), "tab");
		assert_eq!(
			load_confirmation(&handoff).await,
			ConfirmationView::Redirect(Route::Home)
		);

		// Corrupt form data also sends the customer home
		shared
			.store_text("tab", LAST_FORM_DATA_KEY, "{not json")
			.await
			.unwrap();
		assert_eq!(
			load_confirmation(&handoff).await,
			ConfirmationView::Redirect(Route::Home)
		);
	}
}
