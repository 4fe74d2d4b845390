//! Session-scoped handoff between the submitter and the confirmation view.
//!
//! Plays the role a browser tab's session storage plays: two keys, written
//! at submit time and read by the thank-you view. They expire with the
//! session TTL when one is set. Nothing is signed; presence of the keys is
//! the only proof a submission happened in this session.

use checkout_storage::{StorageError, StorageService};
use checkout_types::{OrderDraft, OrderNumber, LAST_FORM_DATA_KEY, LAST_ORDER_NUMBER_KEY};
use std::sync::Arc;
use std::time::Duration;

/// Both handoff keys as they stood at one moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRecord {
	pub order_number: OrderNumber,
	pub draft: OrderDraft,
}

#[derive(Clone)]
pub struct HandoffStore {
	storage: Arc<StorageService>,
	session_id: String,
	ttl: Option<Duration>,
}

impl HandoffStore {
	pub fn new(storage: Arc<StorageService>, session_id: impl Into<String>) -> Self {
		Self {
			storage,
			session_id: session_id.into(),
			ttl: None,
		}
	}

	/// Records written from now on expire after `ttl`.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = Some(ttl);
		self
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	/// Writes the draft fields (never the slip) and then the order number.
	pub async fn record_submission(
		&self,
		order_number: &OrderNumber,
		draft: &OrderDraft,
	) -> Result<(), StorageError> {
		self.storage
			.store_with_ttl(&self.session_id, LAST_FORM_DATA_KEY, draft, self.ttl)
			.await?;
		self.storage
			.store_text_with_ttl(
				&self.session_id,
				LAST_ORDER_NUMBER_KEY,
				order_number.as_str(),
				self.ttl,
			)
			.await
	}

	/// The current record, if both keys are present.
	pub async fn snapshot(&self) -> Result<Option<HandoffRecord>, StorageError> {
		let Some(order_number) = self.last_order_number().await? else {
			return Ok(None);
		};
		Ok(self
			.last_form_data()
			.await?
			.map(|draft| HandoffRecord {
				order_number: OrderNumber::from(order_number),
				draft,
			}))
	}

	/// Puts back what [`snapshot`](Self::snapshot) returned, clearing both
	/// keys when there was nothing.
	pub async fn restore(&self, record: Option<HandoffRecord>) -> Result<(), StorageError> {
		match record {
			Some(record) => {
				self.record_submission(&record.order_number, &record.draft)
					.await
			}
			None => self.clear().await,
		}
	}

	pub async fn last_order_number(&self) -> Result<Option<String>, StorageError> {
		missing_as_none(
			self.storage
				.retrieve_text(&self.session_id, LAST_ORDER_NUMBER_KEY)
				.await,
		)
	}

	pub async fn last_form_data(&self) -> Result<Option<OrderDraft>, StorageError> {
		missing_as_none(
			self.storage
				.retrieve(&self.session_id, LAST_FORM_DATA_KEY)
				.await,
		)
	}

	pub async fn clear(&self) -> Result<(), StorageError> {
		self.storage
			.remove(&self.session_id, LAST_ORDER_NUMBER_KEY)
			.await?;
		self.storage
			.remove(&self.session_id, LAST_FORM_DATA_KEY)
			.await
	}
}

fn missing_as_none<T>(result: Result<T, StorageError>) -> Result<Option<T>, StorageError> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(StorageError::NotFound) => Ok(None),
		Err(e) => Err(e),
	}
}
