//! Order submission: validate, number, hand off, deliver.

use crate::encoder::encode_payment_slip;
use crate::error::SubmitError;
use crate::handoff::HandoffStore;
use crate::validation::validate_draft;
use checkout_delivery::OrderDelivery;
use checkout_types::{
	CheckoutSettings, OrderDraft, OrderNumber, OrderPayload, Pricing, Route, SubmissionReceipt,
	DEFAULT_ORDER_PREFIX,
};
use chrono::{Local, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, instrument, warn, Span};

/// What the submitter stamps on every order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterSettings {
	pub order_prefix: String,
	pub pricing: Pricing,
}

impl Default for SubmitterSettings {
	fn default() -> Self {
		Self {
			order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
			pricing: Pricing::default(),
		}
	}
}

impl From<&CheckoutSettings> for SubmitterSettings {
	fn from(settings: &CheckoutSettings) -> Self {
		Self {
			order_prefix: settings.order_prefix.clone(),
			pricing: settings.pricing(),
		}
	}
}

/// Submits drafts for one session, at most one at a time.
pub struct OrderSubmitter {
	delivery: Arc<dyn OrderDelivery>,
	handoff: HandoffStore,
	settings: SubmitterSettings,
	submitting: AtomicBool,
}

/// Releases the in-flight flag however `submit` exits.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

impl OrderSubmitter {
	pub fn new(
		delivery: Arc<dyn OrderDelivery>,
		handoff: HandoffStore,
		settings: SubmitterSettings,
	) -> Self {
		Self {
			delivery,
			handoff,
			settings,
			submitting: AtomicBool::new(false),
		}
	}

	pub fn is_submitting(&self) -> bool {
		self.submitting.load(Ordering::Acquire)
	}

	pub fn handoff(&self) -> &HandoffStore {
		&self.handoff
	}

	fn claim(&self) -> Option<InFlight<'_>> {
		self.submitting
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()
			.map(|_| InFlight(&self.submitting))
	}

	/// Runs one submission.
	///
	/// The handoff record is written before delivery is attempted. If the
	/// slip cannot be encoded or delivery fails, the session's previous
	/// record (or none) is put back, so the confirmation view only ever
	/// shows an order that was sent.
	#[instrument(
		skip(self, draft),
		fields(
			session = %self.handoff.session_id(),
			channel = self.delivery.name(),
			order_number = tracing::field::Empty,
		)
	)]
	pub async fn submit(&self, draft: &OrderDraft) -> Result<SubmissionReceipt, SubmitError> {
		let Some(_in_flight) = self.claim() else {
			warn!("Submission already in progress, ignoring");
			return Err(SubmitError::InProgress);
		};

		let errors = validate_draft(draft);
		if !errors.is_empty() {
			info!(invalid_fields = errors.len(), "Order form rejected");
			return Err(SubmitError::Invalid(errors));
		}

		let order_number = OrderNumber::generate(
			&self.settings.order_prefix,
			Local::now().date_naive(),
			&mut rand::thread_rng(),
		);
		Span::current().record("order_number", order_number.as_str());

		let previous = self.handoff.snapshot().await.unwrap_or_else(|e| {
			warn!(error = %e, "Previous handoff record unreadable, it will not be restored");
			None
		});
		self.handoff.record_submission(&order_number, draft).await?;

		if let Err(e) = self.dispatch(&order_number, draft).await {
			if let Err(rollback) = self.handoff.restore(previous).await {
				error!(error = %rollback, "Failed to roll back handoff record");
				return Err(rollback.into());
			}
			return Err(e);
		}

		info!("Order submitted");

		Ok(SubmissionReceipt {
			order_number,
			redirect: Route::ThankYou,
		})
	}

	async fn dispatch(
		&self,
		order_number: &OrderNumber,
		draft: &OrderDraft,
	) -> Result<(), SubmitError> {
		// The simulated channel never looks at the slip.
		let slip = match &draft.payment_slip {
			Some(slip) if !self.delivery.is_simulated() => Some(encode_payment_slip(slip).await?),
			_ => None,
		};

		let payload = OrderPayload::new(order_number, draft, slip, Utc::now(), &self.settings.pricing);
		self.delivery.deliver_order(&payload).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use checkout_delivery::{DeliveryError, SimulatedDelivery};
	use checkout_storage::{MemoryStorage, StorageService};
	use checkout_types::PaymentSlip;
	use std::sync::atomic::AtomicUsize;
	use std::time::Duration;
	use tokio::sync::Mutex;

	/// Records payloads instead of sending them.
	#[derive(Default)]
	struct RecordingDelivery {
		payloads: Mutex<Vec<OrderPayload>>,
		calls: AtomicUsize,
		fail: bool,
	}

	#[async_trait]
	impl OrderDelivery for RecordingDelivery {
		fn name(&self) -> &str {
			"recording"
		}

		async fn deliver_order(&self, payload: &OrderPayload) -> Result<(), DeliveryError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			tokio::time::sleep(Duration::from_millis(20)).await;
			if self.fail {
				return Err(DeliveryError::Status {
					status: 500,
					reason: "Internal Server Error".to_string(),
				});
			}
			self.payloads.lock().await.push(payload.clone());
			Ok(())
		}
	}

	fn handoff() -> HandoffStore {
		HandoffStore::new(
			Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
			"tab",
		)
	}

	fn valid_draft() -> OrderDraft {
		OrderDraft {
			full_name: "Somchai Jaidee".to_string(),
			email: "somchai@example.com".to_string(),
			phone: "0812345678".to_string(),
			province: "Chiang Mai".to_string(),
			district: "Mueang".to_string(),
			postal_code: "50200".to_string(),
			address: "1 Nimman Road".to_string(),
			notes: "Leave at the door".to_string(),
			payment_slip: Some(PaymentSlip::from_bytes("slip.png", "image/png", b"png".to_vec())),
		}
	}

	#[tokio::test]
	async fn test_submit_sends_payload() {
		let delivery = Arc::new(RecordingDelivery::default());
		let submitter = OrderSubmitter::new(delivery.clone(), handoff(), SubmitterSettings::default());

		let receipt = submitter.submit(&valid_draft()).await.unwrap();
		assert_eq!(receipt.redirect, Route::ThankYou);
		assert!(receipt.order_number.as_str().starts_with("NNM-"));

		let payloads = delivery.payloads.lock().await;
		assert_eq!(payloads.len(), 1);
		let payload = &payloads[0];
		assert_eq!(payload.order_number, receipt.order_number.as_str());
		assert_eq!(payload.payment_slip.as_deref(), Some("cG5n"));
		assert_eq!(payload.payment_slip_mime_type.as_deref(), Some("image/png"));
		assert_eq!(payload.total_amount, "1420");
		assert_eq!(payload.currency, "THB");
		assert_eq!(payload.notes, "Leave at the door");

		assert_eq!(
			submitter.handoff().last_order_number().await.unwrap().as_deref(),
			Some(receipt.order_number.as_str())
		);
		assert!(!submitter.is_submitting());
	}

	#[tokio::test]
	async fn test_invalid_draft_has_no_side_effects() {
		let delivery = Arc::new(RecordingDelivery::default());
		let submitter = OrderSubmitter::new(delivery.clone(), handoff(), SubmitterSettings::default());

		let err = submitter.submit(&OrderDraft::default()).await.unwrap_err();
		match err {
			SubmitError::Invalid(errors) => assert_eq!(errors.len(), 8),
			other => panic!("unexpected error: {:?}", other),
		}
		assert_eq!(delivery.calls.load(Ordering::SeqCst), 0);
		assert!(submitter.handoff().last_order_number().await.unwrap().is_none());
		assert!(!submitter.is_submitting());
	}

	#[tokio::test]
	async fn test_failed_delivery_releases_flag() {
		let delivery = Arc::new(RecordingDelivery {
			fail: true,
			..Default::default()
		});
		let submitter = OrderSubmitter::new(delivery, handoff(), SubmitterSettings::default());

		let err = submitter.submit(&valid_draft()).await.unwrap_err();
		assert!(matches!(err, SubmitError::Delivery(_)));
		assert!(!submitter.is_submitting());
		assert!(submitter.handoff().last_order_number().await.unwrap().is_none());
		assert!(submitter.handoff().last_form_data().await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_failed_delivery_restores_earlier_order() {
		let handoff = handoff();
		let accepted = OrderSubmitter::new(
			Arc::new(RecordingDelivery::default()),
			handoff.clone(),
			SubmitterSettings::default(),
		);
		let receipt = accepted.submit(&valid_draft()).await.unwrap();

		let rejected = OrderSubmitter::new(
			Arc::new(RecordingDelivery {
				fail: true,
				..Default::default()
			}),
			handoff.clone(),
			SubmitterSettings::default(),
		);
		let mut retry = valid_draft();
		retry.full_name = "Somsak".to_string();
		assert!(rejected.submit(&retry).await.is_err());

		assert_eq!(
			handoff.last_order_number().await.unwrap().as_deref(),
			Some(receipt.order_number.as_str())
		);
		assert_eq!(
			handoff.last_form_data().await.unwrap().map(|d| d.full_name),
			Some("Somchai Jaidee".to_string())
		);
	}

	#[tokio::test]
	async fn test_concurrent_submit_is_rejected() {
		let delivery = Arc::new(RecordingDelivery::default());
		let submitter = OrderSubmitter::new(delivery.clone(), handoff(), SubmitterSettings::default());
		let draft = valid_draft();

		let (first, second) = tokio::join!(submitter.submit(&draft), submitter.submit(&draft));

		assert!(first.is_ok());
		assert!(matches!(second, Err(SubmitError::InProgress)));
		assert_eq!(delivery.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_simulated_channel_skips_encoding() {
		let submitter = OrderSubmitter::new(
			Arc::new(SimulatedDelivery::new(Duration::ZERO)),
			handoff(),
			SubmitterSettings {
				order_prefix: "PRE".to_string(),
				pricing: Pricing::default(),
			},
		);
		let mut draft = valid_draft();
		// Would fail to encode if it were read.
		draft.payment_slip = Some(PaymentSlip::from_path(
			"missing.jpg",
			"image/jpeg",
			"/nonexistent/missing.jpg",
		));

		let receipt = submitter.submit(&draft).await.unwrap();
		assert!(receipt.order_number.as_str().starts_with("PRE-"));
	}

	#[tokio::test]
	async fn test_unreadable_slip_is_encoding_error() {
		let delivery = Arc::new(RecordingDelivery::default());
		let submitter = OrderSubmitter::new(delivery.clone(), handoff(), SubmitterSettings::default());
		let mut draft = valid_draft();
		draft.payment_slip = Some(PaymentSlip::from_path(
			"missing.jpg",
			"image/jpeg",
			"/nonexistent/missing.jpg",
		));

		let err = submitter.submit(&draft).await.unwrap_err();
		assert!(matches!(err, SubmitError::Encoding(_)));
		assert_eq!(delivery.calls.load(Ordering::SeqCst), 0);
		assert!(submitter.handoff().last_order_number().await.unwrap().is_none());
	}
}
