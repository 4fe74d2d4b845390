//! End-to-end checkout runs against a mock webhook.

use checkout_core::{
	load_confirmation, CheckoutForm, HandoffStore, OrderSubmitter, SubmitError, SubmitterSettings,
};
use checkout_delivery::create_order_delivery;
use checkout_storage::{MemoryStorage, StorageService};
use checkout_types::{ConfirmationView, FieldError, FormField, PaymentSlip, Route, WebhookSettings};
use regex::Regex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn handoff() -> HandoffStore {
	HandoffStore::new(
		Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
		"tab-under-test",
	)
}

fn submitter_for(order_url: Option<String>, delay: Duration) -> OrderSubmitter {
	let webhooks = WebhookSettings {
		order_url,
		..Default::default()
	};
	let delivery = create_order_delivery(&webhooks, delay).unwrap();
	OrderSubmitter::new(delivery, handoff(), SubmitterSettings::default())
}

fn filled_form() -> CheckoutForm {
	let mut form = CheckoutForm::new();
	form.set_field(FormField::FullName, "Somchai Jaidee");
	form.set_field(FormField::Email, "somchai@example.com");
	form.set_field(FormField::Phone, "081-234-5678");
	form.set_field(FormField::Province, "Bangkok");
	form.set_field(FormField::District, "Pathum Wan");
	form.set_field(FormField::PostalCode, "10330");
	form.set_field(FormField::Address, "99 Rama I Road");
	assert!(form.attach_payment_slip(PaymentSlip::from_bytes(
		"slip.jpg",
		"image/jpeg",
		vec![0xFF, 0xD8, 0xFF, 0xE0],
	)));
	form
}

#[tokio::test]
async fn test_empty_form_never_reaches_webhook() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let submitter = submitter_for(Some(format!("{}/orders", server.uri())), Duration::ZERO);
	let mut form = CheckoutForm::new();

	let err = form.submit(&submitter).await.unwrap_err();
	assert!(matches!(err, SubmitError::Invalid(_)));
	assert_eq!(form.errors().len(), 8);
	assert!(form.submission_error().is_none());
}

#[tokio::test]
async fn test_valid_order_is_posted_and_confirmed() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/orders"))
		.and(header_exists("Idempotency-Key"))
		.and(body_partial_json(serde_json::json!({
			"fullName": "Somchai Jaidee",
			"paymentSlip": "/9j/4A==",
			"paymentSlipFileName": "slip.jpg",
			"paymentSlipMimeType": "image/jpeg",
			"totalAmount": "1420",
			"currency": "THB",
		})))
		.respond_with(ResponseTemplate::new(200))
		.expect(1)
		.mount(&server)
		.await;

	let submitter = submitter_for(Some(format!("{}/orders", server.uri())), Duration::ZERO);
	let mut form = filled_form();

	let receipt = form.submit(&submitter).await.unwrap();
	assert_eq!(receipt.redirect, Route::ThankYou);
	assert!(form.errors().is_empty());

	let pattern = Regex::new(r"^[A-Z]+-\d{8}-\d{4}$").unwrap();
	let stored = submitter.handoff().last_order_number().await.unwrap().unwrap();
	assert!(pattern.is_match(&stored), "{}", stored);
	assert_eq!(stored, receipt.order_number.as_str());

	match load_confirmation(submitter.handoff()).await {
		ConfirmationView::Displayed(details) => {
			assert_eq!(details.number, stored);
			assert_eq!(details.name, "Somchai Jaidee");
			assert_eq!(details.address, "99 Rama I Road");
		}
		other => panic!("expected confirmation, got {:?}", other),
	}
}

#[tokio::test]
async fn test_unconfigured_webhook_simulates_delay() {
	let submitter = submitter_for(None, Duration::from_millis(100));
	let mut form = filled_form();

	let started = Instant::now();
	let receipt = form.submit(&submitter).await.unwrap();

	assert!(started.elapsed() >= Duration::from_millis(100));
	assert_eq!(receipt.redirect, Route::ThankYou);
}

#[tokio::test]
async fn test_server_error_keeps_draft_for_retry() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(500))
		.expect(1)
		.mount(&server)
		.await;

	let submitter = submitter_for(Some(server.uri()), Duration::ZERO);
	let mut form = filled_form();
	let before = form.draft().clone();

	let err = form.submit(&submitter).await.unwrap_err();
	assert!(matches!(err, SubmitError::Delivery(_)));
	assert_eq!(err.user_message(), "Submission failed, please try again.");
	assert_eq!(form.submission_error(), Some(FieldError::SubmitFailed));
	assert_eq!(form.draft(), &before);
	assert!(!submitter.is_submitting());
}

#[tokio::test]
async fn test_failed_delivery_leaves_only_submit_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(502))
		.expect(1)
		.mount(&server)
		.await;

	let submitter = submitter_for(Some(server.uri()), Duration::ZERO);
	let mut form = filled_form();
	// Refused, so the earlier slip stays attached but the error lingers.
	assert!(!form.attach_payment_slip(PaymentSlip::from_bytes(
		"slip.gif",
		"image/gif",
		vec![1],
	)));
	assert!(form.errors().contains(FormField::PaymentFile));

	form.submit(&submitter).await.unwrap_err();

	assert_eq!(form.errors().len(), 1);
	assert_eq!(form.submission_error(), Some(FieldError::SubmitFailed));
	assert_eq!(
		load_confirmation(submitter.handoff()).await,
		ConfirmationView::Redirect(Route::Home)
	);
}

#[tokio::test]
async fn test_double_submit_posts_once() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
		.expect(1)
		.mount(&server)
		.await;

	let submitter = submitter_for(Some(server.uri()), Duration::ZERO);
	let draft = filled_form().draft().clone();

	let (first, second) = tokio::join!(submitter.submit(&draft), submitter.submit(&draft));

	let in_progress = [&first, &second]
		.iter()
		.filter(|r| matches!(r, Err(SubmitError::InProgress)))
		.count();
	assert_eq!(in_progress, 1);
	assert!(first.is_ok() || second.is_ok());
}

#[tokio::test]
async fn test_unreadable_slip_has_own_message() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let dir = tempfile::tempdir().unwrap();
	let submitter = submitter_for(Some(server.uri()), Duration::ZERO);
	let mut form = filled_form();
	form.attach_payment_slip(PaymentSlip::from_path(
		"slip.png",
		"image/png",
		dir.path().join("deleted.png"),
	));

	let err = form.submit(&submitter).await.unwrap_err();
	assert!(matches!(err, SubmitError::Encoding(_)));
	assert_eq!(
		form.submission_error(),
		Some(FieldError::PaymentSlipUnreadable)
	);
	assert_eq!(
		err.user_message(),
		"We couldn't read your payment slip, please attach it again."
	);
}
