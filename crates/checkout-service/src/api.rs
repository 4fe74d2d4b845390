//! HTTP API for the checkout flow.

use crate::state::AppState;
use axum::{
	extract::{multipart::MultipartError, DefaultBodyLimit, FromRequestParts, Multipart, State},
	http::{request::Parts, HeaderValue, StatusCode},
	response::{IntoResponse, IntoResponseParts, Json, Redirect, Response, ResponseParts},
	routing::{get, post},
	Router,
};
use checkout_core::{
	load_confirmation, CheckoutForm, NewsletterError, SubmissionKind, SubmitError,
	ACCEPTED_SLIP_EXTENSIONS, ACCEPTED_SLIP_MIME_TYPES,
};
use checkout_types::{
	ConfirmationView, FieldError, FormField, PaymentSlip, ValidationErrors, THAI_PROVINCES,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Header naming the browser tab a request belongs to.
pub const SESSION_HEADER: &str = "x-checkout-session";

/// Multipart field carrying the payment slip file.
pub const PAYMENT_SLIP_FIELD: &str = "paymentSlip";

/// Optional name for a slip sent as a data URL.
pub const PAYMENT_SLIP_FILE_NAME_FIELD: &str = "paymentSlipFileName";

const DEFAULT_SLIP_FILE_NAME: &str = "payment-slip";

/// Phone photos of slips routinely exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const MAX_SESSION_ID_LEN: usize = 128;

/// Session id taken from [`SESSION_HEADER`], or a fresh one.
///
/// Also a response part, so handlers echo it back and a new client learns
/// the id it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for SessionId {
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let id = parts
			.headers
			.get(SESSION_HEADER)
			.and_then(|value| value.to_str().ok())
			.map(str::trim)
			.filter(|id| !id.is_empty() && id.len() <= MAX_SESSION_ID_LEN)
			.map(str::to_string)
			.unwrap_or_else(|| Uuid::new_v4().to_string());
		Ok(SessionId(id))
	}
}

impl IntoResponseParts for SessionId {
	type Error = Infallible;

	fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
		if let Ok(value) = HeaderValue::from_str(&self.0) {
			res.headers_mut().insert(SESSION_HEADER, value);
		}
		Ok(res)
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopStatus {
	pub pre_order_open: bool,
	pub opens_at: NaiveDateTime,
	pub total_amount: String,
	pub currency: String,
	/// What the slip picker should offer; the server checks the MIME type.
	pub accepted_slip_types: AcceptedSlipTypes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedSlipTypes {
	pub mime_types: &'static [&'static str],
	pub extensions: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct NewsletterRequest {
	pub email: String,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health_check))
		.route("/api/shop", get(shop_status))
		.route("/api/provinces", get(list_provinces))
		.route("/api/orders", post(create_order))
		.route("/api/confirmation", get(get_confirmation))
		.route("/api/newsletter", post(subscribe_newsletter))
		.layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Binds `address` and serves until the task is dropped.
pub async fn start_http_server(state: AppState, address: &str) -> anyhow::Result<()> {
	let listener = tokio::net::TcpListener::bind(address).await?;

	info!("Checkout API listening on {}", address);

	axum::serve(listener, router(state)).await?;

	Ok(())
}

async fn health_check() -> StatusCode {
	StatusCode::OK
}

async fn shop_status(State(state): State<AppState>) -> Json<ShopStatus> {
	let window = state.pre_order_window();
	let pricing = state.pricing();
	Json(ShopStatus {
		pre_order_open: window.is_open(),
		opens_at: window.opens_at(),
		total_amount: pricing.total_amount.clone(),
		currency: pricing.currency.clone(),
		accepted_slip_types: AcceptedSlipTypes {
			mime_types: &ACCEPTED_SLIP_MIME_TYPES,
			extensions: &ACCEPTED_SLIP_EXTENSIONS,
		},
	})
}

async fn list_provinces() -> Json<&'static [&'static str]> {
	Json(&THAI_PROVINCES)
}

/// Accepts the checkout form as multipart and runs the submission.
#[instrument(skip_all, fields(session = %session.0))]
async fn create_order(
	State(state): State<AppState>,
	session: SessionId,
	multipart: Multipart,
) -> (SessionId, Response) {
	let window = state.pre_order_window();
	if !window.is_open() {
		info!("Order rejected, pre-orders not open yet");
		let body = serde_json::json!({
			"submit": "Pre-orders are not open yet.",
			"opensAt": window.opens_at(),
		});
		return (session, (StatusCode::CONFLICT, Json(body)).into_response());
	}

	let (mut form, slip_rejected) = match read_order_form(multipart).await {
		Ok(parsed) => parsed,
		Err(e) => {
			warn!(error = %e, "Malformed order form");
			return (session, (e.status(), e.body_text()).into_response());
		}
	};

	let submitter = state.submitter(&session.0);
	let response = match form.submit(&submitter).await {
		Ok(receipt) => {
			info!(order_number = %receipt.order_number, "Order accepted");
			Redirect::to(receipt.redirect.path()).into_response()
		}
		Err(SubmitError::Invalid(_)) => {
			let mut errors = form.errors().clone();
			if slip_rejected {
				errors.insert(FormField::PaymentFile, FieldError::FileTypeInvalid);
			}
			(StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
		}
		Err(e @ SubmitError::InProgress) => {
			(StatusCode::CONFLICT, Json(submission_body(&e))).into_response()
		}
		Err(e) => match e.kind() {
			SubmissionKind::Recoverable => {
				warn!(error = %e, "Order submission failed");
				(StatusCode::BAD_GATEWAY, Json(submission_body(&e))).into_response()
			}
			SubmissionKind::Fatal => {
				error!(error = %e, "Order submission failed");
				(StatusCode::INTERNAL_SERVER_ERROR, Json(submission_body(&e))).into_response()
			}
		},
	};

	(session, response)
}

fn submission_body(err: &SubmitError) -> serde_json::Value {
	serde_json::json!({ "submit": err.user_message() })
}

/// Folds the multipart fields into a form. The flag reports a slip that was
/// attached but refused for its type.
///
/// The slip is normally a file part. Clients that read the file in the
/// browser may instead send it as a data URL text part, optionally named by
/// a `paymentSlipFileName` field.
async fn read_order_form(
	mut multipart: Multipart,
) -> Result<(CheckoutForm, bool), MultipartError> {
	let mut form = CheckoutForm::new();
	let mut slip = None;
	let mut data_url = None;
	let mut data_url_name = None;

	while let Some(field) = multipart.next_field().await? {
		let Some(name) = field.name().map(str::to_string) else {
			continue;
		};

		match name.as_str() {
			PAYMENT_SLIP_FIELD => {
				let file_name = field.file_name().map(str::to_string);
				let mime_type = field
					.content_type()
					.unwrap_or("application/octet-stream")
					.to_string();
				match file_name {
					Some(file_name) => {
						let bytes = field.bytes().await?;
						// Browsers send an empty part when no file was chosen.
						if !(file_name.is_empty() && bytes.is_empty()) {
							slip = Some(PaymentSlip::from_bytes(file_name, mime_type, bytes));
						}
					}
					None => {
						let text = field.text().await?;
						if !text.trim().is_empty() {
							data_url = Some(text);
						}
					}
				}
			}
			PAYMENT_SLIP_FILE_NAME_FIELD => data_url_name = Some(field.text().await?),
			_ => match name.parse::<FormField>() {
				Ok(form_field) => {
					let value = field.text().await?;
					form.set_field(form_field, value);
				}
				Err(_) => debug!(field = %name, "Ignoring unknown form field"),
			},
		}
	}

	if let Some(url) = data_url {
		let file_name = data_url_name.unwrap_or_else(|| DEFAULT_SLIP_FILE_NAME.to_string());
		slip = Some(PaymentSlip::from_data_url(file_name, url));
	}

	let slip_rejected = match slip {
		Some(slip) => !form.attach_payment_slip(slip),
		None => false,
	};

	Ok((form, slip_rejected))
}

#[instrument(skip_all, fields(session = %session.0))]
async fn get_confirmation(
	State(state): State<AppState>,
	session: SessionId,
) -> (SessionId, Response) {
	let handoff = state.handoff(&session.0);
	let response = match load_confirmation(&handoff).await {
		ConfirmationView::Displayed(details) => Json(details).into_response(),
		ConfirmationView::Redirect(route) => Redirect::to(route.path()).into_response(),
	};
	(session, response)
}

async fn subscribe_newsletter(
	State(state): State<AppState>,
	Json(request): Json<NewsletterRequest>,
) -> Response {
	match state.newsletter().subscribe(&request.email).await {
		Ok(_) => Json(serde_json::json!({ "subscribed": true })).into_response(),
		Err(NewsletterError::InvalidEmail(err)) => {
			let mut errors = ValidationErrors::new();
			errors.insert(FormField::Email, err);
			(StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
		}
		Err(e @ NewsletterError::Delivery(_)) => {
			warn!(error = %e, "Newsletter signup failed");
			let body = serde_json::json!({ "newsletter": "Subscription failed, please try again." });
			(StatusCode::BAD_GATEWAY, Json(body)).into_response()
		}
	}
}
