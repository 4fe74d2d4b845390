//! Shared application state and the per-session registry.

use anyhow::{Context, Result};
use checkout_core::{
	HandoffStore, NewsletterSignup, OrderSubmitter, PreOrderWindow, SubmitterSettings,
};
use checkout_delivery::{create_newsletter_delivery, create_order_delivery, OrderDelivery};
use checkout_storage::{create_storage, StorageService};
use checkout_types::{CheckoutConfig, Pricing};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Upper bound on how long an idle session lingers past its TTL.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Session {
	submitter: Arc<OrderSubmitter>,
	last_used: Instant,
}

#[derive(Clone)]
pub struct AppState {
	storage: Arc<StorageService>,
	order_delivery: Arc<dyn OrderDelivery>,
	newsletter: Arc<NewsletterSignup>,
	settings: SubmitterSettings,
	window: PreOrderWindow,
	session_ttl: Duration,
	/// One submitter per session, so the in-flight guard is per tab.
	sessions: Arc<DashMap<String, Session>>,
}

impl AppState {
	/// Wires storage and delivery channels from configuration.
	pub fn from_config(config: &CheckoutConfig) -> Result<Self> {
		let backend = create_storage(&config.storage).context("Failed to create storage")?;
		let order_delivery =
			create_order_delivery(&config.webhooks, config.checkout.simulated_delay())
				.context("Failed to create order delivery")?;
		let newsletter_delivery = create_newsletter_delivery(&config.webhooks)
			.context("Failed to create newsletter delivery")?;

		info!(
			storage = ?config.storage.backend,
			session_ttl_secs = config.storage.session_ttl_secs,
			order_channel = order_delivery.name(),
			newsletter_channel = newsletter_delivery.name(),
			"Checkout state initialised"
		);

		Ok(Self {
			storage: Arc::new(StorageService::new(backend)),
			order_delivery,
			newsletter: Arc::new(NewsletterSignup::new(newsletter_delivery)),
			settings: SubmitterSettings::from(&config.checkout),
			window: PreOrderWindow::new(config.checkout.pre_order_opens_at),
			session_ttl: config.storage.session_ttl(),
			sessions: Arc::new(DashMap::new()),
		})
	}

	pub fn pre_order_window(&self) -> PreOrderWindow {
		self.window
	}

	pub fn pricing(&self) -> &Pricing {
		&self.settings.pricing
	}

	pub fn newsletter(&self) -> &NewsletterSignup {
		&self.newsletter
	}

	pub fn handoff(&self, session_id: &str) -> HandoffStore {
		HandoffStore::new(self.storage.clone(), session_id).with_ttl(self.session_ttl)
	}

	/// The session's submitter, created on first use.
	pub fn submitter(&self, session_id: &str) -> Arc<OrderSubmitter> {
		let mut session = self
			.sessions
			.entry(session_id.to_string())
			.or_insert_with(|| {
				debug!(session = %session_id, "New checkout session");
				Session {
					submitter: Arc::new(OrderSubmitter::new(
						self.order_delivery.clone(),
						self.handoff(session_id),
						self.settings.clone(),
					)),
					last_used: Instant::now(),
				}
			});
		session.last_used = Instant::now();
		session.submitter.clone()
	}

	pub fn session_count(&self) -> usize {
		self.sessions.len()
	}

	/// Drops sessions unused for `idle`. A submitter a request still holds
	/// is kept, so an in-flight submission never loses its guard.
	pub fn evict_idle_sessions(&self, idle: Duration) -> usize {
		let before = self.sessions.len();
		self.sessions.retain(|_, session| {
			Arc::strong_count(&session.submitter) > 1
				|| session.submitter.is_submitting()
				|| session.last_used.elapsed() < idle
		});
		before.saturating_sub(self.sessions.len())
	}

	/// Evicts sessions idle for longer than the session TTL until the task
	/// is dropped.
	pub async fn sweep_sessions(self) {
		let period = self
			.session_ttl
			.clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL);
		let mut interval = tokio::time::interval(period);
		loop {
			interval.tick().await;
			let evicted = self.evict_idle_sessions(self.session_ttl);
			if evicted > 0 {
				debug!(evicted, remaining = self.session_count(), "Evicted idle sessions");
			}
		}
	}
}
