use anyhow::{Context, Result};
use checkout_config::ConfigLoader;
use checkout_service::{start_http_server, AppState};
use checkout_types::CheckoutConfig;
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = load_config(&cli).await?;

	let log_level = cli
		.log_level
		.clone()
		.unwrap_or_else(|| config.checkout.log_level.clone());
	setup_tracing(&log_level)?;

	match cli.command {
		Some(Command::Start) | None => start_service(config).await,
		Some(Command::Validate) => validate_config(&cli, &config),
	}
}

async fn load_config(cli: &Cli) -> Result<CheckoutConfig> {
	ConfigLoader::new()
		.with_optional_file(&cli.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", cli.config))
}

async fn start_service(config: CheckoutConfig) -> Result<()> {
	info!("Starting checkout service");
	info!("Order prefix: {}", config.checkout.order_prefix);
	info!(
		"Price: {} {}",
		config.checkout.total_amount, config.checkout.currency
	);
	info!("Pre-orders open at: {}", config.checkout.pre_order_opens_at);

	let state = AppState::from_config(&config).context("Failed to build application state")?;
	let address = config.server.bind_address();

	let sweeper_handle = tokio::spawn(state.clone().sweep_sessions());
	let mut http_handle = tokio::spawn(async move { start_http_server(state, &address).await });

	info!("Checkout service started");

	let outcome = tokio::select! {
		_ = setup_shutdown_signal() => None,
		result = &mut http_handle => Some(result),
	};
	sweeper_handle.abort();

	if let Some(result) = outcome {
		return result.context("HTTP server task failed")?;
	}

	info!("Shutdown signal received, stopping server...");
	http_handle.abort();

	info!("Checkout service stopped");
	Ok(())
}

fn validate_config(cli: &Cli, config: &CheckoutConfig) -> Result<()> {
	info!("Configuration is valid: {:?}", cli.config);
	info!("Order prefix: {}", config.checkout.order_prefix);
	info!(
		"Order webhook: {}",
		if config.webhooks.order_url.is_some() { "configured" } else { "simulated" }
	);
	info!(
		"Newsletter webhook: {}",
		if config.webhooks.newsletter_url.is_some() { "configured" } else { "simulated" }
	);
	info!("Storage backend: {:?}", config.storage.backend);
	info!("Session TTL: {}s", config.storage.session_ttl_secs);
	info!("Listen address: {}", config.server.bind_address());
	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			tracing::error!("Failed to install Ctrl+C handler: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				tracing::error!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
