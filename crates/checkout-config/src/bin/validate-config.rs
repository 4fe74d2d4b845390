//! Configuration validation utility
//!
//! Usage: cargo run --bin validate-config config/checkout.toml

use std::env;
use std::process;

use checkout_config::ConfigLoader;

#[tokio::main]
async fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::new().with_file(config_path).load().await {
		Ok(config) => {
			println!("✅ Configuration is valid!");
			println!("Order prefix: {}", config.checkout.order_prefix);
			println!(
				"Price: {} {}",
				config.checkout.total_amount, config.checkout.currency
			);
			println!("Pre-orders open: {}", config.checkout.pre_order_opens_at);
			println!(
				"Order webhook: {}",
				if config.webhooks.order_url.is_some() { "configured" } else { "simulated" }
			);
			println!(
				"Newsletter webhook: {}",
				if config.webhooks.newsletter_url.is_some() { "configured" } else { "simulated" }
			);
			println!("Storage backend: {:?}", config.storage.backend);
		}
		Err(e) => {
			eprintln!("❌ Configuration validation failed:");
			eprintln!("{}", e);
			process::exit(1);
		}
	}
}
