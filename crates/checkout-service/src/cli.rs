//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "checkout-service")]
#[command(about = "Pre-order checkout service", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file; defaults apply if it does not exist
	#[arg(short, long, env = "CHECKOUT_CONFIG", default_value = "config/checkout.toml")]
	pub config: PathBuf,

	/// Log filter override (trace, debug, info, warn, error)
	#[arg(short, long)]
	pub log_level: Option<String>,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Start the HTTP server
	Start,
	/// Validate the configuration and exit
	Validate,
}
