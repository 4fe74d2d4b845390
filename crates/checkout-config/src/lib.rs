// checkout-config/src/lib.rs

//! Loads the checkout service configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML/JSON/YAML
//! file with `${VAR}` placeholders, then `CHECKOUT_*` environment overrides.

use checkout_types::{CheckoutConfig, StorageBackend};
use regex::Regex;
use rust_decimal::Decimal;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
#[derive(Debug, Clone)]
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	file_required: bool,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			file_required: true,
			env_prefix: "CHECKOUT_".to_string(),
		}
	}

	/// Loads from `path`; a missing file is an error.
	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self.file_required = true;
		self
	}

	/// Loads from `path` if it exists, otherwise starts from defaults.
	pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self.file_required = false;
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<CheckoutConfig, ConfigError> {
		let mut config = match &self.file_path {
			Some(path) if tokio::fs::try_exists(path).await? => self.load_from_file(path).await?,
			Some(path) if self.file_required => {
				return Err(ConfigError::FileNotFound(path.display().to_string()));
			}
			Some(path) => {
				warn!("Configuration file {:?} not found, using defaults", path);
				CheckoutConfig::default()
			}
			None => CheckoutConfig::default(),
		};

		// Apply environment variable overrides
		self.apply_env_overrides(&mut config)?;

		normalize(&mut config);
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, path: &Path) -> Result<CheckoutConfig, ConfigError> {
		info!("Loading configuration from {:?}", path);
		let content = tokio::fs::read_to_string(path).await?;

		// Substitute environment variables
		let substituted = substitute_env_vars(&content)?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => from_toml(&substituted),
			Some("json") => from_json(&substituted),
			Some("yaml") | Some("yml") => from_yaml(&substituted),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}

	fn apply_env_overrides(&self, config: &mut CheckoutConfig) -> Result<(), ConfigError> {
		if let Ok(url) = env::var(format!("{}ORDER_WEBHOOK_URL", self.env_prefix)) {
			debug!("Overriding order webhook URL from environment");
			config.webhooks.order_url = Some(url);
		}

		if let Ok(url) = env::var(format!("{}NEWSLETTER_WEBHOOK_URL", self.env_prefix)) {
			debug!("Overriding newsletter webhook URL from environment");
			config.webhooks.newsletter_url = Some(url);
		}

		if let Ok(timeout) = env::var(format!("{}WEBHOOK_TIMEOUT_SECS", self.env_prefix)) {
			config.webhooks.timeout_secs = Some(timeout.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid webhook timeout: {}", e))
			})?);
		}

		if let Ok(http_port) = env::var(format!("{}HTTP_PORT", self.env_prefix)) {
			config.server.port = http_port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			config.checkout.log_level = log_level;
		}

		Ok(())
	}
}

/// Parses a TOML document.
pub fn from_toml(contents: &str) -> Result<CheckoutConfig, ConfigError> {
	toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parses a JSON document.
pub fn from_json(contents: &str) -> Result<CheckoutConfig, ConfigError> {
	serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parses a YAML document.
pub fn from_yaml(contents: &str) -> Result<CheckoutConfig, ConfigError> {
	serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Replaces every `${VAR_NAME}` with the value of that environment variable.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Blank webhook URLs mean "not configured".
fn normalize(config: &mut CheckoutConfig) {
	for url in [
		&mut config.webhooks.order_url,
		&mut config.webhooks.newsletter_url,
	] {
		if url.as_deref().is_some_and(|u| u.trim().is_empty()) {
			*url = None;
		}
	}
}

/// Checks cross-field rules that serde cannot express.
pub fn validate_config(config: &CheckoutConfig) -> Result<(), ConfigError> {
	let checkout = &config.checkout;

	if checkout.order_prefix.is_empty()
		|| !checkout.order_prefix.chars().all(|c| c.is_ascii_uppercase())
	{
		return Err(ConfigError::ValidationError(format!(
			"Order prefix must be uppercase ASCII letters, got '{}'",
			checkout.order_prefix
		)));
	}

	if checkout.currency.len() != 3 || !checkout.currency.chars().all(|c| c.is_ascii_uppercase())
	{
		return Err(ConfigError::ValidationError(format!(
			"Currency must be a three-letter code, got '{}'",
			checkout.currency
		)));
	}

	let amount = Decimal::from_str(&checkout.total_amount).map_err(|e| {
		ConfigError::ValidationError(format!(
			"Invalid total amount '{}': {}",
			checkout.total_amount, e
		))
	})?;
	if amount.is_sign_negative() {
		return Err(ConfigError::ValidationError(
			"Total amount must not be negative".to_string(),
		));
	}

	for (name, url) in [
		("order", &config.webhooks.order_url),
		("newsletter", &config.webhooks.newsletter_url),
	] {
		if let Some(url) = url {
			if !(url.starts_with("http://") || url.starts_with("https://")) {
				return Err(ConfigError::ValidationError(format!(
					"The {} webhook URL must be http(s)",
					name
				)));
			}
		}
	}

	if config.webhooks.timeout_secs == Some(0) {
		return Err(ConfigError::ValidationError(
			"Webhook timeout must be at least one second".to_string(),
		));
	}

	if config.storage.backend == StorageBackend::File && config.storage.path.is_none() {
		return Err(ConfigError::ValidationError(
			"The file storage backend requires storage.path".to_string(),
		));
	}

	if config.storage.session_ttl_secs == 0 {
		return Err(ConfigError::ValidationError(
			"Session TTL must be at least one second".to_string(),
		));
	}

	Ok(())
}
