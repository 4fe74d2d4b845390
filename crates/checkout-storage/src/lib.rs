//! Key/value storage for the checkout handoff.
//!
//! The confirmation view reads what the submitter wrote through this layer.
//! Keys are grouped by namespace (one per checkout session), so a single
//! backend serves every session without their records mixing.

use async_trait::async_trait;
use checkout_types::{StorageBackend, StorageConfig};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod implementations {
	pub mod file;
	pub mod memory;
}

pub use implementations::file::FileStorage;
pub use implementations::memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
	/// No value under the key, or it has expired.
	#[error("Key not found")]
	NotFound,
	/// The stored bytes are not what the caller asked for.
	#[error("Could not decode stored value: {0}")]
	Serialization(String),
	#[error("Storage backend failure: {0}")]
	Backend(String),
	#[error("Invalid storage configuration: {0}")]
	Configuration(String),
}

/// Byte-level key/value backend.
///
/// Keys are opaque to backends; namespacing is done by [`StorageService`].
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Fails with [`StorageError::NotFound`] for missing or expired keys.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Overwrites any earlier value. Backends may ignore `ttl`.
	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError>;

	/// Idempotent: removing an absent key succeeds.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Typed operations over a storage backend.
///
/// Values are JSON-encoded, except for the `*_text` methods which store
/// UTF-8 strings verbatim.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	/// JSON-encodes `data` under `namespace:id`.
	pub async fn store_with_ttl<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.set_bytes(&Self::key(namespace, id), bytes, ttl)
			.await
	}

	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		self.store_with_ttl(namespace, id, data, None).await
	}

	/// Stores a plain string.
	pub async fn store_text(
		&self,
		namespace: &str,
		id: &str,
		text: &str,
	) -> Result<(), StorageError> {
		self.store_text_with_ttl(namespace, id, text, None).await
	}

	pub async fn store_text_with_ttl(
		&self,
		namespace: &str,
		id: &str,
		text: &str,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		self.backend
			.set_bytes(&Self::key(namespace, id), text.as_bytes().to_vec(), ttl)
			.await
	}

	/// Retrieves and deserializes a value.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves a plain string.
	pub async fn retrieve_text(&self, namespace: &str, id: &str) -> Result<String, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		String::from_utf8(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}

	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}
}

/// Builds the configured backend.
pub fn create_storage(config: &StorageConfig) -> Result<Box<dyn StorageInterface>, StorageError> {
	match config.backend {
		StorageBackend::Memory => Ok(Box::new(MemoryStorage::new())),
		StorageBackend::File => {
			let path = config.path.clone().ok_or_else(|| {
				StorageError::Configuration("file backend requires a path".to_string())
			})?;
			Ok(Box::new(FileStorage::new(path)))
		}
	}
}
