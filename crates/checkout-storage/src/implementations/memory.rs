//! In-memory storage.
//!
//! Entries live as long as the process, like a browser tab's session
//! storage lives as long as the tab. Expired entries read as missing and
//! are dropped on the next write.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Key to value and optional expiry.
type MemoryData = HashMap<String, (Vec<u8>, Option<Instant>)>;

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
	data: Arc<RwLock<MemoryData>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	fn is_expired(expiry: &Option<Instant>) -> bool {
		expiry.is_some_and(|exp| Instant::now() >= exp)
	}

	/// Number of live entries.
	pub fn len(&self) -> usize {
		self.data
			.read()
			.map(|data| data.values().filter(|(_, exp)| !Self::is_expired(exp)).count())
			.unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
	StorageError::Backend(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let data = self.data.read().map_err(lock_error)?;

		match data.get(key) {
			Some((value, expiry)) if !Self::is_expired(expiry) => Ok(value.clone()),
			_ => Err(StorageError::NotFound),
		}
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let mut data = self.data.write().map_err(lock_error)?;

		data.retain(|_, (_, expiry)| !Self::is_expired(expiry));
		let expiry = ttl.map(|ttl| Instant::now() + ttl);
		data.insert(key.to_string(), (value, expiry));
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut data = self.data.write().map_err(lock_error)?;
		data.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let data = self.data.read().map_err(lock_error)?;
		Ok(data
			.get(key)
			.is_some_and(|(_, expiry)| !Self::is_expired(expiry)))
	}
}
