//! File-backed storage.
//!
//! Each key becomes `<key>.json` under the base directory, written through a
//! temp file and a rename. Keys stored with a TTL get a `<key>.expires`
//! sidecar holding the RFC 3339 expiry; an expired key reads as missing and
//! both files are removed on that read. Survives restarts, which the
//! in-memory backend does not.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub struct FileStorage {
	base_path: PathBuf,
}

fn backend_error(e: std::io::Error) -> StorageError {
	StorageError::Backend(e.to_string())
}

/// Removes `path`, treating an absent file as already removed.
async fn remove_if_present(path: &Path) -> Result<(), StorageError> {
	match fs::remove_file(path).await {
		Err(e) if e.kind() != ErrorKind::NotFound => Err(backend_error(e)),
		_ => Ok(()),
	}
}

/// Writes through a sibling temp file so readers never see half a value.
async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
	let mut staging = path.as_os_str().to_owned();
	staging.push(".tmp");
	fs::write(&staging, contents).await.map_err(backend_error)?;
	fs::rename(&staging, path).await.map_err(backend_error)
}

impl FileStorage {
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Session ids come from clients, so anything outside `[A-Za-z0-9_-]`
	/// becomes `_` and a key can never leave the base directory.
	fn stem(key: &str) -> String {
		key.chars()
			.map(|c| {
				if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
					c
				} else {
					'_'
				}
			})
			.collect()
	}

	fn value_path(&self, key: &str) -> PathBuf {
		self.base_path.join(format!("{}.json", Self::stem(key)))
	}

	fn expiry_path(&self, key: &str) -> PathBuf {
		self.base_path.join(format!("{}.expires", Self::stem(key)))
	}

	async fn expires_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
		let text = match fs::read_to_string(self.expiry_path(key)).await {
			Ok(text) => text,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(backend_error(e)),
		};
		DateTime::parse_from_rfc3339(text.trim())
			.map(|at| Some(at.with_timezone(&Utc)))
			.map_err(|e| StorageError::Backend(format!("Corrupt expiry for '{}': {}", key, e)))
	}

	/// Drops the key if its TTL has run out. Returns whether it is still live.
	async fn check_live(&self, key: &str) -> Result<bool, StorageError> {
		match self.expires_at(key).await? {
			Some(at) if Utc::now() >= at => {
				self.delete(key).await?;
				Ok(false)
			}
			_ => Ok(true),
		}
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		if !self.check_live(key).await? {
			return Err(StorageError::NotFound);
		}
		fs::read(self.value_path(key)).await.map_err(|e| match e.kind() {
			ErrorKind::NotFound => StorageError::NotFound,
			_ => backend_error(e),
		})
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		fs::create_dir_all(&self.base_path)
			.await
			.map_err(backend_error)?;

		// The expiry goes first so a crash never leaves a new value under an
		// old, longer TTL.
		let expiry_path = self.expiry_path(key);
		match ttl {
			Some(ttl) => {
				let ttl = chrono::Duration::from_std(ttl)
					.map_err(|e| StorageError::Backend(format!("TTL out of range: {}", e)))?;
				let at = (Utc::now() + ttl).to_rfc3339();
				write_atomically(&expiry_path, at.as_bytes()).await?;
			}
			None => remove_if_present(&expiry_path).await?,
		}

		write_atomically(&self.value_path(key), &value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		remove_if_present(&self.value_path(key)).await?;
		remove_if_present(&self.expiry_path(key)).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		if !self.check_live(key).await? {
			return Ok(false);
		}
		fs::try_exists(self.value_path(key))
			.await
			.map_err(backend_error)
	}
}
