//! Backend-neutral cache interface

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// Key/value cache with per-entry expiry
///
/// Values are serialized by the backend, so any serde type can be stored.
/// Only the single-key methods are required; the batch helpers fall back to
/// looping over them.
#[async_trait]
pub trait Cache: Send + Sync {
	async fn get<T>(&self, key: &str) -> Result<Option<T>>
	where
		T: DeserializeOwned + Send;

	/// Store `value`, expiring after `ttl` (or the backend default when `None`)
	async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
	where
		T: Serialize + Send + Sync;

	async fn delete(&self, key: &str) -> Result<()>;

	async fn has_key(&self, key: &str) -> Result<bool>;

	async fn clear(&self) -> Result<()>;

	async fn get_many<T>(&self, keys: &[&str]) -> Result<HashMap<String, T>>
	where
		T: DeserializeOwned + Send,
	{
		let mut found = HashMap::with_capacity(keys.len());
		for key in keys {
			if let Some(value) = self.get::<T>(key).await? {
				found.insert((*key).to_string(), value);
			}
		}
		Ok(found)
	}

	async fn set_many<T>(&self, values: HashMap<String, T>, ttl: Option<Duration>) -> Result<()>
	where
		T: Serialize + Send + Sync,
	{
		for (key, value) in &values {
			self.set(key, value, ttl).await?;
		}
		Ok(())
	}

	async fn delete_many(&self, keys: &[&str]) -> Result<()> {
		for key in keys {
			self.delete(key).await?;
		}
		Ok(())
	}

	/// Add `delta` to an integer entry, starting from zero when absent
	///
	/// The default implementation is a read followed by a write; backends
	/// that can do better should override it.
	async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
		let current: i64 = self.get(key).await?.unwrap_or(0);
		let next = current + delta;
		self.set(key, &next, None).await?;
		Ok(next)
	}
}
