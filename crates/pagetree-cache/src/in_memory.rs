//! In-memory cache backend

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::backend::Cache;
use crate::entry::CacheEntry;
use crate::error::Result;
use crate::statistics::CacheStatistics;

/// Process-local cache backend
///
/// Cloning shares the underlying map, so one instance can be handed to
/// several owners.
#[derive(Clone, Default)]
pub struct InMemoryCache {
	store: Arc<RwLock<HashMap<String, CacheEntry>>>,
	default_ttl: Option<Duration>,
	hits: Arc<AtomicU64>,
	misses: Arc<AtomicU64>,
}

impl InMemoryCache {
	/// Create an empty cache whose entries never expire by default
	///
	/// # Examples
	///
	/// ```
	/// use pagetree_cache::{Cache, InMemoryCache};
	///
	/// # tokio_test::block_on(async {
	/// let cache = InMemoryCache::new();
	/// cache.set("greeting", &"hello", None).await.unwrap();
	/// let value: Option<String> = cache.get("greeting").await.unwrap();
	/// assert_eq!(value.as_deref(), Some("hello"));
	/// # });
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Apply `ttl` to every entry stored without an explicit one
	pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
		self.default_ttl = Some(ttl);
		self
	}

	/// Drop every expired entry
	pub async fn cleanup_expired(&self) {
		let mut store = self.store.write().await;
		store.retain(|_, entry| !entry.is_expired());
	}

	pub async fn get_statistics(&self) -> CacheStatistics {
		let store = self.store.read().await;
		CacheStatistics {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			entry_count: store.len() as u64,
			memory_usage: store.values().map(|entry| entry.value.len() as u64).sum(),
		}
	}

	/// Every stored key, including expired entries not yet cleaned up
	pub async fn list_keys(&self) -> Vec<String> {
		let store = self.store.read().await;
		let mut keys: Vec<String> = store.keys().cloned().collect();
		keys.sort();
		keys
	}

	/// Seconds left before `key` expires
	///
	/// Outer `None` means the key is absent, inner `None` means it never expires.
	pub async fn ttl(&self, key: &str) -> Option<Option<u64>> {
		let store = self.store.read().await;
		store
			.get(key)
			.filter(|entry| !entry.is_expired())
			.map(CacheEntry::ttl_remaining)
	}
}

#[async_trait]
impl Cache for InMemoryCache {
	async fn get<T>(&self, key: &str) -> Result<Option<T>>
	where
		T: DeserializeOwned + Send,
	{
		let store = self.store.read().await;
		match store.get(key) {
			Some(entry) if !entry.is_expired() => {
				self.hits.fetch_add(1, Ordering::Relaxed);
				Ok(Some(serde_json::from_slice(&entry.value)?))
			}
			_ => {
				self.misses.fetch_add(1, Ordering::Relaxed);
				Ok(None)
			}
		}
	}

	async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
	where
		T: Serialize + Send + Sync,
	{
		let encoded = serde_json::to_vec(value)?;
		let entry = CacheEntry::new(encoded, ttl.or(self.default_ttl));
		self.store.write().await.insert(key.to_string(), entry);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<()> {
		self.store.write().await.remove(key);
		Ok(())
	}

	async fn has_key(&self, key: &str) -> Result<bool> {
		let store = self.store.read().await;
		Ok(store.get(key).is_some_and(|entry| !entry.is_expired()))
	}

	async fn clear(&self) -> Result<()> {
		self.store.write().await.clear();
		Ok(())
	}

	async fn delete_many(&self, keys: &[&str]) -> Result<()> {
		let mut store = self.store.write().await;
		for key in keys {
			store.remove(*key);
		}
		Ok(())
	}

	/// Atomic under the write lock; keeps the existing expiry
	async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
		let mut store = self.store.write().await;
		let (current, expires_at) = match store.get(key) {
			Some(entry) if !entry.is_expired() => {
				(serde_json::from_slice::<i64>(&entry.value)?, entry.expires_at)
			}
			_ => (0, None),
		};
		let next = current + delta;
		store.insert(
			key.to_string(),
			CacheEntry {
				value: serde_json::to_vec(&next)?,
				expires_at,
			},
		);
		Ok(next)
	}
}
