//! Per-user permission cache
//!
//! Entries are keyed `{prefix}:permission:{username}:{action}` and stamped
//! with two generation counters kept in the backend: one per user and one
//! shared by everybody. Clearing bumps a counter with [`Cache::incr`], which
//! hides every entry stamped with the old value in every process sharing the
//! backend; stale entries age out through their TTL. No list of users or
//! actions is ever rewritten, so concurrent writers cannot drop each other's
//! updates as long as the backend's `incr` is atomic.
//!
//! Cache failures never reach the caller: reads degrade to misses and writes
//! or deletes are logged and dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::Cache;
use crate::error::Result;

const GENERATION: &str = "__generation";

/// Generations an entry was written under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Generations {
	all: i64,
	user: i64,
}

#[derive(Serialize)]
struct StampedRef<'a, T> {
	generations: Generations,
	value: &'a T,
}

#[derive(Deserialize)]
struct Stamped<T> {
	generations: Generations,
	value: T,
}

/// Cache facade for resolved permissions
pub struct PermissionCache<C> {
	cache: Arc<C>,
	prefix: String,
	ttl: Option<Duration>,
}

impl<C> Clone for PermissionCache<C> {
	fn clone(&self) -> Self {
		Self {
			cache: Arc::clone(&self.cache),
			prefix: self.prefix.clone(),
			ttl: self.ttl,
		}
	}
}

impl<C: Cache> PermissionCache<C> {
	pub fn new(cache: Arc<C>, prefix: impl Into<String>) -> Self {
		Self {
			cache,
			prefix: prefix.into(),
			ttl: None,
		}
	}

	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = Some(ttl);
		self
	}

	pub fn backend(&self) -> &Arc<C> {
		&self.cache
	}

	/// Fully namespaced key of one cached action
	pub fn key(&self, username: &str, action: &str) -> String {
		format!("{}:permission:{}:{}", self.prefix, username, action)
	}

	fn user_generation_key(&self, username: &str) -> String {
		self.key(username, GENERATION)
	}

	fn all_generation_key(&self) -> String {
		format!("{}:permission:{}", self.prefix, GENERATION)
	}

	async fn generations(&self, username: &str) -> Result<Generations> {
		let all = self.cache.get::<i64>(&self.all_generation_key()).await?;
		let user = self.cache.get::<i64>(&self.user_generation_key(username)).await?;
		Ok(Generations {
			all: all.unwrap_or(0),
			user: user.unwrap_or(0),
		})
	}

	async fn bump(&self, key: &str) -> Option<i64> {
		match self.cache.incr(key, 1).await {
			Ok(generation) => Some(generation),
			Err(err) => {
				warn!(key, error = %err, "failed to bump permission cache generation");
				None
			}
		}
	}

	/// Cached value for `username` and `action`, `None` on miss or failure
	pub async fn get_permission_cache<T>(&self, username: &str, action: &str) -> Option<T>
	where
		T: DeserializeOwned + Send,
	{
		let current = match self.generations(username).await {
			Ok(generations) => generations,
			Err(err) => {
				warn!(username, action, error = %err, "permission cache read failed, recomputing");
				return None;
			}
		};
		let key = self.key(username, action);
		match self.cache.get::<Stamped<T>>(&key).await {
			Ok(Some(entry)) if entry.generations == current => {
				debug!(username, action, hit = true, "permission cache lookup");
				Some(entry.value)
			}
			Ok(_) => {
				debug!(username, action, hit = false, "permission cache lookup");
				None
			}
			Err(err) => {
				warn!(username, action, error = %err, "permission cache read failed, recomputing");
				None
			}
		}
	}

	pub async fn set_permission_cache<T>(&self, username: &str, action: &str, value: &T)
	where
		T: Serialize + Send + Sync,
	{
		let generations = match self.generations(username).await {
			Ok(generations) => generations,
			Err(err) => {
				warn!(username, action, error = %err, "permission cache write failed");
				return;
			}
		};
		let key = self.key(username, action);
		let entry = StampedRef { generations, value };
		if let Err(err) = self.cache.set(&key, &entry, self.ttl).await {
			warn!(username, action, error = %err, "permission cache write failed");
		}
	}

	/// Hide every cached action of `username`
	pub async fn clear_permission_cache(&self, username: &str) {
		if let Some(generation) = self.bump(&self.user_generation_key(username)).await {
			debug!(username, generation, "cleared permission cache");
		}
	}

	/// Hide the permission entries of every user
	pub async fn clear_all(&self) {
		if let Some(generation) = self.bump(&self.all_generation_key()).await {
			debug!(generation, "cleared every permission cache");
		}
	}
}
