//! Key namespacing and versioned namespaces

use std::sync::Arc;
use tracing::warn;

use crate::backend::Cache;

/// Builds `prefix:version:key` strings
///
/// # Examples
///
/// ```
/// use pagetree_cache::CacheKeyBuilder;
///
/// let builder = CacheKeyBuilder::new("cms").with_version(3);
/// assert_eq!(builder.build("menu:1:en"), "cms:3:menu:1:en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyBuilder {
	prefix: String,
	version: u64,
}

impl CacheKeyBuilder {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			version: 1,
		}
	}

	pub fn with_version(mut self, version: u64) -> Self {
		self.version = version;
		self
	}

	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn build(&self, key: &str) -> String {
		format!("{}:{}:{}", self.prefix, self.version, key)
	}

	pub fn build_many(&self, keys: &[&str]) -> Vec<String> {
		keys.iter().map(|key| self.build(key)).collect()
	}
}

/// Namespaces invalidated by bumping a counter stored in the cache
///
/// Entries written under an older version are never read again and simply age
/// out through their TTL, so invalidating a namespace is a single increment.
/// Backend failures are logged and treated as version 1.
pub struct VersionedNamespaces<C> {
	cache: Arc<C>,
	prefix: String,
}

impl<C: Cache> VersionedNamespaces<C> {
	pub fn new(cache: Arc<C>, prefix: impl Into<String>) -> Self {
		Self {
			cache,
			prefix: prefix.into(),
		}
	}

	fn counter_key(&self, namespace: &str) -> String {
		format!("{}:version:{}", self.prefix, namespace)
	}

	pub async fn version(&self, namespace: &str) -> u64 {
		match self.cache.get::<u64>(&self.counter_key(namespace)).await {
			Ok(bumps) => bumps.unwrap_or(0) + 1,
			Err(err) => {
				warn!(namespace, error = %err, "failed to read cache namespace version");
				1
			}
		}
	}

	/// Invalidate every key of `namespace` and return the new version
	pub async fn bump(&self, namespace: &str) -> u64 {
		match self.cache.incr(&self.counter_key(namespace), 1).await {
			Ok(bumps) => bumps.max(0) as u64 + 1,
			Err(err) => {
				warn!(namespace, error = %err, "failed to bump cache namespace version");
				1
			}
		}
	}

	/// Key builder bound to the current version of `namespace`
	pub async fn builder(&self, namespace: &str) -> CacheKeyBuilder {
		let version = self.version(namespace).await;
		CacheKeyBuilder::new(format!("{}:{}", self.prefix, namespace)).with_version(version)
	}
}
