//! Cache invalidation after commit
//!
//! Mutations return the caches they made stale as an ordered list of
//! [`InvalidationTarget`]s. The list is handed to an [`InvalidationHook`]
//! once the transaction has committed, never before.

use async_trait::async_trait;
use pagetree_cache::{Cache, PermissionCache, VersionedNamespaces};
use pagetree_tree::SiteId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::error::CmsResult;
use crate::store::{Store, Tables};

/// One cache made stale by a committed mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationTarget {
	PageCache(SiteId),
	MenuCache(SiteId),
	/// Cached permissions of one username
	PermissionCache(String),
	AllPermissions,
	/// URL configuration depends on apphooks that changed
	ApphookReload,
}

/// Ordered list of targets without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidations(Vec<InvalidationTarget>);

impl Invalidations {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, target: InvalidationTarget) {
		if !self.0.contains(&target) {
			self.0.push(target);
		}
	}

	/// Page and menu caches of `site`
	pub fn site(&mut self, site: SiteId) {
		self.push(InvalidationTarget::PageCache(site));
		self.push(InvalidationTarget::MenuCache(site));
	}

	pub fn user(&mut self, username: impl Into<String>) {
		self.push(InvalidationTarget::PermissionCache(username.into()));
	}

	pub fn extend(&mut self, other: Invalidations) {
		for target in other.0 {
			self.push(target);
		}
	}

	pub fn targets(&self) -> &[InvalidationTarget] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Receiver of committed invalidations
#[async_trait]
pub trait InvalidationHook: Send + Sync {
	async fn invalidate(&self, targets: &[InvalidationTarget]);
}

/// Run `op` in a store transaction, then hand its invalidations to `hook`
pub(crate) async fn commit<T, F>(store: &Store, hook: &dyn InvalidationHook, op: F) -> CmsResult<T>
where
	F: FnOnce(&mut Tables, &mut Invalidations) -> CmsResult<T>,
{
	let (value, invalidations) = store
		.atomic(|tx| {
			let mut invalidations = Invalidations::new();
			let value = op(tx, &mut invalidations)?;
			Ok((value, invalidations))
		})
		.await?;
	if !invalidations.is_empty() {
		debug!(targets = ?invalidations.targets(), "running invalidation hooks");
		hook.invalidate(invalidations.targets()).await;
	}
	Ok(value)
}

/// Hook that drops every target
pub struct NoopInvalidation;

#[async_trait]
impl InvalidationHook for NoopInvalidation {
	async fn invalidate(&self, _targets: &[InvalidationTarget]) {}
}

/// Namespace holding the page cache of a site
pub fn page_namespace(site: SiteId) -> String {
	format!("page:{site}")
}

/// Namespace holding the menu cache of a site
pub fn menu_namespace(site: SiteId) -> String {
	format!("menu:{site}")
}

/// Hook backed by the shared cache
///
/// Page and menu caches are invalidated by bumping their namespace version,
/// permission caches by evicting the user's entries.
pub struct CacheInvalidator<C> {
	namespaces: VersionedNamespaces<C>,
	permissions: PermissionCache<C>,
	apphook_reloads: AtomicU64,
	history: Mutex<Vec<InvalidationTarget>>,
}

impl<C: Cache> CacheInvalidator<C> {
	pub fn new(namespaces: VersionedNamespaces<C>, permissions: PermissionCache<C>) -> Self {
		Self {
			namespaces,
			permissions,
			apphook_reloads: AtomicU64::new(0),
			history: Mutex::new(Vec::new()),
		}
	}

	/// Number of apphook reloads requested so far
	pub fn apphook_reloads(&self) -> u64 {
		self.apphook_reloads.load(Ordering::SeqCst)
	}

	/// Every target applied so far, in order
	pub fn history(&self) -> Vec<InvalidationTarget> {
		self.history.lock().clone()
	}

	async fn apply(&self, target: &InvalidationTarget) {
		match target {
			InvalidationTarget::PageCache(site) => {
				let version = self.namespaces.bump(&page_namespace(*site)).await;
				debug!(site, version, "page cache invalidated");
			}
			InvalidationTarget::MenuCache(site) => {
				let version = self.namespaces.bump(&menu_namespace(*site)).await;
				debug!(site, version, "menu cache invalidated");
			}
			InvalidationTarget::PermissionCache(username) => {
				self.permissions.clear_permission_cache(username).await;
			}
			InvalidationTarget::AllPermissions => {
				self.permissions.clear_all().await;
			}
			InvalidationTarget::ApphookReload => {
				self.apphook_reloads.fetch_add(1, Ordering::SeqCst);
				info!("apphook reload requested");
			}
		}
	}
}

#[async_trait]
impl<C: Cache + 'static> InvalidationHook for CacheInvalidator<C> {
	async fn invalidate(&self, targets: &[InvalidationTarget]) {
		for target in targets {
			self.apply(target).await;
		}
		self.history.lock().extend(targets.iter().cloned());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pagetree_cache::InMemoryCache;
	use rstest::rstest;
	use std::sync::Arc;

	#[rstest]
	fn test_targets_keep_first_occurrence_order() {
		let mut targets = Invalidations::new();
		targets.site(1);
		targets.user("alice");
		targets.site(1);
		targets.push(InvalidationTarget::ApphookReload);

		assert_eq!(
			targets.targets(),
			&[
				InvalidationTarget::PageCache(1),
				InvalidationTarget::MenuCache(1),
				InvalidationTarget::PermissionCache("alice".into()),
				InvalidationTarget::ApphookReload,
			]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_cache_invalidator_bumps_namespaces() {
		// Arrange
		let cache = Arc::new(InMemoryCache::new());
		let invalidator = CacheInvalidator::new(
			VersionedNamespaces::new(cache.clone(), "cms"),
			PermissionCache::new(cache.clone(), "cms"),
		);
		let namespaces = VersionedNamespaces::new(cache.clone(), "cms");
		invalidator
			.permissions
			.set_permission_cache("alice", "change_page:1", &true)
			.await;

		// Act
		invalidator
			.invalidate(&[
				InvalidationTarget::MenuCache(1),
				InvalidationTarget::PermissionCache("alice".into()),
				InvalidationTarget::ApphookReload,
			])
			.await;

		// Assert
		assert_eq!(namespaces.version(&menu_namespace(1)).await, 2);
		assert_eq!(namespaces.version(&page_namespace(1)).await, 1);
		let cached: Option<bool> = invalidator
			.permissions
			.get_permission_cache("alice", "change_page:1")
			.await;
		assert_eq!(cached, None);
		assert_eq!(invalidator.apphook_reloads(), 1);
		assert_eq!(invalidator.history().len(), 3);
	}
}
