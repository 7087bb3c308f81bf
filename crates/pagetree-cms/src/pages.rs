//! Page tree orchestration
//!
//! [`PageManager`] wraps every structural operation in one store transaction:
//! tree arithmetic on the node table, URL path recomputation for the affected
//! subtree in parent-before-child order, then the uniqueness check at commit.
//! Caches are invalidated only after the commit succeeded.

mod copy;
mod create;
mod delete;
mod homepage;
mod moving;
mod query;
mod urls;

use pagetree_conf::CmsSettings;
use std::sync::Arc;

pub use copy::CopyOptions;
pub use create::{ContentUpdate, CreatePage};
pub use homepage::HomepageChange;
pub use urls::get_available_slug;

pub(crate) use urls::{absolute_url, language_chain, refresh_subtree, resolve_url};

use crate::error::CmsResult;
use crate::extensions::ExtensionPool;
use crate::invalidation::{self, InvalidationHook, Invalidations};
use crate::store::{Store, Tables};

/// Username recorded when no user drives a change
pub const SCRIPT_USERNAME: &str = "script";

/// Entry point for page mutations and lookups
#[derive(Clone)]
pub struct PageManager {
	store: Store,
	settings: Arc<CmsSettings>,
	extensions: Arc<ExtensionPool>,
	hook: Arc<dyn InvalidationHook>,
}

impl PageManager {
	pub fn new(store: Store, hook: Arc<dyn InvalidationHook>) -> Self {
		let settings = Arc::clone(store.settings());
		Self {
			store,
			settings,
			extensions: Arc::new(ExtensionPool::new()),
			hook,
		}
	}

	pub fn with_extensions(mut self, extensions: Arc<ExtensionPool>) -> Self {
		self.extensions = extensions;
		self
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn settings(&self) -> &CmsSettings {
		&self.settings
	}

	pub fn extensions(&self) -> &ExtensionPool {
		&self.extensions
	}

	pub(crate) async fn commit<T, F>(&self, op: F) -> CmsResult<T>
	where
		F: FnOnce(&mut Tables, &mut Invalidations) -> CmsResult<T>,
	{
		invalidation::commit(&self.store, self.hook.as_ref(), op).await
	}
}
