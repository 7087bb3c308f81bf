//! # pagetree-cache
//!
//! Cache layer shared by the pagetree crates:
//!
//! - [`Cache`]: async key/value interface with per-entry TTL
//! - [`InMemoryCache`]: process-local backend with hit/miss statistics
//! - [`CacheKeyBuilder`] and [`VersionedNamespaces`]: prefixed keys and
//!   namespaces invalidated by a version bump (page and menu caches)
//! - [`PermissionCache`]: per-user resolved permission storage cleared by
//!   bumping generation counters kept in the backend
//!
//! ## Example
//!
//! ```
//! use pagetree_cache::{InMemoryCache, PermissionCache};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let permissions = PermissionCache::new(Arc::new(InMemoryCache::new()), "cms")
//!     .with_ttl(Duration::from_secs(3600));
//!
//! permissions.set_permission_cache("alice", "change_page", &vec!["0001".to_string()]).await;
//! let cached: Option<Vec<String>> = permissions.get_permission_cache("alice", "change_page").await;
//! assert_eq!(cached, Some(vec!["0001".to_string()]));
//!
//! permissions.clear_permission_cache("alice").await;
//! let cached: Option<Vec<String>> = permissions.get_permission_cache("alice", "change_page").await;
//! assert_eq!(cached, None);
//! # });
//! ```

pub mod backend;
mod entry;
pub mod error;
pub mod in_memory;
pub mod key;
pub mod permission;
pub mod statistics;

pub use backend::Cache;
pub use error::{CacheError, Result};
pub use in_memory::InMemoryCache;
pub use key::{CacheKeyBuilder, VersionedNamespaces};
pub use permission::PermissionCache;
pub use statistics::CacheStatistics;
