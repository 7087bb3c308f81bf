//! Cache backends, versioned namespaces and the permission cache.

pub use pagetree_cache::*;
