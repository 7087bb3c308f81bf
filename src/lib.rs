//! # Pagetree
//!
//! Hierarchical page tree for content management systems: pages live in a
//! materialized path tree, every translation has a URL path derived from its
//! ancestors, and edits are gated by page permissions resolved per user.
//!
//! ## Crates
//!
//! - [`tree`]: node table with move, delete, integrity check and repair
//! - [`cms`]: pages, URLs, copy and homepage handling, the permission engine,
//!   menus and the [`Cms`](cms::Cms) facade
//! - [`cache`]: cache backends and the per-user permission cache
//! - [`conf`]: layered settings (defaults, file, `PAGETREE_*` environment)
//!
//! ## Quick Example
//!
//! ```rust
//! use pagetree::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let cms = Cms::new(CmsSettings::default()).unwrap();
//! let editor = User::new(7, "editor").with_permissions(["cms.add_page", "cms.add_pagecontent"]);
//! cms.permissions().add_user(editor.clone()).await.unwrap();
//!
//! // permissions are off by default, so model permissions are enough
//! let page = cms.create_page_as(&editor, CreatePage::new("News", "en")).await.unwrap();
//! assert_eq!(cms.pages().get_path(&page, "en", false).await.unwrap().as_deref(), Some("news"));
//! # });
//! ```

pub mod cache;
pub mod cms;
pub mod conf;
pub mod tree;

/// Commonly used types
pub mod prelude {
	pub use pagetree_cms::prelude::*;
	pub use pagetree_conf::CmsSettings;
}
