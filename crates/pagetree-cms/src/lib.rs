//! # pagetree-cms
//!
//! Page orchestration and permission resolution on top of the
//! [`pagetree_tree`] node engine.
//!
//! - [`pages::PageManager`]: create, move, copy, delete and re-home pages,
//!   keeping every managed URL path equal to the parent's path plus the slug
//! - [`permissions::PagePermissions`]: per-action checks built from global
//!   grants and path-anchored [`permissions::PermissionTuple`]s
//! - [`menu::Menu`]: navigation trees filtered by visibility and view rights
//! - [`Cms`]: the above wired to one cache, with permission-checked entry points
//!
//! ## Example
//!
//! ```
//! use pagetree_cms::prelude::*;
//! use pagetree_conf::CmsSettings;
//!
//! # tokio_test::block_on(async {
//! let cms = Cms::new(CmsSettings::default()).unwrap();
//! let pages = cms.pages();
//!
//! let home = pages.create_page(CreatePage::new("Home", "en")).await.unwrap();
//! pages.set_as_homepage(home.id, "admin").await.unwrap();
//! let about = pages
//!     .create_page(CreatePage::new("About us", "en").under(home.id))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(pages.get_path(&about, "en", false).await.unwrap().as_deref(), Some("about-us"));
//! assert_eq!(pages.get_absolute_url(&about, "en").await.unwrap().as_deref(), Some("/en/about-us/"));
//! # });
//! ```

pub mod cms;
pub mod error;
pub mod extensions;
pub mod fix_tree;
pub mod invalidation;
pub mod menu;
pub mod models;
pub mod pages;
pub mod permissions;
pub mod slugs;
pub mod store;

pub use cms::Cms;
pub use error::{CmsError, CmsResult, ValidationError};

/// Types most callers need
pub mod prelude {
	pub use crate::cms::Cms;
	pub use crate::error::{CmsError, CmsResult, ValidationError};
	pub use crate::extensions::{ExtensionPool, JsonExtension, PageExtension};
	pub use crate::fix_tree::FixTreeReport;
	pub use crate::invalidation::{InvalidationHook, InvalidationTarget};
	pub use crate::menu::MenuNode;
	pub use crate::models::{
		GrantOn, LimitVisibility, Page, PageContent, PageContentOrEmpty, PageId, PageUrl,
		PermissionFlags, Principal, User,
	};
	pub use crate::pages::{ContentUpdate, CopyOptions, CreatePage, HomepageChange, PageManager};
	pub use crate::permissions::{Action, PageIds, PagePermissions, PermissionTuple};
	pub use pagetree_tree::{NodeId, Position, SiteId};
}
