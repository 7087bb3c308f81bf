//! Row types held by the store
//!
//! Rows reference each other by id. Structural data (paths, depth, parent)
//! lives on the tree node a page points at, never on the page itself.

mod content;
mod page;
mod permission;
mod placeholder;
mod url;
mod user;

pub use content::{ContentIndicator, LimitVisibility, PageContent, PageContentOrEmpty, XFrameOptions};
pub use page::Page;
pub use permission::{GlobalPagePermission, GrantOn, PagePermission, PermissionFlags, Principal};
pub use placeholder::{CmsPlugin, Placeholder};
pub use url::PageUrl;
pub use user::{ANONYMOUS_USER_ID, Group, User};

pub type PageId = i64;
pub type UrlId = i64;
pub type ContentId = i64;
pub type PlaceholderId = i64;
pub type PluginId = i64;
pub type PermissionId = i64;
pub type UserId = i64;
pub type GroupId = i64;
