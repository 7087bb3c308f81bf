//! Page permission resolution
//!
//! A check runs through a fixed ladder: anonymous and inactive users are
//! refused, then users lacking the model permissions of the action, then
//! superusers and global grants get every page of the site. Only what is
//! left reads page permission rows.
//!
//! Those rows are turned into [`PermissionTuple`]s, a grant breadth anchored
//! at a node path, so a check against any page is a prefix comparison. One
//! scan resolves every [`Action`] for the user and site and each result is
//! cached under `"{action}:{site}"`.

mod actions;
mod engine;
mod management;
mod tuple;

pub use actions::Action;
pub use engine::{DELETE_PLUGIN_PERMISSION, PagePermissions, VIEW_PAGE_PERMISSION};
pub use tuple::{PageIds, PermissionTuple, ResolvedPermissions};

