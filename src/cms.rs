//! Page orchestration, URL paths, permissions and menus.

// Re-export all pagetree-cms functionality
pub use pagetree_cms::*;
