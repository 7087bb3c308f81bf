//! Settings: site, permission switch, languages, templates and cache lifetimes.
//!
//! # Examples
//!
//! ```rust
//! use pagetree::conf::{CmsSettings, PublicFor};
//!
//! let settings = CmsSettings::from_toml_str("public_for = \"staff\"").unwrap();
//! assert_eq!(settings.public_for, PublicFor::Staff);
//! ```

pub use pagetree_conf::*;
