//! # pagetree-conf
//!
//! Settings of the CMS core: the current site, the page permission switch,
//! who may see public pages, cache durations, per-site languages with their
//! fallback chains, and the template list.
//!
//! Settings are layered: defaults, then an optional TOML or JSON file, then
//! `PAGETREE_*` environment variables, and finally [`CmsSettings::validate`].
//!
//! ```
//! use pagetree_conf::CmsSettings;
//!
//! let settings = CmsSettings::from_toml_str("permission = true").unwrap();
//! settings.validate().unwrap();
//! assert!(settings.permission);
//! assert_eq!(settings.language_codes_for_site(settings.site_id), vec!["en"]);
//! ```

pub mod env;
pub mod error;
pub mod settings;
mod validation;

pub use env::{Env, parse_bool};
pub use error::SettingsError;
pub use settings::{
	CacheDurations, CmsSettings, Language, LanguageDefaults, LanguageSettings, PublicFor,
	SiteLanguages, TEMPLATE_INHERITANCE_MAGIC, TemplateSetting,
};

/// Site identifier
pub type SiteId = i64;
