//! CMS settings
//!
//! Settings are plain serde structs with defaults for every field, so a
//! configuration file only needs the keys it changes.
//!
//! ```toml
//! site_id = 1
//! permission = true
//! public_for = "staff"
//!
//! [cache_durations]
//! permissions = 600
//!
//! [[languages.sites]]
//! site = 1
//!
//! [[languages.sites.languages]]
//! code = "en"
//! name = "English"
//!
//! [[languages.sites.languages]]
//! code = "de"
//! name = "Deutsch"
//! fallbacks = ["en"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::SiteId;
use crate::env::Env;
use crate::error::SettingsError;

/// Template path used by pages that inherit the template of their parent
pub const TEMPLATE_INHERITANCE_MAGIC: &str = "INHERIT";

/// Who may view pages without an explicit view restriction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicFor {
	#[default]
	All,
	Staff,
}

impl std::str::FromStr for PublicFor {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"all" => Ok(Self::All),
			"staff" => Ok(Self::Staff),
			other => Err(format!("expected 'all' or 'staff', got '{other}'")),
		}
	}
}

/// Cache lifetimes in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheDurations {
	pub permissions: u64,
	pub menus: u64,
	pub content: u64,
}

impl Default for CacheDurations {
	fn default() -> Self {
		Self {
			permissions: 3600,
			menus: 3600,
			content: 60,
		}
	}
}

/// One configured language
///
/// Unset options fall back to [`LanguageDefaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
	pub code: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub fallbacks: Option<Vec<String>>,
	#[serde(default)]
	pub hide_untranslated: Option<bool>,
	#[serde(default)]
	pub public: Option<bool>,
	#[serde(default)]
	pub redirect_on_fallback: Option<bool>,
}

impl Language {
	pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			name: name.into(),
			fallbacks: None,
			hide_untranslated: None,
			public: None,
			redirect_on_fallback: None,
		}
	}

	pub fn with_fallbacks(mut self, fallbacks: &[&str]) -> Self {
		self.fallbacks = Some(fallbacks.iter().map(|code| code.to_string()).collect());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageDefaults {
	/// `None` means every other language of the site, in configured order
	pub fallbacks: Option<Vec<String>>,
	pub hide_untranslated: bool,
	pub public: bool,
	pub redirect_on_fallback: bool,
}

impl Default for LanguageDefaults {
	fn default() -> Self {
		Self {
			fallbacks: None,
			hide_untranslated: true,
			public: true,
			redirect_on_fallback: true,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLanguages {
	pub site: SiteId,
	pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSettings {
	/// Used for sites without their own entry in `sites`
	pub available: Vec<Language>,
	pub sites: Vec<SiteLanguages>,
	pub defaults: LanguageDefaults,
}

impl Default for LanguageSettings {
	fn default() -> Self {
		Self {
			available: vec![Language::new("en", "English")],
			sites: Vec::new(),
			defaults: LanguageDefaults::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSetting {
	pub path: String,
	#[serde(default)]
	pub name: String,
}

impl TemplateSetting {
	pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			name: name.into(),
		}
	}
}

/// Top-level CMS settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
	/// Site used when a caller does not name one
	pub site_id: SiteId,

	/// Enables page-level permissions; when off every staff user with the
	/// base permissions may edit every page
	pub permission: bool,

	pub public_for: PublicFor,

	/// Prefix of every cache key written by the CMS
	pub cache_prefix: String,

	pub cache_durations: CacheDurations,

	pub languages: LanguageSettings,

	pub templates: Vec<TemplateSetting>,

	/// Template given to new root pages; the first entry of `templates` when unset
	pub default_template: Option<String>,

	/// Admin change URL of a page, `{id}` is replaced by the page id
	pub admin_edit_url: String,
}

impl Default for CmsSettings {
	fn default() -> Self {
		Self {
			site_id: 1,
			permission: false,
			public_for: PublicFor::All,
			cache_prefix: "cms".to_string(),
			cache_durations: CacheDurations::default(),
			languages: LanguageSettings::default(),
			templates: vec![TemplateSetting::new("base.html", "Base")],
			default_template: None,
			admin_edit_url: "/admin/cms/page/{id}/change/".to_string(),
		}
	}
}

impl CmsSettings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Read a `.toml` or `.json` settings file
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path)?;
		let settings = match path.extension().and_then(|ext| ext.to_str()) {
			Some("toml") => Self::from_toml_str(&contents)?,
			Some("json") => serde_json::from_str(&contents)
				.map_err(|err| SettingsError::invalid(path.display().to_string(), err.to_string()))?,
			_ => {
				return Err(SettingsError::UnsupportedFormat(
					"Supported formats: .toml, .json".to_string(),
				));
			}
		};
		debug!(path = %path.display(), "loaded CMS settings file");
		Ok(settings)
	}

	/// File (or defaults when `path` is `None`), then `PAGETREE_*` overrides,
	/// then validation
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let settings = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		let settings = settings.with_env_overrides()?;
		settings.validate()?;
		Ok(settings)
	}

	/// Apply `PAGETREE_*` environment variables on top of these settings
	pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
		self.with_env(&Env::new().with_prefix("PAGETREE_"))
	}

	pub(crate) fn with_env(mut self, env: &Env) -> Result<Self, SettingsError> {
		if let Some(site_id) = env.int("SITE_ID")? {
			self.site_id = site_id;
		}
		if let Some(permission) = env.bool("PERMISSION")? {
			self.permission = permission;
		}
		if let Some(public_for) = env.str("PUBLIC_FOR") {
			self.public_for = public_for.parse().map_err(|message| SettingsError::Env {
				key: env.key_name("PUBLIC_FOR"),
				message,
			})?;
		}
		if let Some(prefix) = env.str("CACHE_PREFIX") {
			self.cache_prefix = prefix;
		}
		if let Some(seconds) = env.uint("CACHE_DURATIONS_PERMISSIONS")? {
			self.cache_durations.permissions = seconds;
		}
		if let Some(seconds) = env.uint("CACHE_DURATIONS_MENUS")? {
			self.cache_durations.menus = seconds;
		}
		if let Some(seconds) = env.uint("CACHE_DURATIONS_CONTENT")? {
			self.cache_durations.content = seconds;
		}
		if let Some(template) = env.str("DEFAULT_TEMPLATE") {
			self.default_template = Some(template);
		}
		if let Some(url) = env.str("ADMIN_EDIT_URL") {
			self.admin_edit_url = url;
		}
		Ok(self)
	}

	pub fn permission_cache_ttl(&self) -> Duration {
		Duration::from_secs(self.cache_durations.permissions)
	}

	pub fn menu_cache_ttl(&self) -> Duration {
		Duration::from_secs(self.cache_durations.menus)
	}

	pub fn content_cache_ttl(&self) -> Duration {
		Duration::from_secs(self.cache_durations.content)
	}

	/// Languages configured for `site`, in priority order
	pub fn languages_for_site(&self, site: SiteId) -> &[Language] {
		self.languages
			.sites
			.iter()
			.find(|entry| entry.site == site)
			.map_or(self.languages.available.as_slice(), |entry| {
				entry.languages.as_slice()
			})
	}

	pub fn language_codes_for_site(&self, site: SiteId) -> Vec<String> {
		self.languages_for_site(site)
			.iter()
			.map(|language| language.code.clone())
			.collect()
	}

	pub fn get_language(&self, site: SiteId, code: &str) -> Option<&Language> {
		self.languages_for_site(site)
			.iter()
			.find(|language| language.code == code)
	}

	pub fn default_language(&self, site: SiteId) -> Option<&str> {
		self.languages_for_site(site)
			.first()
			.map(|language| language.code.as_str())
	}

	/// Languages tried, in order, when `language` has no content on `site`
	///
	/// Only languages configured for the site are returned and `language`
	/// itself never is.
	pub fn fallback_languages(&self, site: SiteId, language: &str) -> Vec<String> {
		let site_codes = self.language_codes_for_site(site);
		let explicit = self
			.get_language(site, language)
			.and_then(|lang| lang.fallbacks.clone())
			.or_else(|| self.languages.defaults.fallbacks.clone());
		let candidates = explicit.unwrap_or_else(|| site_codes.clone());
		candidates
			.into_iter()
			.filter(|code| code != language && site_codes.contains(code))
			.collect()
	}

	pub fn hide_untranslated(&self, site: SiteId, language: &str) -> bool {
		self.get_language(site, language)
			.and_then(|lang| lang.hide_untranslated)
			.unwrap_or(self.languages.defaults.hide_untranslated)
	}

	pub fn is_public_language(&self, site: SiteId, language: &str) -> bool {
		self.get_language(site, language)
			.and_then(|lang| lang.public)
			.unwrap_or(self.languages.defaults.public)
	}

	pub fn default_template(&self) -> &str {
		self.default_template
			.as_deref()
			.or_else(|| self.templates.first().map(|template| template.path.as_str()))
			.unwrap_or(TEMPLATE_INHERITANCE_MAGIC)
	}

	pub fn is_known_template(&self, path: &str) -> bool {
		path == TEMPLATE_INHERITANCE_MAGIC || self.templates.iter().any(|t| t.path == path)
	}

	/// Admin change URL of `page_id`
	pub fn edit_url(&self, page_id: i64) -> String {
		self.admin_edit_url.replace("{id}", &page_id.to_string())
	}
}
