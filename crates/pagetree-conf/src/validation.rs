//! Settings validation

use std::collections::HashSet;

use crate::error::SettingsError;
use crate::settings::{CmsSettings, Language};

impl CmsSettings {
	/// Check the settings for values the CMS cannot work with
	///
	/// Every problem is reported, wrapped in [`SettingsError::Multiple`] when
	/// there is more than one.
	pub fn validate(&self) -> Result<(), SettingsError> {
		let mut errors = Vec::new();

		if self.site_id < 1 {
			errors.push(SettingsError::invalid("site_id", "must be a positive id"));
		}
		if self.cache_prefix.is_empty() || self.cache_prefix.contains(char::is_whitespace) {
			errors.push(SettingsError::invalid(
				"cache_prefix",
				"must be non-empty and contain no whitespace",
			));
		}
		if !self.admin_edit_url.contains("{id}") {
			errors.push(SettingsError::invalid(
				"admin_edit_url",
				"must contain the {id} placeholder",
			));
		}
		if self.templates.is_empty() {
			errors.push(SettingsError::invalid("templates", "at least one template is required"));
		}
		let mut seen_templates = HashSet::new();
		for template in &self.templates {
			if !seen_templates.insert(template.path.as_str()) {
				errors.push(SettingsError::invalid(
					"templates",
					format!("duplicate template '{}'", template.path),
				));
			}
		}
		if let Some(default) = &self.default_template {
			if !self.is_known_template(default) {
				errors.push(SettingsError::invalid(
					"default_template",
					format!("'{default}' is not listed in templates"),
				));
			}
		}

		check_languages("languages.available", &self.languages.available, &mut errors);
		let mut seen_sites = HashSet::new();
		for entry in &self.languages.sites {
			if !seen_sites.insert(entry.site) {
				errors.push(SettingsError::invalid(
					"languages.sites",
					format!("site {} is configured twice", entry.site),
				));
			}
			check_languages(
				&format!("languages.sites[{}]", entry.site),
				&entry.languages,
				&mut errors,
			);
		}

		match errors.len() {
			0 => Ok(()),
			1 => Err(errors.remove(0)),
			_ => Err(SettingsError::Multiple(errors)),
		}
	}
}

fn check_languages(key: &str, languages: &[Language], errors: &mut Vec<SettingsError>) {
	if languages.is_empty() {
		errors.push(SettingsError::invalid(key, "at least one language is required"));
		return;
	}
	let codes: HashSet<&str> = languages.iter().map(|lang| lang.code.as_str()).collect();
	if codes.len() != languages.len() {
		errors.push(SettingsError::invalid(key, "language codes must be unique"));
	}
	for language in languages {
		if language.code.trim().is_empty() {
			errors.push(SettingsError::invalid(key, "language code must not be empty"));
		}
		for fallback in language.fallbacks.iter().flatten() {
			if !codes.contains(fallback.as_str()) {
				errors.push(SettingsError::invalid(
					key,
					format!("fallback '{fallback}' of '{}' is not configured", language.code),
				));
			}
		}
	}
}
