//! Prefixed environment variable reader

use std::env;

use crate::error::SettingsError;

/// Reads `{prefix}{KEY}` variables
///
/// Unset variables are `None`; set but unparsable ones are errors.
#[derive(Debug, Clone, Default)]
pub struct Env {
	prefix: Option<String>,
}

impl Env {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	pub fn key_name(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{prefix}{key}"),
			None => key.to_string(),
		}
	}

	pub fn str(&self, key: &str) -> Option<String> {
		env::var(self.key_name(key)).ok()
	}

	pub fn bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
		self.str(key)
			.map(|raw| parse_bool(&raw).map_err(|message| self.error(key, message)))
			.transpose()
	}

	pub fn int(&self, key: &str) -> Result<Option<i64>, SettingsError> {
		self.str(key)
			.map(|raw| raw.trim().parse::<i64>().map_err(|err| self.error(key, err.to_string())))
			.transpose()
	}

	pub fn uint(&self, key: &str) -> Result<Option<u64>, SettingsError> {
		self.str(key)
			.map(|raw| raw.trim().parse::<u64>().map_err(|err| self.error(key, err.to_string())))
			.transpose()
	}

	fn error(&self, key: &str, message: String) -> SettingsError {
		SettingsError::Env {
			key: self.key_name(key),
			message,
		}
	}
}

/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitively
pub fn parse_bool(raw: &str) -> Result<bool, String> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"true" | "yes" | "on" | "1" => Ok(true),
		"false" | "no" | "off" | "0" | "" => Ok(false),
		other => Err(format!("'{other}' is not a boolean")),
	}
}
