use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("File error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),

	/// An environment variable is set but cannot be parsed
	#[error("Invalid value for environment variable {key}: {message}")]
	Env { key: String, message: String },

	#[error("Invalid value for '{key}': {message}")]
	Validation { key: String, message: String },

	#[error("Multiple validation errors: {0:?}")]
	Multiple(Vec<SettingsError>),
}

impl SettingsError {
	pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Validation {
			key: key.into(),
			message: message.into(),
		}
	}
}
