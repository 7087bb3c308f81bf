//! Error types for the CMS crate

use pagetree_conf::SettingsError;
use pagetree_tree::{SiteId, TreeError};
use thiserror::Error;

use crate::models::PageId;

/// Rejected input or a violated store constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// Another page already serves this path
	#[error(
		"path '{path}' ({language}) on site {site} is already used by page {conflicting_page}: {edit_url}"
	)]
	PathCollision {
		site: SiteId,
		language: String,
		path: String,
		conflicting_page: PageId,
		edit_url: String,
	},

	#[error("page {page} has no translation in '{language}'")]
	MissingLanguage { page: PageId, language: String },

	#[error("invalid slug '{0}'")]
	InvalidSlug(String),

	#[error("reverse id '{reverse_id}' on site {site} is already used by page {conflicting_page}")]
	DuplicateReverseId {
		site: SiteId,
		reverse_id: String,
		conflicting_page: PageId,
	},

	#[error("language '{language}' is not configured for site {site}")]
	UnknownLanguage { site: SiteId, language: String },

	#[error("page {page} already has a translation in '{language}'")]
	DuplicateTranslation { page: PageId, language: String },

	#[error("site {site} has more than one homepage: {pages:?}")]
	DuplicateHomepage { site: SiteId, pages: Vec<PageId> },

	#[error("page {page} must keep at least one translation")]
	LastTranslation { page: PageId },

	#[error("unknown template '{0}'")]
	UnknownTemplate(String),

	#[error("invalid principal: {0}")]
	InvalidPrincipal(String),
}

/// Errors surfaced by page and permission operations
#[derive(Debug, Error)]
pub enum CmsError {
	#[error("Validation error: {0}")]
	Validation(#[from] ValidationError),

	#[error("Invalid move: {0}")]
	InvalidMove(String),

	#[error("Permission denied: {capability}")]
	PermissionDenied { capability: String },

	#[error("{kind} not found: {id}")]
	NotFound { kind: &'static str, id: String },

	#[error("Settings error: {0}")]
	Settings(#[from] SettingsError),

	#[error("Fatal error: {0}")]
	Fatal(String),
}

impl CmsError {
	pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
		Self::NotFound {
			kind,
			id: id.to_string(),
		}
	}

	pub fn denied(capability: impl Into<String>) -> Self {
		Self::PermissionDenied {
			capability: capability.into(),
		}
	}
}

impl From<TreeError> for CmsError {
	fn from(err: TreeError) -> Self {
		match err {
			TreeError::InvalidMove(msg) | TreeError::InvalidPosition(msg) => Self::InvalidMove(msg),
			TreeError::NodeNotFound(id) => Self::not_found("node", id),
			other @ (TreeError::PathOverflow { .. } | TreeError::Corrupted(_)) => {
				Self::Fatal(other.to_string())
			}
		}
	}
}

/// Result type for CMS operations
pub type CmsResult<T> = Result<T, CmsError>;
