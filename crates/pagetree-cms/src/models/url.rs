use serde::{Deserialize, Serialize};

use super::{PageId, UrlId};

/// Per-language URL record of a page
///
/// `path` is denormalized from the ancestors' slugs. Unmanaged rows carry an
/// overwrite URL and are never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUrl {
	pub id: UrlId,
	pub page: PageId,
	pub language: String,
	pub slug: String,
	/// `None` only while a row is being rebuilt
	pub path: Option<String>,
	pub managed: bool,
}

impl PageUrl {
	pub fn managed(
		id: UrlId,
		page: PageId,
		language: impl Into<String>,
		slug: impl Into<String>,
		path: Option<String>,
	) -> Self {
		Self {
			id,
			page,
			language: language.into(),
			slug: slug.into(),
			path,
			managed: true,
		}
	}

	pub fn is_overwritten(&self) -> bool {
		!self.managed
	}
}
