use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pagetree_tree::{NodeId, TreeMember};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{PageId, PageUrl};

/// A page in the site tree
///
/// Cloning a page never shares its URL cache: every handed out value starts
/// cold and warms up on its first path lookups.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page {
	pub id: PageId,
	pub node: NodeId,
	pub is_home: bool,
	/// Unique per site
	pub reverse_id: Option<String>,
	/// Comma separated language codes that have content
	pub languages: String,
	/// Apphook bound to this page
	pub application_urls: Option<String>,
	pub application_namespace: Option<String>,
	pub navigation_extenders: Option<String>,
	pub login_required: bool,
	pub created_by: String,
	pub changed_by: String,
	pub creation_date: DateTime<Utc>,
	pub changed_date: DateTime<Utc>,
	#[serde(skip)]
	url_cache: Arc<DashMap<String, PageUrl>>,
}

impl Clone for Page {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			node: self.node,
			is_home: self.is_home,
			reverse_id: self.reverse_id.clone(),
			languages: self.languages.clone(),
			application_urls: self.application_urls.clone(),
			application_namespace: self.application_namespace.clone(),
			navigation_extenders: self.navigation_extenders.clone(),
			login_required: self.login_required,
			created_by: self.created_by.clone(),
			changed_by: self.changed_by.clone(),
			creation_date: self.creation_date,
			changed_date: self.changed_date,
			url_cache: Arc::default(),
		}
	}
}

impl Page {
	pub fn new(id: PageId, node: NodeId, created_by: impl Into<String>) -> Self {
		let created_by = created_by.into();
		let now = Utc::now();
		Self {
			id,
			node,
			is_home: false,
			reverse_id: None,
			languages: String::new(),
			application_urls: None,
			application_namespace: None,
			navigation_extenders: None,
			login_required: false,
			changed_by: created_by.clone(),
			created_by,
			creation_date: now,
			changed_date: now,
			url_cache: Arc::default(),
		}
	}

	pub fn get_languages(&self) -> Vec<String> {
		self.languages
			.split(',')
			.map(str::trim)
			.filter(|code| !code.is_empty())
			.map(str::to_string)
			.collect()
	}

	pub fn has_language(&self, language: &str) -> bool {
		self.get_languages().iter().any(|code| code == language)
	}

	/// Replace the language cache, dropping duplicates but keeping order
	pub fn update_languages<S: AsRef<str>>(&mut self, languages: &[S]) {
		let mut seen: Vec<&str> = Vec::with_capacity(languages.len());
		for code in languages {
			let code = code.as_ref();
			if !code.is_empty() && !seen.contains(&code) {
				seen.push(code);
			}
		}
		self.languages = seen.join(",");
	}

	pub fn has_apphook(&self) -> bool {
		self.application_urls
			.as_deref()
			.is_some_and(|urls| !urls.is_empty())
	}

	pub(crate) fn touch(&mut self, username: &str) {
		self.changed_by = username.to_string();
		self.changed_date = Utc::now();
	}

	pub(crate) fn cached_url(&self, language: &str) -> Option<PageUrl> {
		self.url_cache.get(language).map(|entry| entry.value().clone())
	}

	pub(crate) fn cache_url(&self, url: PageUrl) {
		self.url_cache.insert(url.language.clone(), url);
	}

	/// Forget every URL looked up through this value
	pub fn clear_url_cache(&self) {
		self.url_cache.clear();
	}
}

impl TreeMember for Page {
	fn node_id(&self) -> NodeId {
		self.node
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_languages_roundtrip() {
		let mut page = Page::new(1, 1, "admin");
		page.update_languages(&["en", "de", "en", ""]);
		assert_eq!(page.languages, "en,de");
		assert_eq!(page.get_languages(), vec!["en", "de"]);
		assert!(page.has_language("de"));
		assert!(!page.has_language("fr"));
	}

	#[rstest]
	fn test_clone_starts_with_cold_cache() {
		let page = Page::new(1, 1, "admin");
		page.cache_url(PageUrl::managed(1, 1, "en", "about", Some("about".into())));

		let copy = page.clone();

		assert!(page.cached_url("en").is_some());
		assert!(copy.cached_url("en").is_none());
	}
}
