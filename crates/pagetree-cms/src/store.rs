//! Transactional in-memory store
//!
//! Every mutation runs through [`Store::atomic`]: the closure works on a
//! private copy of the tables, the copy is checked against the uniqueness
//! constraints and only then swapped in. A failing closure or constraint
//! leaves the committed state untouched.

use pagetree_conf::CmsSettings;
use pagetree_tree::{NodeId, NodeTable, SiteId, TreeNode};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, warn};

use crate::error::{CmsError, CmsResult, ValidationError};
use crate::models::{
	CmsPlugin, ContentId, GlobalPagePermission, Group, GroupId, Page, PageContent, PageId,
	PagePermission, PageUrl, PermissionId, Placeholder, PlaceholderId, PluginId, UrlId, User,
	UserId,
};

/// All rows of one CMS instance
#[derive(Debug, Clone, Default)]
pub struct Tables {
	pub nodes: NodeTable,
	pages: BTreeMap<PageId, Page>,
	node_pages: BTreeMap<NodeId, PageId>,
	pub urls: BTreeMap<UrlId, PageUrl>,
	pub contents: BTreeMap<ContentId, PageContent>,
	pub placeholders: BTreeMap<PlaceholderId, Placeholder>,
	pub plugins: BTreeMap<PluginId, CmsPlugin>,
	pub page_permissions: BTreeMap<PermissionId, PagePermission>,
	pub global_permissions: BTreeMap<PermissionId, GlobalPagePermission>,
	pub users: BTreeMap<UserId, User>,
	pub groups: BTreeMap<GroupId, Group>,
	/// Data owned by page extensions, keyed by page and extension name
	pub extension_data: BTreeMap<(PageId, String), serde_json::Value>,
	next_id: i64,
}

impl Tables {
	/// Allocate a row id; ids are unique across all tables
	pub fn next_id(&mut self) -> i64 {
		self.next_id += 1;
		self.next_id
	}

	pub fn pages(&self) -> impl Iterator<Item = &Page> {
		self.pages.values()
	}

	pub fn page(&self, id: PageId) -> CmsResult<&Page> {
		self.pages.get(&id).ok_or_else(|| CmsError::not_found("page", id))
	}

	pub fn page_mut(&mut self, id: PageId) -> CmsResult<&mut Page> {
		self.pages
			.get_mut(&id)
			.ok_or_else(|| CmsError::not_found("page", id))
	}

	pub fn page_by_node(&self, node: NodeId) -> Option<&Page> {
		self.node_pages
			.get(&node)
			.and_then(|id| self.pages.get(id))
	}

	pub fn insert_page(&mut self, page: Page) {
		self.node_pages.insert(page.node, page.id);
		self.pages.insert(page.id, page);
	}

	pub fn node_of(&self, page: PageId) -> CmsResult<&TreeNode> {
		let node = self.page(page)?.node;
		Ok(self.nodes.get(node)?)
	}

	pub fn site_of(&self, page: PageId) -> CmsResult<SiteId> {
		Ok(self.node_of(page)?.site)
	}

	pub fn parent_page(&self, page: PageId) -> CmsResult<Option<&Page>> {
		let node = self.node_of(page)?;
		Ok(node.parent.and_then(|parent| self.page_by_node(parent)))
	}

	pub fn home_page(&self, site: SiteId) -> Option<&Page> {
		self.pages
			.values()
			.filter(|page| page.is_home)
			.find(|page| self.nodes.find(page.node).is_some_and(|node| node.site == site))
	}

	pub fn page_by_reverse_id(&self, site: SiteId, reverse_id: &str) -> Option<&Page> {
		self.pages
			.values()
			.filter(|page| page.reverse_id.as_deref() == Some(reverse_id))
			.find(|page| self.nodes.find(page.node).is_some_and(|node| node.site == site))
	}

	/// Pages of `site` in tree order
	pub fn site_pages(&self, site: SiteId) -> Vec<&Page> {
		let mut nodes: Vec<&TreeNode> = self.nodes.iter_site(site).collect();
		nodes.sort_by(|a, b| a.path.cmp(&b.path));
		nodes
			.into_iter()
			.filter_map(|node| self.page_by_node(node.id))
			.collect()
	}

	pub fn url_for(&self, page: PageId, language: &str) -> Option<&PageUrl> {
		self.urls
			.values()
			.find(|url| url.page == page && url.language == language)
	}

	pub fn url_for_mut(&mut self, page: PageId, language: &str) -> Option<&mut PageUrl> {
		self.urls
			.values_mut()
			.find(|url| url.page == page && url.language == language)
	}

	pub fn urls_of(&self, page: PageId) -> impl Iterator<Item = &PageUrl> {
		self.urls.values().filter(move |url| url.page == page)
	}

	pub fn content_for(&self, page: PageId, language: &str) -> Option<&PageContent> {
		self.contents
			.values()
			.find(|content| content.page == page && content.language == language)
	}

	pub fn content_for_mut(&mut self, page: PageId, language: &str) -> Option<&mut PageContent> {
		self.contents
			.values_mut()
			.find(|content| content.page == page && content.language == language)
	}

	pub fn contents_of(&self, page: PageId) -> impl Iterator<Item = &PageContent> {
		self.contents.values().filter(move |content| content.page == page)
	}

	pub fn placeholders_of(&self, content: ContentId) -> impl Iterator<Item = &Placeholder> {
		self.placeholders
			.values()
			.filter(move |placeholder| placeholder.content == content)
	}

	/// Plugins of a placeholder ordered so parents precede their children
	pub fn plugins_of(&self, placeholder: PlaceholderId) -> Vec<&CmsPlugin> {
		let mut plugins: Vec<&CmsPlugin> = self
			.plugins
			.values()
			.filter(|plugin| plugin.placeholder == placeholder)
			.collect();
		let depth = |plugin: &CmsPlugin| {
			let mut depth = 0;
			let mut cursor = plugin.parent;
			while let Some(parent) = cursor {
				depth += 1;
				cursor = self.plugins.get(&parent).and_then(|p| p.parent);
				if depth > self.plugins.len() {
					break;
				}
			}
			depth
		};
		plugins.sort_by_key(|plugin| (depth(plugin), plugin.parent, plugin.position, plugin.id));
		plugins
	}

	/// Whether any translation of `page` in `language` (or any language) holds plugins
	pub fn has_plugins(&self, page: PageId, language: Option<&str>) -> bool {
		self.contents_of(page)
			.filter(|content| language.is_none_or(|code| content.language == code))
			.flat_map(|content| self.placeholders_of(content.id))
			.any(|placeholder| {
				self.plugins
					.values()
					.any(|plugin| plugin.placeholder == placeholder.id)
			})
	}

	/// Remove the url, content, placeholders and plugins of one translation
	pub(crate) fn remove_translation_rows(&mut self, page: PageId, language: &str) {
		self.urls
			.retain(|_, url| !(url.page == page && url.language == language));
		let doomed: Vec<ContentId> = self
			.contents_of(page)
			.filter(|content| content.language == language)
			.map(|content| content.id)
			.collect();
		self.remove_contents(&doomed);
	}

	fn remove_contents(&mut self, contents: &[ContentId]) {
		let placeholders: Vec<PlaceholderId> = self
			.placeholders
			.values()
			.filter(|placeholder| contents.contains(&placeholder.content))
			.map(|placeholder| placeholder.id)
			.collect();
		self.plugins
			.retain(|_, plugin| !placeholders.contains(&plugin.placeholder));
		self.placeholders
			.retain(|id, _| !placeholders.contains(id));
		self.contents.retain(|id, _| !contents.contains(id));
	}

	/// Remove a page row and everything hanging off it, except its node
	pub(crate) fn remove_page_rows(&mut self, page: PageId) -> Option<Page> {
		let removed = self.pages.remove(&page)?;
		self.node_pages.remove(&removed.node);
		self.urls.retain(|_, url| url.page != page);
		let contents: Vec<ContentId> = self.contents_of(page).map(|c| c.id).collect();
		self.remove_contents(&contents);
		self.page_permissions.retain(|_, perm| perm.page != page);
		self.extension_data.retain(|(owner, _), _| *owner != page);
		Some(removed)
	}

	/// Page owning a path in `language` on `site`, ignoring `exclude`
	pub fn find_url_conflict(
		&self,
		site: SiteId,
		language: &str,
		path: &str,
		exclude: &[PageId],
	) -> Option<PageId> {
		self.urls
			.values()
			.filter(|url| url.language == language && url.path.as_deref() == Some(path))
			.filter(|url| !exclude.contains(&url.page))
			.find(|url| self.site_of(url.page).is_ok_and(|s| s == site))
			.map(|url| url.page)
	}

	/// Verify the uniqueness constraints a committed state must satisfy
	pub fn check_constraints(&self, settings: &CmsSettings) -> CmsResult<()> {
		let mut url_keys: HashMap<(PageId, &str), UrlId> = HashMap::new();
		let mut paths: HashMap<(SiteId, &str, &str), PageId> = HashMap::new();
		for url in self.urls.values() {
			let site = self.site_of(url.page).map_err(|_| {
				CmsError::Fatal(format!("url {} points at missing page {}", url.id, url.page))
			})?;
			if url_keys.insert((url.page, url.language.as_str()), url.id).is_some() {
				return Err(CmsError::Fatal(format!(
					"page {} has two urls in '{}'",
					url.page, url.language
				)));
			}
			let Some(path) = url.path.as_deref() else {
				continue;
			};
			if let Some(other) = paths.insert((site, url.language.as_str(), path), url.page) {
				let conflicting_page = other.min(url.page);
				return Err(ValidationError::PathCollision {
					site,
					language: url.language.clone(),
					path: path.to_string(),
					conflicting_page,
					edit_url: settings.edit_url(conflicting_page),
				}
				.into());
			}
		}

		let mut content_keys: HashMap<(PageId, &str), ContentId> = HashMap::new();
		for content in self.contents.values() {
			if content_keys
				.insert((content.page, content.language.as_str()), content.id)
				.is_some()
			{
				return Err(ValidationError::DuplicateTranslation {
					page: content.page,
					language: content.language.clone(),
				}
				.into());
			}
		}

		let mut homes: BTreeMap<SiteId, Vec<PageId>> = BTreeMap::new();
		let mut reverse_ids: HashMap<(SiteId, &str), PageId> = HashMap::new();
		for page in self.pages.values() {
			let site = self.site_of(page.id)?;
			if page.is_home {
				homes.entry(site).or_default().push(page.id);
			}
			if let Some(reverse_id) = page.reverse_id.as_deref() {
				if let Some(other) = reverse_ids.insert((site, reverse_id), page.id) {
					return Err(ValidationError::DuplicateReverseId {
						site,
						reverse_id: reverse_id.to_string(),
						conflicting_page: other.min(page.id),
					}
					.into());
				}
			}
		}
		if let Some((site, pages)) = homes.into_iter().find(|(_, pages)| pages.len() > 1) {
			return Err(ValidationError::DuplicateHomepage { site, pages }.into());
		}
		Ok(())
	}
}

/// Shared handle to the tables of one CMS instance
#[derive(Clone)]
pub struct Store {
	tables: Arc<RwLock<Tables>>,
	settings: Arc<CmsSettings>,
}

impl Store {
	pub fn new(settings: Arc<CmsSettings>) -> Self {
		Self {
			tables: Arc::new(RwLock::new(Tables::default())),
			settings,
		}
	}

	pub fn settings(&self) -> &Arc<CmsSettings> {
		&self.settings
	}

	pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
		self.tables.read().await
	}

	/// Run `op` as one transaction
	///
	/// The write lock is held for the whole closure, so transactions are
	/// serialized. Readers keep seeing the previous state until commit.
	pub async fn atomic<T, F>(&self, op: F) -> CmsResult<T>
	where
		F: FnOnce(&mut Tables) -> CmsResult<T>,
	{
		let mut committed = self.tables.write().await;
		let mut draft = committed.clone();
		let outcome = op(&mut draft).and_then(|value| {
			draft.check_constraints(&self.settings)?;
			Ok(value)
		});
		match outcome {
			Ok(value) => {
				*committed = draft;
				debug!("transaction committed");
				Ok(value)
			}
			Err(err) => {
				warn!(error = %err, "transaction rolled back");
				Err(err)
			}
		}
	}
}
