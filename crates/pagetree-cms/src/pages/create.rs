//! Page creation, translations and per-translation edits

use pagetree_conf::{CmsSettings, TEMPLATE_INHERITANCE_MAGIC};
use pagetree_tree::{Position, SiteId};
use tracing::info;

use super::urls::{ensure_path_free, refresh_subtree, update_url_path};
use super::{PageManager, SCRIPT_USERNAME};
use crate::error::{CmsError, CmsResult, ValidationError};
use crate::invalidation::{InvalidationTarget, Invalidations};
use crate::models::{
	CmsPlugin, LimitVisibility, Page, PageContent, PageId, PageUrl, Placeholder, PluginId,
	XFrameOptions,
};
use crate::slugs::{normalize_overwrite_url, slugify, validate_slug};
use crate::store::Tables;

/// Input of [`PageManager::create_page`]
///
/// # Examples
///
/// ```
/// use pagetree_cms::pages::CreatePage;
/// use pagetree_tree::Position;
///
/// let input = CreatePage::new("About us", "en")
///     .at(7, Position::Right)
///     .reverse_id("about")
///     .created_by("editor");
/// assert_eq!(input.slug, None);
/// assert_eq!(input.target, Some((7, Position::Right)));
/// ```
#[derive(Debug, Clone)]
pub struct CreatePage {
	pub title: String,
	pub language: String,
	/// Derived from the title when unset
	pub slug: Option<String>,
	/// Site of a new root page; ignored when `target` is set
	pub site: Option<SiteId>,
	/// Existing page and position relative to it; a new root when unset
	pub target: Option<(PageId, Position)>,
	pub template: Option<String>,
	pub reverse_id: Option<String>,
	pub menu_title: Option<String>,
	pub page_title: Option<String>,
	pub meta_description: Option<String>,
	pub in_navigation: bool,
	pub soft_root: bool,
	pub redirect: Option<String>,
	pub xframe_options: XFrameOptions,
	pub limit_visibility_in_menu: Option<LimitVisibility>,
	pub overwrite_url: Option<String>,
	pub application_urls: Option<String>,
	pub application_namespace: Option<String>,
	pub login_required: bool,
	pub created_by: String,
}

impl CreatePage {
	pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			language: language.into(),
			slug: None,
			site: None,
			target: None,
			template: None,
			reverse_id: None,
			menu_title: None,
			page_title: None,
			meta_description: None,
			in_navigation: true,
			soft_root: false,
			redirect: None,
			xframe_options: XFrameOptions::Inherit,
			limit_visibility_in_menu: None,
			overwrite_url: None,
			application_urls: None,
			application_namespace: None,
			login_required: false,
			created_by: SCRIPT_USERNAME.to_string(),
		}
	}

	pub fn slug(mut self, slug: impl Into<String>) -> Self {
		self.slug = Some(slug.into());
		self
	}

	pub fn site(mut self, site: SiteId) -> Self {
		self.site = Some(site);
		self
	}

	/// Last child of `parent`
	pub fn under(self, parent: PageId) -> Self {
		self.at(parent, Position::LastChild)
	}

	pub fn at(mut self, target: PageId, position: Position) -> Self {
		self.target = Some((target, position));
		self
	}

	pub fn template(mut self, template: impl Into<String>) -> Self {
		self.template = Some(template.into());
		self
	}

	pub fn reverse_id(mut self, reverse_id: impl Into<String>) -> Self {
		self.reverse_id = Some(reverse_id.into());
		self
	}

	pub fn menu_title(mut self, menu_title: impl Into<String>) -> Self {
		self.menu_title = Some(menu_title.into());
		self
	}

	pub fn in_navigation(mut self, in_navigation: bool) -> Self {
		self.in_navigation = in_navigation;
		self
	}

	pub fn soft_root(mut self, soft_root: bool) -> Self {
		self.soft_root = soft_root;
		self
	}

	pub fn limit_visibility(mut self, limit: LimitVisibility) -> Self {
		self.limit_visibility_in_menu = Some(limit);
		self
	}

	pub fn overwrite_url(mut self, path: impl Into<String>) -> Self {
		self.overwrite_url = Some(path.into());
		self
	}

	pub fn apphook(mut self, urls: impl Into<String>, namespace: Option<&str>) -> Self {
		self.application_urls = Some(urls.into());
		self.application_namespace = namespace.map(str::to_string);
		self
	}

	pub fn login_required(mut self, login_required: bool) -> Self {
		self.login_required = login_required;
		self
	}

	pub fn created_by(mut self, username: impl Into<String>) -> Self {
		self.created_by = username.into();
		self
	}
}

/// Partial update of one translation; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct ContentUpdate {
	pub title: Option<String>,
	pub template: Option<String>,
	pub menu_title: Option<Option<String>>,
	pub page_title: Option<Option<String>>,
	pub meta_description: Option<Option<String>>,
	pub in_navigation: Option<bool>,
	pub soft_root: Option<bool>,
	pub redirect: Option<Option<String>>,
	pub xframe_options: Option<XFrameOptions>,
	pub limit_visibility_in_menu: Option<Option<LimitVisibility>>,
}

pub(crate) fn ensure_language(settings: &CmsSettings, site: SiteId, language: &str) -> CmsResult<()> {
	if settings.get_language(site, language).is_none() {
		return Err(ValidationError::UnknownLanguage {
			site,
			language: language.to_string(),
		}
		.into());
	}
	Ok(())
}

pub(crate) fn ensure_template(settings: &CmsSettings, template: &str) -> CmsResult<()> {
	if !settings.is_known_template(template) {
		return Err(ValidationError::UnknownTemplate(template.to_string()).into());
	}
	Ok(())
}

fn ensure_reverse_id_free(tx: &Tables, site: SiteId, reverse_id: &str, page: Option<PageId>) -> CmsResult<()> {
	match tx.page_by_reverse_id(site, reverse_id) {
		Some(other) if Some(other.id) != page => Err(ValidationError::DuplicateReverseId {
			site,
			reverse_id: reverse_id.to_string(),
			conflicting_page: other.id,
		}
		.into()),
		_ => Ok(()),
	}
}

fn missing_language(page: PageId, language: &str) -> CmsError {
	ValidationError::MissingLanguage {
		page,
		language: language.to_string(),
	}
	.into()
}

/// Insert the url and content rows of a new translation and compute its path
fn insert_translation(
	tx: &mut Tables,
	settings: &CmsSettings,
	page: PageId,
	content: PageContent,
	slug: String,
	overwrite_url: Option<String>,
) -> CmsResult<()> {
	let language = content.language.clone();
	let url_id = tx.next_id();
	let url = match overwrite_url {
		Some(path) => PageUrl {
			id: url_id,
			page,
			language: language.clone(),
			slug,
			path: Some(path),
			managed: false,
		},
		None => PageUrl::managed(url_id, page, language.clone(), slug, None),
	};
	tx.urls.insert(url_id, url);
	tx.contents.insert(content.id, content);
	update_url_path(tx, settings, page, &language)?;
	ensure_path_free(tx, settings, page, &language)?;

	let row = tx.page_mut(page)?;
	let mut languages = row.get_languages();
	languages.push(language);
	row.update_languages(&languages);
	Ok(())
}

pub(crate) fn create_page(
	tx: &mut Tables,
	settings: &CmsSettings,
	input: CreatePage,
	invalidations: &mut Invalidations,
) -> CmsResult<PageId> {
	let site = match input.target {
		Some((target, _)) => tx.site_of(target)?,
		None => input.site.unwrap_or(settings.site_id),
	};
	ensure_language(settings, site, &input.language)?;
	let slug = input.slug.clone().unwrap_or_else(|| slugify(&input.title));
	validate_slug(&slug)?;
	let overwrite_url = input
		.overwrite_url
		.as_deref()
		.map(normalize_overwrite_url)
		.transpose()?;
	if let Some(reverse_id) = input.reverse_id.as_deref() {
		ensure_reverse_id_free(tx, site, reverse_id, None)?;
	}

	let node = match input.target {
		Some((target, position)) => {
			let target_node = tx.page(target)?.node;
			if tx.nodes.insert_shifts(target_node, position)? {
				invalidations.push(InvalidationTarget::AllPermissions);
			}
			tx.nodes.insert_at(target_node, position)?
		}
		None => tx.nodes.add_root(site)?,
	};
	let template = match input.template {
		Some(template) => template,
		None if node.parent.is_some() => TEMPLATE_INHERITANCE_MAGIC.to_string(),
		None => settings.default_template().to_string(),
	};
	ensure_template(settings, &template)?;

	let id = tx.next_id();
	let mut page = Page::new(id, node.id, input.created_by.as_str());
	page.reverse_id = input.reverse_id;
	page.application_urls = input.application_urls;
	page.application_namespace = input.application_namespace;
	page.login_required = input.login_required;
	let has_apphook = page.has_apphook();
	tx.insert_page(page);

	let mut content = PageContent::new(
		tx.next_id(),
		id,
		input.language.as_str(),
		input.title,
		template,
		input.created_by.as_str(),
	);
	content.menu_title = input.menu_title;
	content.page_title = input.page_title;
	content.meta_description = input.meta_description;
	content.in_navigation = input.in_navigation;
	content.soft_root = input.soft_root;
	content.redirect = input.redirect;
	content.xframe_options = input.xframe_options;
	content.limit_visibility_in_menu = input.limit_visibility_in_menu;
	insert_translation(tx, settings, id, content, slug, overwrite_url)?;

	invalidations.site(site);
	if has_apphook {
		invalidations.push(InvalidationTarget::ApphookReload);
	}
	info!(page_id = id, site, language = %input.language, "created page");
	Ok(id)
}

impl PageManager {
	/// Create a page with its first translation
	///
	/// Fails with [`ValidationError::PathCollision`] citing the page that
	/// already serves the computed path.
	pub async fn create_page(&self, input: CreatePage) -> CmsResult<Page> {
		self.commit(|tx, invalidations| {
			let id = create_page(tx, &self.settings, input, invalidations)?;
			Ok(tx.page(id)?.clone())
		})
		.await
	}

	/// Add a translation to an existing page
	pub async fn add_translation(
		&self,
		page: PageId,
		language: &str,
		title: &str,
		slug: Option<&str>,
		user: &str,
	) -> CmsResult<PageContent> {
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			ensure_language(&self.settings, site, language)?;
			if tx.content_for(page, language).is_some() {
				return Err(ValidationError::DuplicateTranslation {
					page,
					language: language.to_string(),
				}
				.into());
			}
			let slug = slug.map_or_else(|| slugify(title), str::to_string);
			validate_slug(&slug)?;
			let template = tx
				.contents_of(page)
				.next()
				.map(|content| content.template.clone())
				.unwrap_or_else(|| self.settings.default_template().to_string());
			let content = PageContent::new(tx.next_id(), page, language, title, template, user);
			insert_translation(tx, &self.settings, page, content.clone(), slug, None)?;
			// descendants may have used this language through a fallback
			refresh_subtree(tx, &self.settings, page)?;
			tx.page_mut(page)?.touch(user);

			invalidations.site(site);
			info!(page_id = page, site, language, "added translation");
			Ok(content)
		})
		.await
	}

	/// Remove one translation with its url, placeholders and plugins
	pub async fn delete_translation(&self, page: PageId, language: &str, user: &str) -> CmsResult<()> {
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			let languages = tx.page(page)?.get_languages();
			if tx.content_for(page, language).is_none() && tx.url_for(page, language).is_none() {
				return Err(missing_language(page, language));
			}
			if languages.len() <= 1 {
				return Err(ValidationError::LastTranslation { page }.into());
			}
			tx.remove_translation_rows(page, language);
			let remaining: Vec<String> = languages.into_iter().filter(|code| code != language).collect();
			let row = tx.page_mut(page)?;
			row.update_languages(&remaining);
			row.touch(user);
			refresh_subtree(tx, &self.settings, page)?;

			invalidations.site(site);
			info!(page_id = page, site, language, "deleted translation");
			Ok(())
		})
		.await
	}

	/// Change the slug of one translation and cascade to descendants
	pub async fn update_slug(&self, page: PageId, language: &str, slug: &str, user: &str) -> CmsResult<PageUrl> {
		validate_slug(slug)?;
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			let url = tx
				.url_for_mut(page, language)
				.ok_or_else(|| missing_language(page, language))?;
			url.slug = slug.to_string();
			update_url_path(tx, &self.settings, page, language)?;
			ensure_path_free(tx, &self.settings, page, language)?;
			let rewritten = refresh_subtree(tx, &self.settings, page)?;
			tx.page_mut(page)?.touch(user);

			invalidations.site(site);
			info!(page_id = page, site, language, slug, rewritten, "updated slug");
			tx.url_for(page, language)
				.cloned()
				.ok_or_else(|| missing_language(page, language))
		})
		.await
	}

	pub async fn update_content(
		&self,
		page: PageId,
		language: &str,
		update: ContentUpdate,
		user: &str,
	) -> CmsResult<PageContent> {
		if let Some(template) = update.template.as_deref() {
			ensure_template(&self.settings, template)?;
		}
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			let content = tx
				.content_for_mut(page, language)
				.ok_or_else(|| missing_language(page, language))?;
			if let Some(title) = update.title {
				content.title = title;
			}
			if let Some(template) = update.template {
				content.template = template;
			}
			if let Some(menu_title) = update.menu_title {
				content.menu_title = menu_title;
			}
			if let Some(page_title) = update.page_title {
				content.page_title = page_title;
			}
			if let Some(meta_description) = update.meta_description {
				content.meta_description = meta_description;
			}
			if let Some(in_navigation) = update.in_navigation {
				content.in_navigation = in_navigation;
			}
			if let Some(soft_root) = update.soft_root {
				content.soft_root = soft_root;
			}
			if let Some(redirect) = update.redirect {
				content.redirect = redirect;
			}
			if let Some(xframe_options) = update.xframe_options {
				content.xframe_options = xframe_options;
			}
			if let Some(limit) = update.limit_visibility_in_menu {
				content.limit_visibility_in_menu = limit;
			}
			content.changed_by = user.to_string();
			let content = content.clone();
			tx.page_mut(page)?.touch(user);

			invalidations.site(site);
			Ok(content)
		})
		.await
	}

	/// Pin a translation to a fixed path outside the tree's slug chain
	pub async fn set_overwrite_url(&self, page: PageId, language: &str, path: &str, user: &str) -> CmsResult<PageUrl> {
		let path = normalize_overwrite_url(path)?;
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			let url = tx
				.url_for_mut(page, language)
				.ok_or_else(|| missing_language(page, language))?;
			url.managed = false;
			url.path = Some(path);
			ensure_path_free(tx, &self.settings, page, language)?;
			refresh_subtree(tx, &self.settings, page)?;
			tx.page_mut(page)?.touch(user);

			invalidations.site(site);
			info!(page_id = page, site, language, "set overwrite url");
			tx.url_for(page, language)
				.cloned()
				.ok_or_else(|| missing_language(page, language))
		})
		.await
	}

	/// Return a translation to its computed path
	pub async fn clear_overwrite_url(&self, page: PageId, language: &str, user: &str) -> CmsResult<PageUrl> {
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			let url = tx
				.url_for_mut(page, language)
				.ok_or_else(|| missing_language(page, language))?;
			url.managed = true;
			update_url_path(tx, &self.settings, page, language)?;
			ensure_path_free(tx, &self.settings, page, language)?;
			refresh_subtree(tx, &self.settings, page)?;
			tx.page_mut(page)?.touch(user);

			invalidations.site(site);
			tx.url_for(page, language)
				.cloned()
				.ok_or_else(|| missing_language(page, language))
		})
		.await
	}

	pub async fn set_reverse_id(&self, page: PageId, reverse_id: Option<&str>, user: &str) -> CmsResult<Page> {
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			if let Some(reverse_id) = reverse_id {
				ensure_reverse_id_free(tx, site, reverse_id, Some(page))?;
			}
			let row = tx.page_mut(page)?;
			row.reverse_id = reverse_id.map(str::to_string);
			row.touch(user);
			invalidations.site(site);
			Ok(row.clone())
		})
		.await
	}

	/// Bind or unbind an apphook
	pub async fn set_application(
		&self,
		page: PageId,
		urls: Option<&str>,
		namespace: Option<&str>,
		user: &str,
	) -> CmsResult<Page> {
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			let row = tx.page_mut(page)?;
			row.application_urls = urls.map(str::to_string);
			row.application_namespace = namespace.map(str::to_string);
			row.touch(user);
			let row = row.clone();
			invalidations.site(site);
			invalidations.push(InvalidationTarget::ApphookReload);
			info!(page_id = page, site, apphook = ?urls, "changed apphook");
			Ok(row)
		})
		.await
	}

	/// Append a plugin to a placeholder slot of one translation
	pub async fn add_plugin(
		&self,
		page: PageId,
		language: &str,
		slot: &str,
		plugin_type: &str,
		data: serde_json::Value,
		parent: Option<PluginId>,
	) -> CmsResult<CmsPlugin> {
		self.commit(|tx, invalidations| {
			let site = tx.site_of(page)?;
			let content = tx
				.content_for(page, language)
				.map(|content| content.id)
				.ok_or_else(|| missing_language(page, language))?;
			let existing = tx
				.placeholders_of(content)
				.find(|p| p.slot == slot)
				.map(|p| p.id);
			let placeholder = match existing {
				Some(id) => id,
				None => {
					let id = tx.next_id();
					tx.placeholders.insert(
						id,
						Placeholder {
							id,
							content,
							slot: slot.to_string(),
						},
					);
					id
				}
			};
			if let Some(parent) = parent {
				if tx.plugins.get(&parent).is_none_or(|p| p.placeholder != placeholder) {
					return Err(CmsError::not_found("plugin", parent));
				}
			}
			let position = tx
				.plugins
				.values()
				.filter(|p| p.placeholder == placeholder && p.parent == parent)
				.count() as u32
				+ 1;
			let plugin = CmsPlugin {
				id: tx.next_id(),
				placeholder,
				parent,
				position,
				language: language.to_string(),
				plugin_type: plugin_type.to_string(),
				data,
			};
			tx.plugins.insert(plugin.id, plugin.clone());
			invalidations.push(InvalidationTarget::PageCache(site));
			Ok(plugin)
		})
		.await
	}
}
