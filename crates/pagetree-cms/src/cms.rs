//! Facade wiring the store, caches, pages and permissions together
//!
//! The `*_as` methods check the matching permission of the acting user and
//! fail with [`CmsError::PermissionDenied`] before the store is touched.

use pagetree_cache::{Cache, InMemoryCache, PermissionCache, VersionedNamespaces};
use pagetree_conf::CmsSettings;
use pagetree_tree::{NodeId, Position, SiteId};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{CmsError, CmsResult};
use crate::extensions::ExtensionPool;
use crate::fix_tree::FixTreeReport;
use crate::invalidation::{CacheInvalidator, InvalidationHook};
use crate::menu::{Menu, MenuNode};
use crate::models::{GrantOn, Page, PageId, PagePermission, PageUrl, PermissionFlags, Principal, User};
use crate::pages::{CopyOptions, CreatePage, HomepageChange, PageManager};
use crate::permissions::{Action, PagePermissions};
use crate::store::Store;

fn guard(allowed: bool, action: Action) -> CmsResult<()> {
	if allowed {
		Ok(())
	} else {
		Err(CmsError::denied(action.as_str()))
	}
}

/// One CMS instance
pub struct Cms<C: Cache = InMemoryCache> {
	store: Store,
	settings: Arc<CmsSettings>,
	pages: PageManager,
	permissions: PagePermissions<C>,
	menu: Menu<C>,
	invalidator: Arc<CacheInvalidator<C>>,
}

impl<C: Cache> Clone for Cms<C> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			settings: Arc::clone(&self.settings),
			pages: self.pages.clone(),
			permissions: self.permissions.clone(),
			menu: self.menu.clone(),
			invalidator: Arc::clone(&self.invalidator),
		}
	}
}

impl Cms<InMemoryCache> {
	/// Instance backed by a process-local cache
	pub fn new(settings: CmsSettings) -> CmsResult<Self> {
		Self::with_cache(settings, Arc::new(InMemoryCache::new()))
	}
}

impl<C: Cache + 'static> Cms<C> {
	/// Instance sharing `cache` for permissions, menus and page caches
	pub fn with_cache(settings: CmsSettings, cache: Arc<C>) -> CmsResult<Self> {
		settings.validate()?;
		let settings = Arc::new(settings);
		let store = Store::new(Arc::clone(&settings));

		let permission_cache = PermissionCache::new(Arc::clone(&cache), settings.cache_prefix.clone())
			.with_ttl(settings.permission_cache_ttl());
		let invalidator = Arc::new(CacheInvalidator::new(
			VersionedNamespaces::new(Arc::clone(&cache), settings.cache_prefix.clone()),
			permission_cache.clone(),
		));
		let hook: Arc<dyn InvalidationHook> = invalidator.clone();

		let pages = PageManager::new(store.clone(), Arc::clone(&hook));
		let permissions = PagePermissions::new(store.clone(), permission_cache, hook);
		let namespaces = Arc::new(VersionedNamespaces::new(cache, settings.cache_prefix.clone()));
		let menu = Menu::new(pages.clone(), permissions.clone(), namespaces);
		info!(site = settings.site_id, permission = settings.permission, "cms ready");

		Ok(Self {
			store,
			settings,
			pages,
			permissions,
			menu,
			invalidator,
		})
	}

	/// Use `extensions` when copying pages
	pub fn with_extensions(mut self, extensions: Arc<ExtensionPool>) -> Self {
		self.pages = self.pages.with_extensions(extensions);
		self.menu = Menu::new(
			self.pages.clone(),
			self.permissions.clone(),
			self.menu_namespaces(),
		);
		self
	}

	fn menu_namespaces(&self) -> Arc<VersionedNamespaces<C>> {
		Arc::new(VersionedNamespaces::new(
			Arc::clone(self.permissions.cache().backend()),
			self.settings.cache_prefix.clone(),
		))
	}

	pub fn settings(&self) -> &CmsSettings {
		&self.settings
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn pages(&self) -> &PageManager {
		&self.pages
	}

	pub fn permissions(&self) -> &PagePermissions<C> {
		&self.permissions
	}

	pub fn invalidator(&self) -> &CacheInvalidator<C> {
		&self.invalidator
	}

	pub async fn menu_nodes(&self, site: SiteId, language: &str, user: &User) -> CmsResult<Vec<MenuNode>> {
		self.menu.menu_nodes(site, language, user).await
	}

	pub async fn fix_tree(&self) -> CmsResult<FixTreeReport> {
		self.pages.fix_tree().await
	}

	async fn page_of_node(&self, node: NodeId) -> CmsResult<PageId> {
		self.store
			.read()
			.await
			.page_by_node(node)
			.map(|page| page.id)
			.ok_or_else(|| CmsError::not_found("page of node", node))
	}

	/// Whether `user` may add a page at `position` relative to `target`
	async fn can_add_at(&self, user: &User, target: PageId, position: Position, site: SiteId) -> CmsResult<bool> {
		if position.is_child() {
			return self.permissions.user_can_add_subpage(user, Some(target), site).await;
		}
		let parent = self.pages.get_parent_page(target).await?.map(|page| page.id);
		self.permissions.user_can_add_subpage(user, parent, site).await
	}

	pub async fn create_page_as(&self, user: &User, mut input: CreatePage) -> CmsResult<Page> {
		let allowed = match input.target {
			Some((target, position)) => {
				let site = self.store.read().await.site_of(target)?;
				self.can_add_at(user, target, position, site).await?
			}
			None => {
				let site = input.site.unwrap_or(self.settings.site_id);
				self.permissions.user_can_add_page(user, site).await
			}
		};
		guard(allowed, Action::AddPage)?;
		input.created_by = user.username.clone();
		self.pages.create_page(input).await
	}

	/// Move `page` after checking move rights on it and add rights at the target
	pub async fn move_page_as(&self, user: &User, page: PageId, target_node: NodeId, position: Position) -> CmsResult<Page> {
		guard(self.permissions.user_can_move_page(user, page).await?, Action::MovePage)?;
		let target = self.page_of_node(target_node).await?;
		let site = self.store.read().await.site_of(target)?;
		guard(self.can_add_at(user, target, position, site).await?, Action::AddPage)?;
		self.pages.move_page(page, target_node, position, &user.username).await
	}

	pub async fn copy_as(&self, user: &User, page: PageId, mut options: CopyOptions) -> CmsResult<Page> {
		let allowed = match options.parent_node {
			Some(node) => {
				let parent = self.page_of_node(node).await?;
				let site = self.store.read().await.site_of(parent)?;
				self.permissions.user_can_add_subpage(user, Some(parent), site).await?
			}
			None => {
				let site = match options.site {
					Some(site) => site,
					None => self.store.read().await.site_of(page)?,
				};
				self.permissions.user_can_add_page(user, site).await
			}
		};
		guard(allowed, Action::AddPage)?;
		if options.permissions {
			guard(
				self.permissions.user_can_change_page_permissions(user, page).await?,
				Action::ChangePagePermissions,
			)?;
		}
		options.user = user.username.clone();
		self.pages.copy(page, options).await
	}

	pub async fn copy_with_descendants_as(
		&self,
		user: &User,
		page: PageId,
		target_node: Option<NodeId>,
		position: Position,
		copy_permissions: bool,
		target_site: Option<SiteId>,
	) -> CmsResult<Page> {
		let allowed = match target_node {
			Some(node) => {
				let target = self.page_of_node(node).await?;
				let site = self.store.read().await.site_of(target)?;
				self.can_add_at(user, target, position, site).await?
			}
			None => {
				let site = match target_site {
					Some(site) => site,
					None => self.store.read().await.site_of(page)?,
				};
				self.permissions.user_can_add_page(user, site).await
			}
		};
		guard(allowed, Action::AddPage)?;
		if copy_permissions {
			guard(
				self.permissions.user_can_change_page_permissions(user, page).await?,
				Action::ChangePagePermissions,
			)?;
		}
		self.pages
			.copy_with_descendants(page, target_node, position, copy_permissions, target_site, &user.username)
			.await
	}

	pub async fn delete_page_as(&self, user: &User, page: PageId) -> CmsResult<Vec<PageId>> {
		guard(self.permissions.user_can_delete_page(user, page).await?, Action::DeletePage)?;
		debug!(username = %user.username, page, "deleting page");
		self.pages.delete(page).await
	}

	/// Needs change rights on the new homepage and on the one it replaces
	pub async fn set_as_homepage_as(&self, user: &User, page: PageId) -> CmsResult<HomepageChange> {
		guard(self.permissions.user_can_change_page(user, page).await?, Action::ChangePage)?;
		let site = self.store.read().await.site_of(page)?;
		if let Some(home) = self.pages.get_home_page(site).await.filter(|home| home.id != page) {
			guard(self.permissions.user_can_change_page(user, home.id).await?, Action::ChangePage)?;
		}
		self.pages.set_as_homepage(page, &user.username).await
	}

	pub async fn update_slug_as(&self, user: &User, page: PageId, language: &str, slug: &str) -> CmsResult<PageUrl> {
		guard(self.permissions.user_can_change_page(user, page).await?, Action::ChangePage)?;
		self.pages.update_slug(page, language, slug, &user.username).await
	}

	pub async fn delete_translation_as(&self, user: &User, page: PageId, language: &str) -> CmsResult<()> {
		guard(
			self.permissions
				.user_can_delete_page_translation(user, page, language)
				.await?,
			Action::DeletePageTranslation,
		)?;
		self.pages.delete_translation(page, language, &user.username).await
	}

	pub async fn set_application_as(
		&self,
		user: &User,
		page: PageId,
		urls: Option<&str>,
		namespace: Option<&str>,
	) -> CmsResult<Page> {
		guard(
			self.permissions
				.user_can_change_page_advanced_settings(user, page)
				.await?,
			Action::ChangePageAdvancedSettings,
		)?;
		self.pages.set_application(page, urls, namespace, &user.username).await
	}

	pub async fn grant_page_permission_as(
		&self,
		user: &User,
		page: PageId,
		principal: Principal,
		grant_on: GrantOn,
		flags: PermissionFlags,
	) -> CmsResult<PagePermission> {
		guard(
			self.permissions.user_can_change_page_permissions(user, page).await?,
			Action::ChangePagePermissions,
		)?;
		self.permissions
			.grant_page_permission(page, principal, grant_on, flags)
			.await
	}
}
