use pagetree_cache::{Cache, PermissionCache};
use pagetree_conf::{CmsSettings, PublicFor};
use pagetree_tree::SiteId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use super::{Action, PageIds, PermissionTuple, ResolvedPermissions};
use crate::error::CmsResult;
use crate::invalidation::InvalidationHook;
use crate::models::{PageId, Principal, User};
use crate::store::{Store, Tables};

/// Model permission needed to delete a page or translation that holds plugins
pub const DELETE_PLUGIN_PERMISSION: &str = "cms.delete_cmsplugin";

/// Model permission granting view access to every page
pub const VIEW_PAGE_PERMISSION: &str = "cms.view_page";

/// Permission resolution for one CMS instance
pub struct PagePermissions<C> {
	pub(super) store: Store,
	pub(super) settings: Arc<CmsSettings>,
	pub(super) cache: PermissionCache<C>,
	pub(super) hook: Arc<dyn InvalidationHook>,
}

impl<C> Clone for PagePermissions<C> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			settings: Arc::clone(&self.settings),
			cache: self.cache.clone(),
			hook: Arc::clone(&self.hook),
		}
	}
}

/// The stored row of `user` when there is one
///
/// Callers may hold a stale copy; group membership and flags are read from
/// the store.
fn current_user(tx: &Tables, user: &User) -> User {
	if !user.is_authenticated() {
		return user.clone();
	}
	tx.users.get(&user.id).cloned().unwrap_or_else(|| user.clone())
}

fn principal_matches(principal: &Principal, user: &User) -> bool {
	match principal {
		Principal::User(id) => *id == user.id,
		Principal::Group(id) => user.groups.contains(id),
		Principal::Everybody => true,
	}
}

fn has_model_permission(tx: &Tables, user: &User, codename: &str) -> bool {
	if user.is_superuser {
		return true;
	}
	user.permissions.contains(codename)
		|| user
			.groups
			.iter()
			.filter_map(|id| tx.groups.get(id))
			.any(|group| group.permissions.contains(codename))
}

fn has_base_permissions(tx: &Tables, user: &User, action: Action) -> bool {
	action
		.base_permissions()
		.iter()
		.all(|codename| has_model_permission(tx, user, codename))
}

fn has_global_grant(tx: &Tables, user: &User, site: SiteId, action: Action) -> bool {
	tx.global_permissions.values().any(|grant| {
		principal_matches(&grant.principal, user)
			&& grant.applies_to_site(site)
			&& action.granted_by(&grant.flags)
	})
}

/// Tuples of every action, from one scan of the page permissions of `site`
fn scan_tuples(tx: &Tables, user: &User, site: SiteId) -> HashMap<Action, Vec<PermissionTuple>> {
	let mut tuples: HashMap<Action, Vec<PermissionTuple>> = HashMap::new();
	for permission in tx.page_permissions.values() {
		if !principal_matches(&permission.principal, user) {
			continue;
		}
		let Ok(node) = tx.node_of(permission.page) else {
			continue;
		};
		if node.site != site {
			continue;
		}
		for action in Action::ALL {
			if action.granted_by(&permission.flags) {
				tuples
					.entry(action)
					.or_default()
					.push(PermissionTuple::new(permission.grant_on, node.path.clone()));
			}
		}
	}
	tuples
}

fn cache_action(action: Action, site: SiteId) -> String {
	format!("{action}:{site}")
}

/// Outcome of the checks that need no page permission rows
enum Precheck {
	Decided(ResolvedPermissions),
	Lookup(User),
}

impl<C: Cache> PagePermissions<C> {
	pub fn new(store: Store, cache: PermissionCache<C>, hook: Arc<dyn InvalidationHook>) -> Self {
		let settings = Arc::clone(store.settings());
		Self {
			store,
			settings,
			cache,
			hook,
		}
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn cache(&self) -> &PermissionCache<C> {
		&self.cache
	}

	fn precheck(&self, tx: &Tables, user: &User, site: SiteId, action: Action) -> Precheck {
		let user = current_user(tx, user);
		if !user.is_authenticated() || !user.is_active {
			return Precheck::Decided(ResolvedPermissions::Tuples(Vec::new()));
		}
		if !has_base_permissions(tx, &user, action) {
			trace!(username = %user.username, %action, "missing base permissions");
			return Precheck::Decided(ResolvedPermissions::Tuples(Vec::new()));
		}
		if user.is_superuser || !self.settings.permission {
			return Precheck::Decided(ResolvedPermissions::GrantAll);
		}
		if has_global_grant(tx, &user, site, action) {
			return Precheck::Decided(ResolvedPermissions::GrantAll);
		}
		Precheck::Lookup(user)
	}

	/// Pages of `site` on which `user` may perform `action`
	pub async fn resolve(&self, user: &User, site: SiteId, action: Action) -> ResolvedPermissions {
		self.resolve_with(user, site, action, true).await
	}

	async fn resolve_with(&self, user: &User, site: SiteId, action: Action, use_cache: bool) -> ResolvedPermissions {
		let user = match self.precheck(&*self.store.read().await, user, site, action) {
			Precheck::Decided(resolved) => return resolved,
			Precheck::Lookup(user) => user,
		};
		let key = cache_action(action, site);
		if use_cache {
			if let Some(cached) = self
				.cache
				.get_permission_cache::<ResolvedPermissions>(&user.username, &key)
				.await
			{
				return cached;
			}
		}

		let computed: Vec<(Action, ResolvedPermissions)> = {
			let tx = self.store.read().await;
			let mut tuples = scan_tuples(&tx, &user, site);
			Action::ALL
				.into_iter()
				.map(|each| {
					let resolved = if has_global_grant(&tx, &user, site, each) {
						ResolvedPermissions::GrantAll
					} else {
						ResolvedPermissions::Tuples(tuples.remove(&each).unwrap_or_default())
					};
					(each, resolved)
				})
				.collect()
		};
		debug!(username = %user.username, site, "resolved page permissions");

		let mut result = ResolvedPermissions::Tuples(Vec::new());
		for (each, resolved) in computed {
			self.cache
				.set_permission_cache(&user.username, &cache_action(each, site), &resolved)
				.await;
			if each == action {
				result = resolved;
			}
		}
		result
	}

	async fn check_page(&self, user: &User, page: PageId, action: Action) -> CmsResult<bool> {
		let (site, path) = {
			let tx = self.store.read().await;
			let node = tx.node_of(page)?;
			(node.site, node.path.clone())
		};
		let allowed = self.resolve(user, site, action).await.allows(&path);
		trace!(username = %user.username, page, %action, allowed, "page permission check");
		Ok(allowed)
	}

	async fn has_plugin_guard(&self, user: &User, page: PageId, language: Option<&str>) -> CmsResult<bool> {
		let tx = self.store.read().await;
		tx.page(page)?;
		if !tx.has_plugins(page, language) {
			return Ok(true);
		}
		Ok(has_model_permission(&tx, &current_user(&tx, user), DELETE_PLUGIN_PERMISSION))
	}

	/// Whether `user` may add pages at the root of `site`
	///
	/// Only global grants count here.
	pub async fn user_can_add_page(&self, user: &User, site: SiteId) -> bool {
		let tx = self.store.read().await;
		match self.precheck(&tx, user, site, Action::AddPage) {
			Precheck::Decided(resolved) => !resolved.is_empty(),
			Precheck::Lookup(_) => false,
		}
	}

	/// Whether `user` may add a page under `target`, or at the root when none
	pub async fn user_can_add_subpage(&self, user: &User, target: Option<PageId>, site: SiteId) -> CmsResult<bool> {
		match target {
			Some(page) => self.check_page(user, page, Action::AddPage).await,
			None => Ok(self.user_can_add_page(user, site).await),
		}
	}

	pub async fn user_can_change_page(&self, user: &User, page: PageId) -> CmsResult<bool> {
		self.check_page(user, page, Action::ChangePage).await
	}

	pub async fn user_can_delete_page(&self, user: &User, page: PageId) -> CmsResult<bool> {
		Ok(self.check_page(user, page, Action::DeletePage).await?
			&& self.has_plugin_guard(user, page, None).await?)
	}

	pub async fn user_can_delete_page_translation(&self, user: &User, page: PageId, language: &str) -> CmsResult<bool> {
		Ok(self.check_page(user, page, Action::DeletePageTranslation).await?
			&& self.has_plugin_guard(user, page, Some(language)).await?)
	}

	pub async fn user_can_move_page(&self, user: &User, page: PageId) -> CmsResult<bool> {
		self.check_page(user, page, Action::MovePage).await
	}

	pub async fn user_can_publish_page(&self, user: &User, page: PageId) -> CmsResult<bool> {
		self.check_page(user, page, Action::PublishPage).await
	}

	pub async fn user_can_change_page_advanced_settings(&self, user: &User, page: PageId) -> CmsResult<bool> {
		self.check_page(user, page, Action::ChangePageAdvancedSettings).await
	}

	pub async fn user_can_change_page_permissions(&self, user: &User, page: PageId) -> CmsResult<bool> {
		self.check_page(user, page, Action::ChangePagePermissions).await
	}

	/// Whether some page of `site` may be changed by `user`
	pub async fn user_can_change_at_least_one_page(&self, user: &User, site: SiteId, use_cache: bool) -> bool {
		!self
			.resolve_with(user, site, Action::ChangePage, use_cache)
			.await
			.is_empty()
	}

	fn public_for_allows(&self, user: &User) -> bool {
		match self.settings.public_for {
			PublicFor::All => true,
			PublicFor::Staff => user.is_staff,
		}
	}

	fn can_view_all_pages(&self, tx: &Tables, user: &User, site: SiteId) -> bool {
		if user.is_superuser {
			return true;
		}
		if !self.settings.permission {
			return self.public_for_allows(user);
		}
		has_model_permission(tx, user, VIEW_PAGE_PERMISSION)
			|| has_global_grant(tx, user, site, Action::ViewPage)
	}

	/// Whether a view permission row covers the node at `path`
	fn has_view_restrictions(&self, tx: &Tables, site: SiteId, path: &str) -> bool {
		self.settings.permission
			&& tx.page_permissions.values().any(|permission| {
				permission.flags.can_view
					&& tx.node_of(permission.page).is_ok_and(|node| {
						node.site == site && PermissionTuple::new(permission.grant_on, node.path.clone()).contains(path)
					})
			})
	}

	pub async fn user_can_view_page(&self, user: &User, page: PageId) -> CmsResult<bool> {
		let (restricted, site, path) = {
			let tx = self.store.read().await;
			let user = current_user(&tx, user);
			if user.is_superuser {
				return Ok(true);
			}
			let login_required = tx.page(page)?.login_required;
			if login_required && !user.is_authenticated() {
				return Ok(false);
			}
			let node = tx.node_of(page)?;
			let restricted = self.has_view_restrictions(&tx, node.site, &node.path);
			if !restricted && self.public_for_allows(&user) {
				return Ok(true);
			}
			if !user.is_authenticated() || !user.is_active {
				return Ok(false);
			}
			if self.can_view_all_pages(&tx, &user, node.site) {
				return Ok(true);
			}
			(restricted, node.site, node.path.clone())
		};
		if !restricted {
			return Ok(false);
		}
		if self.user_can_change_page(user, page).await? {
			return Ok(true);
		}
		Ok(self.resolve(user, site, Action::ViewPage).await.allows(&path))
	}

	/// Pages of `site` on which `user` may perform `action`
	pub async fn get_page_ids_for_action(&self, user: &User, site: SiteId, action: Action) -> PageIds {
		let resolved = self.resolve(user, site, action).await;
		let tuples = match resolved {
			ResolvedPermissions::GrantAll => return PageIds::All,
			ResolvedPermissions::Tuples(tuples) if tuples.is_empty() => return PageIds::Ids(Vec::new()),
			ResolvedPermissions::Tuples(tuples) => tuples,
		};
		let tx = self.store.read().await;
		let forest = tx.nodes.forest(site);
		let ids = forest
			.walk()
			.into_iter()
			.filter(|entry| tuples.iter().any(|tuple| tuple.contains(&entry.node.path)))
			.filter_map(|entry| tx.page_by_node(entry.node.id))
			.map(|page| page.id)
			.collect();
		PageIds::Ids(ids)
	}
}
