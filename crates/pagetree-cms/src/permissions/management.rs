//! Permission rows, users and groups
//!
//! Every change clears the cached permissions of the users it affects once
//! the transaction has committed.

use pagetree_cache::Cache;
use pagetree_tree::SiteId;
use std::collections::BTreeSet;
use tracing::info;

use super::PagePermissions;
use crate::error::{CmsError, CmsResult, ValidationError};
use crate::invalidation::{self, InvalidationTarget, Invalidations};
use crate::models::{
	GlobalPagePermission, GrantOn, Group, GroupId, PageId, PagePermission, PermissionFlags,
	PermissionId, Principal, User, UserId,
};
use crate::store::Tables;

fn ensure_principal(tx: &Tables, principal: &Principal) -> CmsResult<()> {
	match principal {
		Principal::User(id) if !tx.users.contains_key(id) => Err(CmsError::not_found("user", id)),
		Principal::Group(id) if !tx.groups.contains_key(id) => Err(CmsError::not_found("group", id)),
		_ => Ok(()),
	}
}

/// Menus are filtered by view permission, so every site's menu goes stale
fn invalidate_menus(tx: &Tables, inv: &mut Invalidations) {
	let sites: BTreeSet<SiteId> = tx.nodes.iter().map(|node| node.site).collect();
	for site in sites {
		inv.push(InvalidationTarget::MenuCache(site));
	}
}

/// Queue the permission caches a row for `principal` can affect
fn invalidate_principal(tx: &Tables, principal: &Principal, inv: &mut Invalidations) {
	invalidate_menus(tx, inv);
	match principal {
		Principal::User(id) => {
			if let Some(user) = tx.users.get(id) {
				inv.user(user.username.clone());
			}
		}
		Principal::Group(id) => {
			for user in tx.users.values().filter(|user| user.groups.contains(id)) {
				inv.user(user.username.clone());
			}
		}
		Principal::Everybody => inv.push(InvalidationTarget::AllPermissions),
	}
}

impl<C: Cache> PagePermissions<C> {
	pub async fn get_user(&self, id: UserId) -> CmsResult<User> {
		self.store
			.read()
			.await
			.users
			.get(&id)
			.cloned()
			.ok_or_else(|| CmsError::not_found("user", id))
	}

	/// Store or replace a user row
	pub async fn add_user(&self, user: User) -> CmsResult<User> {
		if !user.is_authenticated() {
			return Err(ValidationError::InvalidPrincipal("the anonymous user cannot be stored".into()).into());
		}
		invalidation::commit(&self.store, self.hook.as_ref(), move |tx, inv| {
			inv.user(user.username.clone());
			invalidate_menus(tx, inv);
			tx.users.insert(user.id, user.clone());
			Ok(user)
		})
		.await
	}

	pub async fn add_group<I, S>(&self, name: &str, permissions: I) -> CmsResult<Group>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let permissions = permissions.into_iter().map(Into::into).collect();
		invalidation::commit(&self.store, self.hook.as_ref(), |tx, _| {
			let group = Group {
				permissions,
				..Group::new(tx.next_id(), name)
			};
			tx.groups.insert(group.id, group.clone());
			Ok(group)
		})
		.await
	}

	pub async fn add_user_to_group(&self, user: UserId, group: GroupId) -> CmsResult<()> {
		invalidation::commit(&self.store, self.hook.as_ref(), |tx, inv| {
			if !tx.groups.contains_key(&group) {
				return Err(CmsError::not_found("group", group));
			}
			let row = tx.users.get_mut(&user).ok_or_else(|| CmsError::not_found("user", user))?;
			row.groups.insert(group);
			inv.user(row.username.clone());
			invalidate_menus(tx, inv);
			Ok(())
		})
		.await
	}

	pub async fn remove_user_from_group(&self, user: UserId, group: GroupId) -> CmsResult<()> {
		invalidation::commit(&self.store, self.hook.as_ref(), |tx, inv| {
			let row = tx.users.get_mut(&user).ok_or_else(|| CmsError::not_found("user", user))?;
			if row.groups.remove(&group) {
				inv.user(row.username.clone());
				invalidate_menus(tx, inv);
			}
			Ok(())
		})
		.await
	}

	/// Grant `flags` on `page` and the pages selected by `grant_on`
	pub async fn grant_page_permission(
		&self,
		page: PageId,
		principal: Principal,
		grant_on: GrantOn,
		flags: PermissionFlags,
	) -> CmsResult<PagePermission> {
		let permission = invalidation::commit(&self.store, self.hook.as_ref(), |tx, inv| {
			tx.page(page)?;
			ensure_principal(tx, &principal)?;
			let permission = PagePermission {
				id: tx.next_id(),
				page,
				principal,
				grant_on,
				flags,
			};
			tx.page_permissions.insert(permission.id, permission.clone());
			invalidate_principal(tx, &principal, inv);
			Ok(permission)
		})
		.await?;
		info!(page, %principal, grant_on = grant_on.bits(), "page permission granted");
		Ok(permission)
	}

	pub async fn revoke_page_permission(&self, id: PermissionId) -> CmsResult<PagePermission> {
		invalidation::commit(&self.store, self.hook.as_ref(), |tx, inv| {
			let removed = tx
				.page_permissions
				.remove(&id)
				.ok_or_else(|| CmsError::not_found("page permission", id))?;
			invalidate_principal(tx, &removed.principal, inv);
			Ok(removed)
		})
		.await
	}

	/// Grant `flags` on every page of `sites`, or of all sites when empty
	pub async fn grant_global_permission<I>(
		&self,
		principal: Principal,
		flags: PermissionFlags,
		sites: I,
	) -> CmsResult<GlobalPagePermission>
	where
		I: IntoIterator<Item = SiteId>,
	{
		if principal == Principal::Everybody {
			return Err(ValidationError::InvalidPrincipal(
				"global permissions need a user or a group".into(),
			)
			.into());
		}
		let sites = sites.into_iter().collect();
		let grant = invalidation::commit(&self.store, self.hook.as_ref(), |tx, inv| {
			ensure_principal(tx, &principal)?;
			let grant = GlobalPagePermission {
				id: tx.next_id(),
				principal,
				flags,
				sites,
			};
			tx.global_permissions.insert(grant.id, grant.clone());
			invalidate_principal(tx, &principal, inv);
			Ok(grant)
		})
		.await?;
		info!(%principal, "global page permission granted");
		Ok(grant)
	}

	pub async fn revoke_global_permission(&self, id: PermissionId) -> CmsResult<GlobalPagePermission> {
		invalidation::commit(&self.store, self.hook.as_ref(), |tx, inv| {
			let removed = tx
				.global_permissions
				.remove(&id)
				.ok_or_else(|| CmsError::not_found("global permission", id))?;
			invalidate_principal(tx, &removed.principal, inv);
			Ok(removed)
		})
		.await
	}
}
