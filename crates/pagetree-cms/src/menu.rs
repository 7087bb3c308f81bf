//! Navigation menu built from the site forest
//!
//! One read of the store yields the candidate pages in tree order. A page
//! left out of the menu takes its whole subtree with it. Built menus are
//! cached in the site's menu namespace, which every page mutation bumps.

use pagetree_cache::{Cache, VersionedNamespaces};
use pagetree_tree::{Forest, NodeId, SiteId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::CmsResult;
use crate::invalidation::menu_namespace;
use crate::models::{LimitVisibility, PageId, User};
use crate::pages::{PageManager, absolute_url, language_chain, resolve_url};
use crate::permissions::PagePermissions;

/// One entry of the navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
	pub page: PageId,
	pub title: String,
	pub url: String,
	/// Language the title was taken from, after fallbacks
	pub language: String,
	pub soft_root: bool,
	pub children: Vec<MenuNode>,
}

impl MenuNode {
	/// Pre-order iterator over this node and everything below it
	pub fn flatten(&self) -> Vec<&MenuNode> {
		let mut out = vec![self];
		for child in &self.children {
			out.extend(child.flatten());
		}
		out
	}
}

struct Candidate {
	node: NodeId,
	parent: Option<NodeId>,
	page: PageId,
	in_navigation: bool,
	limit: Option<LimitVisibility>,
	entry: MenuNode,
}

/// Menu builder for one CMS instance
pub struct Menu<C> {
	pages: PageManager,
	permissions: PagePermissions<C>,
	namespaces: Arc<VersionedNamespaces<C>>,
	ttl: Duration,
}

impl<C> Clone for Menu<C> {
	fn clone(&self) -> Self {
		Self {
			pages: self.pages.clone(),
			permissions: self.permissions.clone(),
			namespaces: Arc::clone(&self.namespaces),
			ttl: self.ttl,
		}
	}
}

impl<C: Cache> Menu<C> {
	pub fn new(pages: PageManager, permissions: PagePermissions<C>, namespaces: Arc<VersionedNamespaces<C>>) -> Self {
		let ttl = pages.settings().menu_cache_ttl();
		Self {
			pages,
			permissions,
			namespaces,
			ttl,
		}
	}

	/// Navigation tree of `site` in `language` as seen by `user`
	pub async fn menu_nodes(&self, site: SiteId, language: &str, user: &User) -> CmsResult<Vec<MenuNode>> {
		let username = if user.is_authenticated() {
			user.username.as_str()
		} else {
			"anonymous"
		};
		let key = self
			.namespaces
			.builder(&menu_namespace(site))
			.await
			.build(&format!("{language}:{username}"));
		let backend = self.permissions.cache().backend();
		match backend.get::<Vec<MenuNode>>(&key).await {
			Ok(Some(nodes)) => return Ok(nodes),
			Ok(None) => {}
			Err(err) => warn!(key, error = %err, "menu cache read failed, rebuilding"),
		}

		let nodes = self.build(site, language, user).await?;
		if let Err(err) = backend.set(&key, &nodes, Some(self.ttl)).await {
			warn!(key, error = %err, "menu cache write failed");
		}
		Ok(nodes)
	}

	async fn build(&self, site: SiteId, language: &str, user: &User) -> CmsResult<Vec<MenuNode>> {
		let settings = self.pages.settings();
		let chain = if settings.hide_untranslated(site, language) {
			vec![language.to_string()]
		} else {
			language_chain(settings, site, language)
		};

		let (forest, candidates) = {
			let tx = self.pages.store().read().await;
			let forest = tx.nodes.forest(site);
			let candidates: Vec<Candidate> = forest
				.walk()
				.into_iter()
				.filter_map(|entry| {
					let page = tx.page_by_node(entry.node.id)?;
					let content = chain.iter().find_map(|code| tx.content_for(page.id, code))?;
					let path = resolve_url(&tx, page.id, &chain)?.path.clone()?;
					Some(Candidate {
						node: entry.node.id,
						parent: entry.node.parent,
						page: page.id,
						in_navigation: content.in_navigation,
						limit: content.limit_visibility_in_menu,
						entry: MenuNode {
							page: page.id,
							title: content.menu_title_or_title().to_string(),
							url: absolute_url(language, &path),
							language: content.language.clone(),
							soft_root: content.soft_root,
							children: Vec::new(),
						},
					})
				})
				.collect();
			(forest, candidates)
		};

		let present: HashSet<NodeId> = candidates.iter().map(|candidate| candidate.node).collect();
		let mut hidden: HashSet<NodeId> = HashSet::new();
		let mut visible: HashMap<NodeId, MenuNode> = HashMap::new();
		for candidate in candidates {
			let parent_hidden = candidate
				.parent
				.is_some_and(|parent| hidden.contains(&parent) || !present.contains(&parent));
			let shown = !parent_hidden
				&& candidate.in_navigation
				&& candidate
					.limit
					.is_none_or(|limit| limit.allows(user.is_authenticated()))
				&& self
					.permissions
					.user_can_view_page(user, candidate.page)
					.await?;
			if shown {
				visible.insert(candidate.node, candidate.entry);
			} else {
				hidden.insert(candidate.node);
			}
		}
		debug!(site, language, shown = visible.len(), hidden = hidden.len(), "menu built");

		let roots: Vec<NodeId> = forest.roots().map(|entry| entry.node.id).collect();
		Ok(roots
			.into_iter()
			.filter_map(|root| assemble(&forest, root, &mut visible))
			.collect())
	}
}

fn assemble(forest: &Forest, node: NodeId, visible: &mut HashMap<NodeId, MenuNode>) -> Option<MenuNode> {
	let mut entry = visible.remove(&node)?;
	let children: Vec<NodeId> = forest.children(node).iter().map(|child| child.node.id).collect();
	entry.children = children
		.into_iter()
		.filter_map(|child| assemble(forest, child, visible))
		.collect();
	Some(entry)
}
