//! URL path computation and cascading

use pagetree_conf::CmsSettings;
use pagetree_tree::{Forest, NodeId, SiteId};

use super::PageManager;
use crate::error::{CmsError, CmsResult, ValidationError};
use crate::models::{Page, PageId, PageUrl};
use crate::slugs::{join_path, next_copy_slug};
use crate::store::Tables;

/// `language` followed by its configured fallbacks on `site`
pub(crate) fn language_chain(settings: &CmsSettings, site: SiteId, language: &str) -> Vec<String> {
	let mut chain = vec![language.to_string()];
	chain.extend(settings.fallback_languages(site, language));
	chain
}

/// First URL row of `page` along the language chain
pub(crate) fn resolve_url<'a>(tx: &'a Tables, page: PageId, chain: &[String]) -> Option<&'a PageUrl> {
	chain.iter().find_map(|code| tx.url_for(page, code))
}

/// Path `page` should have in `language`, from its parent's current path
///
/// `None` when the page has no URL row in that language.
pub(crate) fn compute_url_path(
	tx: &Tables,
	settings: &CmsSettings,
	page: PageId,
	language: &str,
) -> CmsResult<Option<String>> {
	let Some(url) = tx.url_for(page, language) else {
		return Ok(None);
	};
	if tx.page(page)?.is_home {
		return Ok(Some(String::new()));
	}
	let base = match tx.parent_page(page)? {
		Some(parent) => {
			let chain = language_chain(settings, tx.site_of(page)?, language);
			resolve_url(tx, parent.id, &chain).and_then(|url| url.path.clone())
		}
		None => None,
	};
	Ok(Some(join_path(base.as_deref(), &url.slug)))
}

/// Recompute one managed URL row; returns whether the path changed
pub(crate) fn update_url_path(
	tx: &mut Tables,
	settings: &CmsSettings,
	page: PageId,
	language: &str,
) -> CmsResult<bool> {
	if tx.url_for(page, language).is_none_or(|url| !url.managed) {
		return Ok(false);
	}
	let path = compute_url_path(tx, settings, page, language)?;
	let url = tx
		.url_for_mut(page, language)
		.ok_or_else(|| CmsError::not_found("url", format!("{page}/{language}")))?;
	if url.path == path {
		return Ok(false);
	}
	url.path = path;
	Ok(true)
}

/// Recompute `language` paths below `page`
///
/// Walks parent before child and does not descend below pages lacking the
/// language. Returns the number of rewritten rows.
pub(crate) fn update_url_path_recursive(
	tx: &mut Tables,
	settings: &CmsSettings,
	page: PageId,
	language: &str,
) -> CmsResult<usize> {
	let node = tx.node_of(page)?.clone();
	if node.is_leaf() || !tx.page(page)?.has_language(language) {
		return Ok(0);
	}
	let forest = Forest::build(tx.nodes.get_subtree(node.id)?);
	let mut rewritten = 0;
	let mut stack: Vec<NodeId> = child_nodes(&forest, node.id);
	while let Some(node_id) = stack.pop() {
		let Some(child) = tx.page_by_node(node_id).map(|page| page.id) else {
			continue;
		};
		if update_url_path(tx, settings, child, language)? {
			rewritten += 1;
		}
		if tx.page(child)?.has_language(language) {
			stack.extend(child_nodes(&forest, node_id));
		}
	}
	Ok(rewritten)
}

/// Children of `node` reversed, ready to be pushed on a pre-order stack
fn child_nodes(forest: &Forest, node: NodeId) -> Vec<NodeId> {
	forest
		.children(node)
		.iter()
		.rev()
		.map(|entry| entry.node.id)
		.collect()
}

/// Recompute every managed row of `page` and its whole subtree
///
/// Used after structural changes, where any language below may depend on the
/// moved paths through fallbacks.
pub(crate) fn refresh_subtree(tx: &mut Tables, settings: &CmsSettings, page: PageId) -> CmsResult<usize> {
	let node = tx.page(page)?.node;
	let order: Vec<PageId> = tx
		.nodes
		.get_subtree(node)?
		.into_iter()
		.filter_map(|node| tx.page_by_node(node.id))
		.map(|page| page.id)
		.collect();
	let mut rewritten = 0;
	for page in order {
		let languages: Vec<String> = tx.urls_of(page).map(|url| url.language.clone()).collect();
		for language in languages {
			if update_url_path(tx, settings, page, &language)? {
				rewritten += 1;
			}
		}
	}
	Ok(rewritten)
}

/// `/{language}/{path}/`, or `/{language}/` for the homepage
pub(crate) fn absolute_url(language: &str, path: &str) -> String {
	if path.is_empty() {
		format!("/{language}/")
	} else {
		format!("/{language}/{path}/")
	}
}

/// Fail when another page of `site` already serves `path`
pub(crate) fn ensure_path_free(
	tx: &Tables,
	settings: &CmsSettings,
	page: PageId,
	language: &str,
) -> CmsResult<()> {
	let Some(path) = tx.url_for(page, language).and_then(|url| url.path.clone()) else {
		return Ok(());
	};
	let site = tx.site_of(page)?;
	match tx.find_url_conflict(site, language, &path, &[page]) {
		Some(conflicting_page) => Err(ValidationError::PathCollision {
			site,
			language: language.to_string(),
			path,
			conflicting_page,
			edit_url: settings.edit_url(conflicting_page),
		}
		.into()),
		None => Ok(()),
	}
}

/// Free slug for `path`, appending `-copy`, `-copy-2`, ... while taken
///
/// Only the last segment of `path` changes; `exclude` lists pages whose rows
/// do not count as conflicts.
pub fn get_available_slug(
	tx: &Tables,
	site: SiteId,
	path: &str,
	language: &str,
	exclude: &[PageId],
) -> String {
	let (base, mut slug) = match path.rsplit_once('/') {
		Some((base, slug)) => (base, slug.to_string()),
		None => ("", path.to_string()),
	};
	let mut candidate = path.to_string();
	while tx
		.find_url_conflict(site, language, &candidate, exclude)
		.is_some()
	{
		slug = next_copy_slug(&slug);
		candidate = join_path(Some(base), &slug);
	}
	slug
}

impl PageManager {
	/// Path of `page` in `language`, following fallbacks when asked
	///
	/// Results are cached on the page value for the rest of its lifetime.
	pub async fn get_path(&self, page: &Page, language: &str, fallback: bool) -> CmsResult<Option<String>> {
		Ok(self
			.lookup_url(page, language, fallback)
			.await?
			.and_then(|url| url.path))
	}

	pub async fn get_slug(&self, page: &Page, language: &str, fallback: bool) -> CmsResult<Option<String>> {
		Ok(self
			.lookup_url(page, language, fallback)
			.await?
			.map(|url| url.slug))
	}

	/// Public URL of `page`, `/{language}/{path}/`
	pub async fn get_absolute_url(&self, page: &Page, language: &str) -> CmsResult<Option<String>> {
		Ok(self
			.get_path(page, language, true)
			.await?
			.map(|path| absolute_url(language, &path)))
	}

	async fn lookup_url(&self, page: &Page, language: &str, fallback: bool) -> CmsResult<Option<PageUrl>> {
		if let Some(url) = page.cached_url(language) {
			return Ok(Some(url));
		}
		let tx = self.store().read().await;
		let chain = if fallback {
			language_chain(self.settings(), tx.site_of(page.id)?, language)
		} else {
			vec![language.to_string()]
		};
		for code in &chain {
			if let Some(url) = page.cached_url(code) {
				return Ok(Some(url));
			}
			if let Some(url) = tx.url_for(page.id, code) {
				page.cache_url(url.clone());
				return Ok(Some(url.clone()));
			}
		}
		Ok(None)
	}

	/// Recompute the path of one page in one language
	pub async fn update_url_path(&self, page: PageId, language: &str) -> CmsResult<bool> {
		let settings = self.settings.clone();
		self.commit(|tx, invalidations| {
			let changed = update_url_path(tx, &settings, page, language)?;
			if changed {
				invalidations.site(tx.site_of(page)?);
			}
			Ok(changed)
		})
		.await
	}

	/// Recompute `language` paths of every descendant of `page`
	pub async fn update_url_path_recursive(&self, page: PageId, language: &str) -> CmsResult<usize> {
		let settings = self.settings.clone();
		self.commit(|tx, invalidations| {
			let rewritten = update_url_path_recursive(tx, &settings, page, language)?;
			if rewritten > 0 {
				invalidations.site(tx.site_of(page)?);
			}
			Ok(rewritten)
		})
		.await
	}

	/// Free slug for `path` on `site`
	pub async fn get_available_slug(&self, site: SiteId, path: &str, language: &str) -> String {
		let tx = self.store().read().await;
		get_available_slug(&tx, site, path, language, &[])
	}
}
