//! Read-only lookups

use pagetree_conf::CmsSettings;
use pagetree_tree::{SiteId, TreeNode};

use super::PageManager;
use super::urls::language_chain;
use crate::error::{CmsError, CmsResult};
use crate::models::{Page, PageContentOrEmpty, PageId};
use crate::store::Tables;

/// Template of `page` in `language`, resolving `INHERIT` through ancestors
///
/// The nearest ancestor with a concrete template in the same language wins;
/// the configured default applies when there is none.
pub(crate) fn resolve_template(
	tx: &Tables,
	settings: &CmsSettings,
	page: PageId,
	language: &str,
) -> CmsResult<String> {
	let node = tx.page(page)?.node;
	let mut lineage: Vec<PageId> = tx
		.nodes
		.get_ancestors(node)?
		.into_iter()
		.filter_map(|node| tx.page_by_node(node.id))
		.map(|page| page.id)
		.collect();
	lineage.push(page);
	Ok(lineage
		.into_iter()
		.rev()
		.filter_map(|id| tx.content_for(id, language))
		.find(|content| !content.inherits_template())
		.map(|content| content.template.clone())
		.unwrap_or_else(|| settings.default_template().to_string()))
}

fn pages_of_nodes<'a>(tx: &Tables, nodes: impl IntoIterator<Item = &'a TreeNode>) -> Vec<Page> {
	nodes
		.into_iter()
		.filter_map(|node| tx.page_by_node(node.id))
		.cloned()
		.collect()
}

impl PageManager {
	pub async fn get_page(&self, page: PageId) -> CmsResult<Page> {
		Ok(self.store().read().await.page(page)?.clone())
	}

	pub async fn get_page_by_reverse_id(&self, site: SiteId, reverse_id: &str) -> CmsResult<Page> {
		self.store()
			.read()
			.await
			.page_by_reverse_id(site, reverse_id)
			.cloned()
			.ok_or_else(|| CmsError::not_found("page", format!("reverse_id={reverse_id}")))
	}

	pub async fn get_home_page(&self, site: SiteId) -> Option<Page> {
		self.store().read().await.home_page(site).cloned()
	}

	/// Content of `page` in `language`, or in a fallback when asked
	pub async fn get_content(&self, page: PageId, language: &str, fallback: bool) -> CmsResult<PageContentOrEmpty> {
		let tx = self.store().read().await;
		let chain = if fallback {
			language_chain(self.settings(), tx.site_of(page)?, language)
		} else {
			vec![language.to_string()]
		};
		Ok(chain
			.iter()
			.find_map(|code| tx.content_for(page, code))
			.cloned()
			.map_or_else(
				|| PageContentOrEmpty::Empty {
					page,
					language: language.to_string(),
				},
				PageContentOrEmpty::Present,
			))
	}

	pub async fn get_template(&self, page: PageId, language: &str) -> CmsResult<String> {
		let tx = self.store().read().await;
		resolve_template(&tx, self.settings(), page, language)
	}

	pub async fn get_parent_page(&self, page: PageId) -> CmsResult<Option<Page>> {
		Ok(self.store().read().await.parent_page(page)?.cloned())
	}

	pub async fn get_children(&self, page: PageId) -> CmsResult<Vec<Page>> {
		let tx = self.store().read().await;
		let node = tx.page(page)?.node;
		Ok(pages_of_nodes(&tx, tx.nodes.get_children(node)?))
	}

	/// Descendants in tree order
	pub async fn get_descendants(&self, page: PageId) -> CmsResult<Vec<Page>> {
		let tx = self.store().read().await;
		let node = tx.page(page)?.node;
		Ok(pages_of_nodes(&tx, tx.nodes.get_descendants(node)?))
	}

	/// Ancestors from the root down
	pub async fn get_ancestors(&self, page: PageId) -> CmsResult<Vec<Page>> {
		let tx = self.store().read().await;
		let node = tx.page(page)?.node;
		Ok(pages_of_nodes(&tx, tx.nodes.get_ancestors(node)?))
	}

	/// Every page of `site` in tree order
	pub async fn get_site_pages(&self, site: SiteId) -> Vec<Page> {
		self.store()
			.read()
			.await
			.site_pages(site)
			.into_iter()
			.cloned()
			.collect()
	}
}
