use tracing::info;

use super::PageManager;
use super::urls::refresh_subtree;
use crate::error::CmsResult;
use crate::invalidation::InvalidationTarget;
use crate::models::{Page, PageId};
use crate::store::Tables;

/// Pages whose URLs changed when the homepage moved
#[derive(Debug, Clone, Default)]
pub struct HomepageChange {
	/// The new homepage and its descendants, tree order
	pub new_home_tree: Vec<Page>,
	/// The former homepage and its descendants, empty when there was none
	pub old_home_tree: Vec<Page>,
}

impl HomepageChange {
	/// Whether an apphook sits in either affected subtree
	pub fn requires_apphook_reload(&self) -> bool {
		self.new_home_tree
			.iter()
			.chain(&self.old_home_tree)
			.any(Page::has_apphook)
	}

	pub fn is_empty(&self) -> bool {
		self.new_home_tree.is_empty() && self.old_home_tree.is_empty()
	}
}

fn subtree_pages(tx: &Tables, page: PageId) -> CmsResult<Vec<Page>> {
	let node = tx.page(page)?.node;
	Ok(tx
		.nodes
		.get_subtree(node)?
		.into_iter()
		.filter_map(|node| tx.page_by_node(node.id))
		.cloned()
		.collect())
}

impl PageManager {
	/// Make `page` the homepage of its site
	///
	/// The former homepage is demoted first and its subtree regains the slug
	/// prefix; the new homepage's subtree then loses its own prefix. Setting
	/// the current homepage again changes nothing.
	pub async fn set_as_homepage(&self, page: PageId, user: &str) -> CmsResult<HomepageChange> {
		self.commit(|tx, invalidations| {
			if tx.page(page)?.is_home {
				return Ok(HomepageChange::default());
			}
			let site = tx.site_of(page)?;
			let old_home = tx.home_page(site).map(|home| home.id);

			if let Some(old_home) = old_home {
				let row = tx.page_mut(old_home)?;
				row.is_home = false;
				row.touch(user);
				refresh_subtree(tx, &self.settings, old_home)?;
			}
			let row = tx.page_mut(page)?;
			row.is_home = true;
			row.touch(user);
			refresh_subtree(tx, &self.settings, page)?;

			let change = HomepageChange {
				new_home_tree: subtree_pages(tx, page)?,
				old_home_tree: match old_home {
					Some(old_home) => subtree_pages(tx, old_home)?,
					None => Vec::new(),
				},
			};

			invalidations.site(site);
			if change.requires_apphook_reload() {
				invalidations.push(InvalidationTarget::ApphookReload);
			}
			info!(
				page_id = page,
				site,
				new_tree = change.new_home_tree.len(),
				old_tree = change.old_home_tree.len(),
				"set homepage"
			);
			Ok(change)
		})
		.await
	}
}
