use tracing::info;

use super::PageManager;
use crate::error::CmsResult;
use crate::invalidation::InvalidationTarget;
use crate::models::PageId;

impl PageManager {
	/// Delete a page with its whole subtree
	///
	/// Returns the ids of every removed page in tree order.
	pub async fn delete(&self, page: PageId) -> CmsResult<Vec<PageId>> {
		self.commit(|tx, invalidations| {
			let node = tx.node_of(page)?.clone();
			let removed_nodes = tx.nodes.delete_fast(node.id)?;

			let mut removed = Vec::with_capacity(removed_nodes.len());
			let mut had_permissions = false;
			for node_id in removed_nodes {
				let Some(page_id) = tx.page_by_node(node_id).map(|page| page.id) else {
					continue;
				};
				had_permissions |= tx.page_permissions.values().any(|perm| perm.page == page_id);
				if let Some(row) = tx.remove_page_rows(page_id) {
					if row.has_apphook() {
						invalidations.push(InvalidationTarget::ApphookReload);
					}
					removed.push(page_id);
				}
			}

			invalidations.site(node.site);
			if had_permissions {
				invalidations.push(InvalidationTarget::AllPermissions);
			}
			info!(page_id = page, site = node.site, removed = removed.len(), "deleted page tree");
			Ok(removed)
		})
		.await
	}
}
