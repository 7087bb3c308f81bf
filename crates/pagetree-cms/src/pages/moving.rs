use pagetree_tree::{NodeId, Position};
use tracing::info;

use super::PageManager;
use super::query::resolve_template;
use super::urls::refresh_subtree;
use crate::error::CmsResult;
use crate::invalidation::InvalidationTarget;
use crate::models::{Page, PageId};

impl PageManager {
	/// Move `page` with its subtree to `position` relative to `target_node`
	///
	/// Every managed URL of the subtree is recomputed in the same
	/// transaction. Moving onto itself or below itself fails with
	/// [`CmsError::InvalidMove`](crate::error::CmsError::InvalidMove) and
	/// changes nothing.
	pub async fn move_page(
		&self,
		page: PageId,
		target_node: NodeId,
		position: Position,
		user: &str,
	) -> CmsResult<Page> {
		self.commit(|tx, invalidations| {
			let node = tx.node_of(page)?.clone();
			let target = tx.nodes.get(target_node)?.clone();

			// templates inherited from the old ancestors are pinned before the
			// page becomes a root
			if !position.is_child() && target.is_root() {
				let inherited: Vec<String> = tx
					.contents_of(page)
					.filter(|content| content.inherits_template())
					.map(|content| content.language.clone())
					.collect();
				for language in inherited {
					let template = resolve_template(tx, &self.settings, page, &language)?;
					if let Some(content) = tx.content_for_mut(page, &language) {
						content.template = template;
					}
				}
			}

			let moved = tx.nodes.move_node(node.id, target_node, position)?;
			let rewritten = refresh_subtree(tx, &self.settings, page)?;
			let row = tx.page_mut(page)?;
			row.touch(user);
			row.clear_url_cache();
			let row = row.clone();

			invalidations.site(node.site);
			invalidations.site(moved.site);
			// cached permission tuples hold node paths
			invalidations.push(InvalidationTarget::AllPermissions);
			info!(
				page_id = page,
				site = moved.site,
				old_path = %node.path,
				new_path = %moved.path,
				position = %position,
				rewritten,
				"moved page"
			);
			Ok(row)
		})
		.await
	}
}
