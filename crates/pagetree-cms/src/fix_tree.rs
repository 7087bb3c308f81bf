//! Whole-store repair

use pagetree_tree::{RepairReport, SiteId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use crate::error::CmsResult;
use crate::invalidation::InvalidationTarget;
use crate::models::PageId;
use crate::pages::{PageManager, refresh_subtree};
use crate::store::Tables;

/// What [`PageManager::fix_tree`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixTreeReport {
	pub tree: RepairReport,
	pub urls_rewritten: usize,
	/// Pages that lost the home flag to a lower id on the same site
	pub demoted_homes: Vec<PageId>,
	/// Pages whose language list did not match their translations
	pub languages_fixed: Vec<PageId>,
}

impl FixTreeReport {
	pub fn is_clean(&self) -> bool {
		self.tree.problems.is_empty()
			&& self.urls_rewritten == 0
			&& self.demoted_homes.is_empty()
			&& self.languages_fixed.is_empty()
	}
}

fn demote_duplicate_homes(tx: &mut Tables) -> CmsResult<Vec<PageId>> {
	let mut homes: BTreeMap<SiteId, Vec<PageId>> = BTreeMap::new();
	for page in tx.pages().filter(|page| page.is_home) {
		let site = tx.nodes.get(page.node)?.site;
		homes.entry(site).or_default().push(page.id);
	}
	let mut demoted = Vec::new();
	for (site, mut pages) in homes {
		pages.sort_unstable();
		for page in pages.into_iter().skip(1) {
			warn!(site, page, "demoting duplicate homepage");
			tx.page_mut(page)?.is_home = false;
			demoted.push(page);
		}
	}
	Ok(demoted)
}

fn sync_languages(tx: &mut Tables) -> CmsResult<Vec<PageId>> {
	let mismatched: Vec<(PageId, Vec<String>)> = tx
		.pages()
		.filter_map(|page| {
			let mut languages: Vec<String> = page
				.get_languages()
				.into_iter()
				.filter(|code| tx.content_for(page.id, code).is_some())
				.collect();
			for content in tx.contents_of(page.id) {
				if !languages.contains(&content.language) {
					languages.push(content.language.clone());
				}
			}
			(languages != page.get_languages()).then_some((page.id, languages))
		})
		.collect();
	let mut fixed = Vec::with_capacity(mismatched.len());
	for (page, languages) in mismatched {
		tx.page_mut(page)?.update_languages(&languages);
		fixed.push(page);
	}
	Ok(fixed)
}

impl PageManager {
	/// Rebuild tree paths and counters, then every managed URL from the roots
	///
	/// Also demotes extra homepages and resyncs each page's language list
	/// with its translations.
	pub async fn fix_tree(&self) -> CmsResult<FixTreeReport> {
		let settings = self.settings();
		let report = self
			.commit(|tx, inv| {
				let tree = tx.nodes.fix_tree()?;
				let demoted_homes = demote_duplicate_homes(tx)?;
				let languages_fixed = sync_languages(tx)?;

				let roots: Vec<PageId> = tx
					.nodes
					.get_root_nodes(None)
					.into_iter()
					.filter_map(|node| tx.page_by_node(node.id))
					.map(|page| page.id)
					.collect();
				let mut urls_rewritten = 0;
				for root in roots {
					urls_rewritten += refresh_subtree(tx, settings, root)?;
				}

				let sites: BTreeSet<SiteId> = tx.nodes.iter().map(|node| node.site).collect();
				for site in sites {
					inv.site(site);
				}
				inv.push(InvalidationTarget::AllPermissions);
				Ok(FixTreeReport {
					tree,
					urls_rewritten,
					demoted_homes,
					languages_fixed,
				})
			})
			.await?;
		info!(
			problems = report.tree.problems.len(),
			nodes = report.tree.nodes_rewritten,
			urls = report.urls_rewritten,
			"tree repaired"
		);
		Ok(report)
	}
}
