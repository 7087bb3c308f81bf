//! Page copies, single and with descendants

use chrono::Utc;
use pagetree_conf::CmsSettings;
use pagetree_tree::{NodeId, Position, SiteId};
use std::collections::HashMap;
use tracing::{debug, info};

use super::urls::{get_available_slug, update_url_path};
use super::{PageManager, SCRIPT_USERNAME};
use crate::error::{CmsError, CmsResult, ValidationError};
use crate::extensions::ExtensionPool;
use crate::invalidation::{InvalidationTarget, Invalidations};
use crate::models::{ContentId, Page, PageId, PageUrl, PluginId};
use crate::store::Tables;

/// Options of [`PageManager::copy`]
#[derive(Debug, Clone)]
pub struct CopyOptions {
	/// Site of a copy placed at root level; the source site when unset
	pub site: Option<SiteId>,
	/// Node the copy becomes the last child of; root level when unset
	pub parent_node: Option<NodeId>,
	/// Copy only this translation
	pub language: Option<String>,
	/// Copy every translation; only the first one otherwise
	pub translations: bool,
	pub permissions: bool,
	pub extensions: bool,
	pub user: String,
}

impl Default for CopyOptions {
	fn default() -> Self {
		Self {
			site: None,
			parent_node: None,
			language: None,
			translations: true,
			permissions: false,
			extensions: true,
			user: SCRIPT_USERNAME.to_string(),
		}
	}
}

/// Where a copy lands in the tree
#[derive(Debug, Clone, Copy)]
enum Placement {
	Root(SiteId),
	Under(NodeId),
	At(NodeId, Position),
}

struct CopyJob<'a> {
	settings: &'a CmsSettings,
	extensions: &'a ExtensionPool,
	languages: Option<Vec<String>>,
	permissions: bool,
	run_extensions: bool,
	user: &'a str,
}

impl CopyJob<'_> {
	/// Copy one page row with its translations, plugins and permissions
	fn copy_page(
		&self,
		tx: &mut Tables,
		source: PageId,
		placement: Placement,
		invalidations: &mut Invalidations,
	) -> CmsResult<Page> {
		let original = tx.page(source)?.clone();
		let languages: Vec<String> = match &self.languages {
			Some(languages) => languages
				.iter()
				.filter(|code| original.has_language(code))
				.cloned()
				.collect(),
			None => original.get_languages(),
		};

		let node = match placement {
			Placement::Root(site) => tx.nodes.add_root(site)?,
			Placement::Under(parent) => tx.nodes.add_child(parent)?,
			Placement::At(target, position) => {
				// cached permissions hold node paths
				if tx.nodes.insert_shifts(target, position)? {
					invalidations.push(InvalidationTarget::AllPermissions);
				}
				tx.nodes.insert_at(target, position)?
			}
		};
		let id = tx.next_id();
		let now = Utc::now();
		let mut page = original.clone();
		page.id = id;
		page.node = node.id;
		page.is_home = false;
		page.reverse_id = None;
		page.created_by = self.user.to_string();
		page.changed_by = self.user.to_string();
		page.creation_date = now;
		page.changed_date = now;
		page.update_languages(&languages);
		let has_apphook = page.has_apphook();
		tx.insert_page(page);

		for language in &languages {
			self.copy_url(tx, source, id, node.site, language)?;
			self.copy_content(tx, source, id, language)?;
		}
		if self.permissions {
			let rows: Vec<_> = tx
				.page_permissions
				.values()
				.filter(|perm| perm.page == source)
				.cloned()
				.collect();
			if !rows.is_empty() {
				invalidations.push(InvalidationTarget::AllPermissions);
			}
			for mut row in rows {
				row.id = tx.next_id();
				row.page = id;
				tx.page_permissions.insert(row.id, row);
			}
		}
		if self.run_extensions {
			self.extensions.copy_extensions(tx, source, id, &languages)?;
		}

		invalidations.site(node.site);
		if has_apphook {
			invalidations.push(InvalidationTarget::ApphookReload);
		}
		debug!(source, copy = id, path = %node.path, "copied page");
		Ok(tx.page(id)?.clone())
	}

	/// Copy the url row, renaming the slug while its path is taken
	///
	/// Overwrite URLs are not carried over; the copy gets a managed path.
	fn copy_url(&self, tx: &mut Tables, source: PageId, target: PageId, site: SiteId, language: &str) -> CmsResult<()> {
		let Some(original) = tx.url_for(source, language).cloned() else {
			return Ok(());
		};
		let url_id = tx.next_id();
		tx.urls.insert(
			url_id,
			PageUrl::managed(url_id, target, language, original.slug, None),
		);
		update_url_path(tx, self.settings, target, language)?;
		let path = tx
			.url_for(target, language)
			.and_then(|url| url.path.clone())
			.unwrap_or_default();
		let slug = get_available_slug(tx, site, &path, language, &[target]);
		let url = tx
			.url_for_mut(target, language)
			.ok_or_else(|| CmsError::not_found("url", format!("{target}/{language}")))?;
		if url.slug != slug {
			url.slug = slug;
			update_url_path(tx, self.settings, target, language)?;
		}
		Ok(())
	}

	/// Copy a translation with its placeholders and plugin trees
	fn copy_content(&self, tx: &mut Tables, source: PageId, target: PageId, language: &str) -> CmsResult<()> {
		let Some(original) = tx.content_for(source, language).cloned() else {
			return Ok(());
		};
		let content_id: ContentId = tx.next_id();
		let mut content = original.clone();
		content.id = content_id;
		content.page = target;
		content.created_by = self.user.to_string();
		content.changed_by = self.user.to_string();
		content.creation_date = Utc::now();
		tx.contents.insert(content_id, content);

		let placeholders: Vec<_> = tx.placeholders_of(original.id).cloned().collect();
		for placeholder in placeholders {
			let plugins: Vec<_> = tx.plugins_of(placeholder.id).into_iter().cloned().collect();
			let placeholder_id = tx.next_id();
			let mut copy = placeholder.clone();
			copy.id = placeholder_id;
			copy.content = content_id;
			tx.placeholders.insert(placeholder_id, copy);

			// parents precede children, so every parent is already mapped
			let mut mapped: HashMap<PluginId, PluginId> = HashMap::new();
			for mut plugin in plugins {
				let old_id = plugin.id;
				plugin.id = tx.next_id();
				plugin.placeholder = placeholder_id;
				plugin.parent = match plugin.parent {
					Some(parent) => Some(*mapped.get(&parent).ok_or_else(|| {
						CmsError::Fatal(format!("plugin {old_id} has a parent outside its placeholder"))
					})?),
					None => None,
				};
				mapped.insert(old_id, plugin.id);
				tx.plugins.insert(plugin.id, plugin);
			}
		}
		Ok(())
	}
}

impl PageManager {
	fn copy_job<'a>(
		&'a self,
		languages: Option<Vec<String>>,
		permissions: bool,
		run_extensions: bool,
		user: &'a str,
	) -> CopyJob<'a> {
		CopyJob {
			settings: &self.settings,
			extensions: &self.extensions,
			languages,
			permissions,
			run_extensions,
			user,
		}
	}

	/// Copy one page without its descendants
	///
	/// The copy never inherits the homepage flag or the reverse id. Slugs that
	/// would collide get a `-copy` suffix.
	pub async fn copy(&self, page: PageId, options: CopyOptions) -> CmsResult<Page> {
		self.commit(|tx, invalidations| {
			let original = tx.page(page)?;
			let languages = match (&options.language, options.translations) {
				(Some(language), _) if !original.has_language(language) => {
					return Err(ValidationError::MissingLanguage {
						page,
						language: language.clone(),
					}
					.into());
				}
				(Some(language), _) => vec![language.clone()],
				(None, true) => original.get_languages(),
				(None, false) => original.get_languages().into_iter().take(1).collect(),
			};
			let placement = match options.parent_node {
				Some(parent) => Placement::Under(parent),
				None => Placement::Root(match options.site {
					Some(site) => site,
					None => tx.site_of(page)?,
				}),
			};
			let job = self.copy_job(
				Some(languages),
				options.permissions,
				options.extensions,
				&options.user,
			);
			let copy = job.copy_page(tx, page, placement, invalidations)?;
			info!(source = page, copy = copy.id, "copied page");
			Ok(copy)
		})
		.await
	}

	/// Copy a page and its whole subtree to `position` relative to `target_node`
	///
	/// The descendants are listed before anything is inserted, so pasting a
	/// page into its own subtree copies the original subtree only once.
	pub async fn copy_with_descendants(
		&self,
		page: PageId,
		target_node: Option<NodeId>,
		position: Position,
		copy_permissions: bool,
		target_site: Option<SiteId>,
		user: &str,
	) -> CmsResult<Page> {
		self.commit(|tx, invalidations| {
			let root_node = tx.node_of(page)?.clone();
			let descendants: Vec<(PageId, NodeId, Option<NodeId>)> = tx
				.nodes
				.get_descendants(root_node.id)?
				.into_iter()
				.filter_map(|node| tx.page_by_node(node.id).map(|p| (p.id, node.id, node.parent)))
				.collect();

			let placement = match target_node {
				Some(target) => Placement::At(target, position),
				None => Placement::Root(target_site.unwrap_or(root_node.site)),
			};
			let job = self.copy_job(None, copy_permissions, true, user);
			let root_copy = job.copy_page(tx, page, placement, invalidations)?;

			let mut nodes: HashMap<NodeId, NodeId> = HashMap::new();
			nodes.insert(root_node.id, root_copy.node);
			for (source, node, parent) in descendants {
				let parent = parent
					.and_then(|parent| nodes.get(&parent).copied())
					.ok_or_else(|| CmsError::Fatal(format!("node {node} lost its parent while copying")))?;
				let copy = job.copy_page(tx, source, Placement::Under(parent), invalidations)?;
				nodes.insert(node, copy.node);
			}
			info!(
				source = page,
				copy = root_copy.id,
				pages = nodes.len(),
				"copied page tree"
			);
			Ok(root_copy)
		})
		.await
	}
}
