//! Page extensions copied along with their page

use std::collections::HashMap;
use tracing::debug;

use crate::error::CmsResult;
use crate::models::PageId;
use crate::store::Tables;

/// Extra per-page data maintained outside the core tables
///
/// Extensions keep their rows in [`Tables::extension_data`] under their own
/// name, or in any other table they own.
pub trait PageExtension: Send + Sync {
	/// Unique name, also the key of the extension's rows
	fn name(&self) -> &str;

	/// Copy the data of `source` onto the freshly created `target`
	///
	/// `languages` lists the translations that were copied.
	fn copy(
		&self,
		tables: &mut Tables,
		source: PageId,
		target: PageId,
		languages: &[String],
	) -> CmsResult<()>;
}

/// Extension that stores one JSON value per page
///
/// # Examples
///
/// ```
/// use pagetree_cms::extensions::{JsonExtension, PageExtension};
/// use pagetree_cms::store::Tables;
///
/// let seo = JsonExtension::new("seo");
/// let mut tables = Tables::default();
/// seo.set(&mut tables, 1, serde_json::json!({"noindex": true}));
/// seo.copy(&mut tables, 1, 2, &["en".to_string()]).unwrap();
/// assert_eq!(seo.get(&tables, 2), seo.get(&tables, 1));
/// ```
pub struct JsonExtension {
	name: String,
}

impl JsonExtension {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	pub fn get<'a>(&self, tables: &'a Tables, page: PageId) -> Option<&'a serde_json::Value> {
		tables.extension_data.get(&(page, self.name.clone()))
	}

	pub fn set(&self, tables: &mut Tables, page: PageId, value: serde_json::Value) {
		tables.extension_data.insert((page, self.name.clone()), value);
	}
}

impl PageExtension for JsonExtension {
	fn name(&self) -> &str {
		&self.name
	}

	fn copy(
		&self,
		tables: &mut Tables,
		source: PageId,
		target: PageId,
		_languages: &[String],
	) -> CmsResult<()> {
		if let Some(value) = self.get(tables, source).cloned() {
			self.set(tables, target, value);
		}
		Ok(())
	}
}

/// Registry of page extensions
#[derive(Default)]
pub struct ExtensionPool {
	extensions: Vec<Box<dyn PageExtension>>,
	index: HashMap<String, usize>,
}

impl ExtensionPool {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register an extension, replacing one with the same name
	pub fn register(&mut self, extension: Box<dyn PageExtension>) {
		let name = extension.name().to_string();
		match self.index.get(&name) {
			Some(&slot) => self.extensions[slot] = extension,
			None => {
				self.index.insert(name, self.extensions.len());
				self.extensions.push(extension);
			}
		}
	}

	pub fn get(&self, name: &str) -> Option<&dyn PageExtension> {
		self.index
			.get(name)
			.map(|slot| self.extensions[*slot].as_ref())
	}

	pub fn names(&self) -> Vec<&str> {
		self.extensions.iter().map(|ext| ext.name()).collect()
	}

	pub fn len(&self) -> usize {
		self.extensions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.extensions.is_empty()
	}

	/// Run every registered extension's copy hook
	pub fn copy_extensions(
		&self,
		tables: &mut Tables,
		source: PageId,
		target: PageId,
		languages: &[String],
	) -> CmsResult<()> {
		for extension in &self.extensions {
			extension.copy(tables, source, target, languages)?;
			debug!(extension = extension.name(), source, target, "copied page extension");
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_register_replaces_same_name() {
		let mut pool = ExtensionPool::new();
		pool.register(Box::new(JsonExtension::new("seo")));
		pool.register(Box::new(JsonExtension::new("social")));
		pool.register(Box::new(JsonExtension::new("seo")));

		assert_eq!(pool.len(), 2);
		assert_eq!(pool.names(), vec!["seo", "social"]);
		assert!(pool.get("social").is_some());
		assert!(pool.get("missing").is_none());
	}
}
