use chrono::{DateTime, Utc};
use pagetree_conf::TEMPLATE_INHERITANCE_MAGIC;
use serde::{Deserialize, Serialize};

use super::{ContentId, PageId};

/// Who sees a page in menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitVisibility {
	ForAuthenticated,
	ForAnonymous,
}

impl LimitVisibility {
	pub fn allows(self, authenticated: bool) -> bool {
		match self {
			Self::ForAuthenticated => authenticated,
			Self::ForAnonymous => !authenticated,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XFrameOptions {
	#[default]
	Inherit,
	Deny,
	SameOrigin,
	Allow,
}

/// State badge shown next to a translation in the page tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentIndicator {
	Public,
	Empty,
}

/// Per-language content of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
	pub id: ContentId,
	pub page: PageId,
	pub language: String,
	pub title: String,
	/// Template path, or `INHERIT` to use the nearest ancestor's template
	pub template: String,
	pub menu_title: Option<String>,
	pub page_title: Option<String>,
	pub meta_description: Option<String>,
	pub in_navigation: bool,
	pub soft_root: bool,
	pub redirect: Option<String>,
	pub xframe_options: XFrameOptions,
	pub limit_visibility_in_menu: Option<LimitVisibility>,
	pub created_by: String,
	pub changed_by: String,
	pub creation_date: DateTime<Utc>,
}

impl PageContent {
	pub fn new(
		id: ContentId,
		page: PageId,
		language: impl Into<String>,
		title: impl Into<String>,
		template: impl Into<String>,
		created_by: impl Into<String>,
	) -> Self {
		let created_by = created_by.into();
		Self {
			id,
			page,
			language: language.into(),
			title: title.into(),
			template: template.into(),
			menu_title: None,
			page_title: None,
			meta_description: None,
			in_navigation: true,
			soft_root: false,
			redirect: None,
			xframe_options: XFrameOptions::Inherit,
			limit_visibility_in_menu: None,
			changed_by: created_by.clone(),
			created_by,
			creation_date: Utc::now(),
		}
	}

	pub fn inherits_template(&self) -> bool {
		self.template == TEMPLATE_INHERITANCE_MAGIC
	}

	/// Title shown in menus
	pub fn menu_title_or_title(&self) -> &str {
		self.menu_title
			.as_deref()
			.filter(|title| !title.is_empty())
			.unwrap_or(&self.title)
	}
}

/// Content lookup result that is never null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageContentOrEmpty {
	Present(PageContent),
	Empty { page: PageId, language: String },
}

impl PageContentOrEmpty {
	pub fn is_present(&self) -> bool {
		matches!(self, Self::Present(_))
	}

	pub fn content(&self) -> Option<&PageContent> {
		match self {
			Self::Present(content) => Some(content),
			Self::Empty { .. } => None,
		}
	}

	pub fn into_content(self) -> Option<PageContent> {
		match self {
			Self::Present(content) => Some(content),
			Self::Empty { .. } => None,
		}
	}

	pub fn page(&self) -> PageId {
		match self {
			Self::Present(content) => content.page,
			Self::Empty { page, .. } => *page,
		}
	}

	pub fn language(&self) -> &str {
		match self {
			Self::Present(content) => &content.language,
			Self::Empty { language, .. } => language,
		}
	}

	pub fn title(&self) -> &str {
		match self {
			Self::Present(content) => &content.title,
			Self::Empty { .. } => "",
		}
	}

	/// Raw template value; a missing translation inherits
	pub fn get_template(&self) -> &str {
		match self {
			Self::Present(content) => &content.template,
			Self::Empty { .. } => TEMPLATE_INHERITANCE_MAGIC,
		}
	}

	pub fn content_indicator(&self) -> ContentIndicator {
		match self {
			Self::Present(_) => ContentIndicator::Public,
			Self::Empty { .. } => ContentIndicator::Empty,
		}
	}

	pub fn is_editable(&self) -> bool {
		self.is_present()
	}
}
