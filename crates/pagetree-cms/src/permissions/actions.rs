use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::PermissionFlags;

/// Page action guarded by the permission engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	AddPage,
	ChangePage,
	ChangePageAdvancedSettings,
	ChangePagePermissions,
	DeletePage,
	DeletePageTranslation,
	MovePage,
	PublishPage,
	ViewPage,
}

impl Action {
	pub const ALL: [Action; 9] = [
		Action::AddPage,
		Action::ChangePage,
		Action::ChangePageAdvancedSettings,
		Action::ChangePagePermissions,
		Action::DeletePage,
		Action::DeletePageTranslation,
		Action::MovePage,
		Action::PublishPage,
		Action::ViewPage,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::AddPage => "add_page",
			Self::ChangePage => "change_page",
			Self::ChangePageAdvancedSettings => "change_page_advanced_settings",
			Self::ChangePagePermissions => "change_page_permissions",
			Self::DeletePage => "delete_page",
			Self::DeletePageTranslation => "delete_page_translation",
			Self::MovePage => "move_page",
			Self::PublishPage => "publish_page",
			Self::ViewPage => "view_page",
		}
	}

	/// Model permissions a user needs before page permissions are consulted
	pub fn base_permissions(self) -> &'static [&'static str] {
		match self {
			Self::AddPage => &["cms.add_page", "cms.add_pagecontent"],
			Self::ChangePage | Self::ChangePageAdvancedSettings | Self::ChangePagePermissions => {
				&["cms.change_page", "cms.change_pagecontent"]
			}
			Self::DeletePage => &["cms.delete_page", "cms.delete_pagecontent"],
			Self::DeletePageTranslation => &["cms.delete_pagecontent"],
			Self::MovePage => &["cms.change_page"],
			Self::PublishPage => &["cms.change_page", "cms.publish_page"],
			Self::ViewPage => &[],
		}
	}

	/// Whether a permission row with `flags` grants this action
	pub fn granted_by(self, flags: &PermissionFlags) -> bool {
		match self {
			Self::AddPage => flags.can_add,
			Self::ChangePage => flags.can_change,
			Self::ChangePageAdvancedSettings => flags.can_change_advanced_settings,
			Self::ChangePagePermissions => flags.can_change_permissions,
			Self::DeletePage | Self::DeletePageTranslation => flags.can_delete,
			Self::MovePage => flags.can_move_page,
			Self::PublishPage => flags.can_publish,
			Self::ViewPage => flags.can_view,
		}
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Action {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Action::ALL
			.into_iter()
			.find(|action| action.as_str() == s)
			.ok_or_else(|| format!("unknown page action '{s}'"))
	}
}
