use serde::{Deserialize, Serialize};

use super::{ContentId, PlaceholderId, PluginId};

/// Named slot of a translation that holds plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
	pub id: PlaceholderId,
	pub content: ContentId,
	pub slot: String,
}

/// Content plugin; plugins nest through `parent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsPlugin {
	pub id: PluginId,
	pub placeholder: PlaceholderId,
	pub parent: Option<PluginId>,
	/// Order among siblings, starting at 1
	pub position: u32,
	pub language: String,
	pub plugin_type: String,
	pub data: serde_json::Value,
}
