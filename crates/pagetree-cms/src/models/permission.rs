use pagetree_tree::SiteId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{GroupId, PageId, PermissionId, UserId};
use crate::error::{CmsError, CmsResult};

/// Breadth of a page permission as a bitmask
///
/// ```
/// use pagetree_cms::models::GrantOn;
///
/// let grant = GrantOn::PAGE_AND_DESCENDANTS;
/// assert!(grant.covers_page());
/// assert!(grant.covers_descendants());
/// assert!(!grant.covers_children());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GrantOn(u8);

impl GrantOn {
	pub const PAGE_BIT: u8 = 1;
	pub const CHILDREN_BIT: u8 = 2;
	pub const DESCENDANTS_BIT: u8 = 4;

	pub const PAGE: GrantOn = GrantOn(1);
	pub const CHILDREN: GrantOn = GrantOn(2);
	pub const PAGE_AND_CHILDREN: GrantOn = GrantOn(3);
	pub const DESCENDANTS: GrantOn = GrantOn(4);
	pub const PAGE_AND_DESCENDANTS: GrantOn = GrantOn(5);

	/// Validate a raw value read from storage
	pub fn from_bits(bits: u8) -> CmsResult<Self> {
		match bits {
			1..=5 => Ok(Self(bits)),
			other => Err(CmsError::Fatal(format!("malformed grant_on value {other}"))),
		}
	}

	pub fn bits(self) -> u8 {
		self.0
	}

	pub fn covers_page(self) -> bool {
		self.0 & Self::PAGE_BIT != 0
	}

	pub fn covers_children(self) -> bool {
		self.0 & Self::CHILDREN_BIT != 0
	}

	pub fn covers_descendants(self) -> bool {
		self.0 & Self::DESCENDANTS_BIT != 0
	}
}

impl TryFrom<u8> for GrantOn {
	type Error = String;

	fn try_from(bits: u8) -> Result<Self, Self::Error> {
		GrantOn::from_bits(bits).map_err(|err| err.to_string())
	}
}

impl From<GrantOn> for u8 {
	fn from(grant: GrantOn) -> Self {
		grant.0
	}
}

/// Who a permission row applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
	User(UserId),
	Group(GroupId),
	/// Every authenticated user
	Everybody,
}

impl fmt::Display for Principal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::User(id) => write!(f, "user:{id}"),
			Self::Group(id) => write!(f, "group:{id}"),
			Self::Everybody => f.write_str("everybody"),
		}
	}
}

/// Capabilities granted by a permission row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFlags {
	pub can_add: bool,
	pub can_change: bool,
	pub can_delete: bool,
	pub can_change_advanced_settings: bool,
	pub can_publish: bool,
	pub can_change_permissions: bool,
	pub can_move_page: bool,
	pub can_view: bool,
}

impl PermissionFlags {
	/// Every editing capability, without view restriction
	pub fn all() -> Self {
		Self {
			can_add: true,
			can_change: true,
			can_delete: true,
			can_change_advanced_settings: true,
			can_publish: true,
			can_change_permissions: true,
			can_move_page: true,
			can_view: false,
		}
	}

	pub fn view_only() -> Self {
		Self {
			can_view: true,
			..Self::default()
		}
	}

	pub fn change_only() -> Self {
		Self {
			can_change: true,
			..Self::default()
		}
	}
}

/// Permission on one page, extended to its subtree by `grant_on`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePermission {
	pub id: PermissionId,
	pub page: PageId,
	pub principal: Principal,
	pub grant_on: GrantOn,
	pub flags: PermissionFlags,
}

/// Permission on every page of the listed sites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPagePermission {
	pub id: PermissionId,
	pub principal: Principal,
	pub flags: PermissionFlags,
	/// Empty means every site
	pub sites: BTreeSet<SiteId>,
}

impl GlobalPagePermission {
	pub fn applies_to_site(&self, site: SiteId) -> bool {
		self.sites.is_empty() || self.sites.contains(&site)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(0)]
	#[case(6)]
	#[case(7)]
	fn test_malformed_grant_on(#[case] bits: u8) {
		assert!(matches!(GrantOn::from_bits(bits), Err(CmsError::Fatal(_))));
	}

	#[rstest]
	fn test_grant_on_deserializes_from_number() {
		let grant: GrantOn = serde_json::from_str("3").unwrap();
		assert_eq!(grant, GrantOn::PAGE_AND_CHILDREN);
		assert!(serde_json::from_str::<GrantOn>("9").is_err());
	}
}
