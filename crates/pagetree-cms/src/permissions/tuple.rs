use pagetree_tree::STEPLEN;
use serde::{Deserialize, Serialize};

use crate::models::{GrantOn, PageId};

/// Grant breadth anchored at a node path
///
/// # Examples
///
/// ```
/// use pagetree_cms::models::GrantOn;
/// use pagetree_cms::permissions::PermissionTuple;
///
/// let tuple = PermissionTuple::new(GrantOn::PAGE_AND_CHILDREN, "0001");
/// assert!(tuple.contains("0001"));
/// assert!(tuple.contains("00010002"));
/// assert!(!tuple.contains("000100020001"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTuple {
	pub grant_on: GrantOn,
	pub path: String,
}

impl PermissionTuple {
	pub fn new(grant_on: GrantOn, path: impl Into<String>) -> Self {
		Self {
			grant_on,
			path: path.into(),
		}
	}

	/// Whether the node at `path` falls under this grant
	pub fn contains(&self, path: &str) -> bool {
		if self.grant_on.covers_page() && path == self.path {
			return true;
		}
		if !path.starts_with(&self.path) || path.len() <= self.path.len() {
			return false;
		}
		self.grant_on.covers_descendants()
			|| (self.grant_on.covers_children() && path.len() == self.path.len() + STEPLEN)
	}
}

/// Outcome of resolving one action for one user on one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedPermissions {
	/// Every page of the site
	GrantAll,
	Tuples(Vec<PermissionTuple>),
}

impl ResolvedPermissions {
	pub fn allows(&self, path: &str) -> bool {
		match self {
			Self::GrantAll => true,
			Self::Tuples(tuples) => tuples.iter().any(|tuple| tuple.contains(path)),
		}
	}

	/// True when no page at all is granted
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Tuples(tuples) if tuples.is_empty())
	}
}

/// Pages an action is allowed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageIds {
	All,
	Ids(Vec<PageId>),
}

impl PageIds {
	pub fn contains(&self, page: PageId) -> bool {
		match self {
			Self::All => true,
			Self::Ids(ids) => ids.contains(&page),
		}
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Ids(ids) if ids.is_empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(GrantOn::PAGE, "0002", true)]
	#[case(GrantOn::PAGE, "00020001", false)]
	#[case(GrantOn::CHILDREN, "0002", false)]
	#[case(GrantOn::CHILDREN, "00020001", true)]
	#[case(GrantOn::CHILDREN, "000200010001", false)]
	#[case(GrantOn::PAGE_AND_CHILDREN, "0002", true)]
	#[case(GrantOn::PAGE_AND_CHILDREN, "00020001", true)]
	#[case(GrantOn::PAGE_AND_CHILDREN, "000200010001", false)]
	#[case(GrantOn::DESCENDANTS, "0002", false)]
	#[case(GrantOn::DESCENDANTS, "000200010001", true)]
	#[case(GrantOn::PAGE_AND_DESCENDANTS, "0002", true)]
	#[case(GrantOn::PAGE_AND_DESCENDANTS, "000200010001", true)]
	#[case(GrantOn::PAGE_AND_DESCENDANTS, "0003", false)]
	#[case(GrantOn::PAGE_AND_DESCENDANTS, "00030002", false)]
	fn test_contains(#[case] grant_on: GrantOn, #[case] path: &str, #[case] expected: bool) {
		let tuple = PermissionTuple::new(grant_on, "0002");
		assert_eq!(tuple.contains(path), expected);
	}

	#[rstest]
	fn test_resolved_permissions() {
		let resolved = ResolvedPermissions::Tuples(vec![PermissionTuple::new(GrantOn::PAGE, "0001")]);
		assert!(resolved.allows("0001"));
		assert!(!resolved.allows("0002"));
		assert!(ResolvedPermissions::GrantAll.allows("0002"));
		assert!(ResolvedPermissions::Tuples(Vec::new()).is_empty());
		assert!(!ResolvedPermissions::GrantAll.is_empty());
	}
}
