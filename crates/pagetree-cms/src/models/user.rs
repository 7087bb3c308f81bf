use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{GroupId, UserId};

/// Id reserved for the anonymous user
pub const ANONYMOUS_USER_ID: UserId = 0;

/// Account as seen by the permission engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub is_active: bool,
	pub is_staff: bool,
	pub is_superuser: bool,
	/// Model permissions such as `cms.change_page`
	pub permissions: BTreeSet<String>,
	pub groups: BTreeSet<GroupId>,
}

impl User {
	pub fn new(id: UserId, username: impl Into<String>) -> Self {
		Self {
			id,
			username: username.into(),
			is_active: true,
			is_staff: false,
			is_superuser: false,
			permissions: BTreeSet::new(),
			groups: BTreeSet::new(),
		}
	}

	pub fn anonymous() -> Self {
		Self {
			is_active: false,
			..Self::new(ANONYMOUS_USER_ID, "")
		}
	}

	pub fn staff(mut self) -> Self {
		self.is_staff = true;
		self
	}

	pub fn superuser(mut self) -> Self {
		self.is_staff = true;
		self.is_superuser = true;
		self
	}

	pub fn with_permissions<I, S>(mut self, codenames: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.permissions.extend(codenames.into_iter().map(Into::into));
		self
	}

	pub fn is_authenticated(&self) -> bool {
		self.id != ANONYMOUS_USER_ID
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
	pub id: GroupId,
	pub name: String,
	pub permissions: BTreeSet<String>,
}

impl Group {
	pub fn new(id: GroupId, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			permissions: BTreeSet::new(),
		}
	}
}
