//! Tree node rows and move positions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;

/// Node identifier
pub type NodeId = i64;

/// Site identifier
pub type SiteId = i64;

/// One row of the materialized path tree
///
/// The node carries structure only. Page content hangs off it by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
	pub id: NodeId,
	/// Concatenated fixed-width steps from the root
	pub path: String,
	/// 1 for roots
	pub depth: u32,
	/// Number of direct children
	pub numchild: u32,
	pub site: SiteId,
	pub parent: Option<NodeId>,
}

impl TreeNode {
	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}

	pub fn is_leaf(&self) -> bool {
		self.numchild == 0
	}

	pub fn is_branch(&self) -> bool {
		self.numchild > 0
	}

	/// Whether `self` lies strictly below `other`
	pub fn is_descendant_of(&self, other: &TreeNode) -> bool {
		self.path.len() > other.path.len() && self.path.starts_with(&other.path)
	}
}

/// Target position for moves and insertions relative to a target node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
	FirstChild,
	LastChild,
	Left,
	Right,
	FirstSibling,
	LastSibling,
}

impl Position {
	/// Whether the node becomes a child of the target
	pub fn is_child(self) -> bool {
		matches!(self, Position::FirstChild | Position::LastChild)
	}

	/// Sibling flavour of this position, if any
	pub fn as_sibling(self) -> Option<SiblingPosition> {
		match self {
			Position::Left => Some(SiblingPosition::Left),
			Position::Right => Some(SiblingPosition::Right),
			Position::FirstSibling => Some(SiblingPosition::FirstSibling),
			Position::LastSibling => Some(SiblingPosition::LastSibling),
			Position::FirstChild | Position::LastChild => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Position::FirstChild => "first-child",
			Position::LastChild => "last-child",
			Position::Left => "left",
			Position::Right => "right",
			Position::FirstSibling => "first-sibling",
			Position::LastSibling => "last-sibling",
		}
	}
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Position {
	type Err = TreeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"first-child" => Ok(Position::FirstChild),
			"last-child" => Ok(Position::LastChild),
			"left" => Ok(Position::Left),
			"right" => Ok(Position::Right),
			"first-sibling" => Ok(Position::FirstSibling),
			"last-sibling" => Ok(Position::LastSibling),
			other => Err(TreeError::InvalidPosition(other.to_string())),
		}
	}
}

/// Position for `add_sibling`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiblingPosition {
	FirstSibling,
	Left,
	Right,
	LastSibling,
}

impl From<SiblingPosition> for Position {
	fn from(pos: SiblingPosition) -> Self {
		match pos {
			SiblingPosition::FirstSibling => Position::FirstSibling,
			SiblingPosition::Left => Position::Left,
			SiblingPosition::Right => Position::Right,
			SiblingPosition::LastSibling => Position::LastSibling,
		}
	}
}
