//! Composition point for entities that own a tree node

use crate::error::Result;
use crate::node::{NodeId, TreeNode};
use crate::table::NodeTable;

/// Anything that owns exactly one [`TreeNode`]
///
/// Implementors only provide [`TreeMember::node_id`]; the structural queries
/// are answered by the [`NodeTable`] passed in.
///
/// # Examples
///
/// ```
/// use pagetree_tree::{NodeId, NodeTable, TreeMember};
///
/// struct Folder {
///     node: NodeId,
/// }
///
/// impl TreeMember for Folder {
///     fn node_id(&self) -> NodeId {
///         self.node
///     }
/// }
///
/// let mut tree = NodeTable::new();
/// let root = tree.add_root(1).unwrap();
/// let child = tree.add_child(root.id).unwrap();
///
/// let folder = Folder { node: child.id };
/// assert_eq!(folder.ancestors(&tree).unwrap()[0].id, root.id);
/// assert!(folder.is_leaf(&tree).unwrap());
/// ```
pub trait TreeMember {
	fn node_id(&self) -> NodeId;

	fn tree_node<'a>(&self, tree: &'a NodeTable) -> Result<&'a TreeNode> {
		tree.get(self.node_id())
	}

	fn ancestors<'a>(&self, tree: &'a NodeTable) -> Result<Vec<&'a TreeNode>> {
		tree.get_ancestors(self.node_id())
	}

	fn descendants<'a>(&self, tree: &'a NodeTable) -> Result<Vec<&'a TreeNode>> {
		tree.get_descendants(self.node_id())
	}

	fn children<'a>(&self, tree: &'a NodeTable) -> Result<Vec<&'a TreeNode>> {
		tree.get_children(self.node_id())
	}

	fn siblings<'a>(&self, tree: &'a NodeTable) -> Result<Vec<&'a TreeNode>> {
		tree.get_siblings(self.node_id())
	}

	fn parent_node<'a>(&self, tree: &'a NodeTable) -> Result<Option<&'a TreeNode>> {
		tree.get_parent(self.node_id())
	}

	fn is_leaf(&self, tree: &NodeTable) -> Result<bool> {
		Ok(self.tree_node(tree)?.is_leaf())
	}

	fn is_root(&self, tree: &NodeTable) -> Result<bool> {
		Ok(self.tree_node(tree)?.is_root())
	}
}

impl TreeMember for TreeNode {
	fn node_id(&self) -> NodeId {
		self.id
	}
}
