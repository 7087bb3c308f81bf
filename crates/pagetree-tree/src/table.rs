//! In-memory node table with materialized path maintenance
//!
//! `NodeTable` is the storage-facing half of the tree: it owns every
//! [`TreeNode`] row, keeps a path index ordered exactly like the tree, and
//! implements the structural mutations. All mutations keep the sibling
//! steps of a level dense enough that path order equals sibling order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

use crate::arena::Forest;
use crate::error::{Result, TreeError};
use crate::node::{NodeId, Position, SiblingPosition, SiteId, TreeNode};
use crate::path::PathCodec;

/// Materialized path node storage
///
/// # Examples
///
/// ```
/// use pagetree_tree::{NodeTable, Position};
///
/// let mut tree = NodeTable::new();
/// let home = tree.add_root(1).unwrap();
/// let about = tree.add_child(home.id).unwrap();
/// let news = tree.add_root(1).unwrap();
///
/// assert_eq!(about.path, "00010001");
/// tree.move_node(about.id, news.id, Position::LastChild).unwrap();
/// assert_eq!(tree.get(about.id).unwrap().path, "00020001");
/// assert!(tree.get(home.id).unwrap().is_leaf());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeTable {
	nodes: BTreeMap<NodeId, TreeNode>,
	by_path: BTreeMap<String, NodeId>,
	next_id: NodeId,
	#[serde(skip)]
	codec: PathCodec,
}

impl NodeTable {
	/// Create an empty table
	pub fn new() -> Self {
		Self::default()
	}

	pub fn codec(&self) -> &PathCodec {
		&self.codec
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Fetch a node or fail with [`TreeError::NodeNotFound`]
	pub fn get(&self, id: NodeId) -> Result<&TreeNode> {
		self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))
	}

	pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
		self.nodes.get(&id)
	}

	pub fn get_by_path(&self, path: &str) -> Option<&TreeNode> {
		self.by_path.get(path).and_then(|id| self.nodes.get(id))
	}

	/// All nodes in tree order
	pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
		self.by_path.values().filter_map(|id| self.nodes.get(id))
	}

	/// All nodes of one site in tree order
	pub fn iter_site(&self, site: SiteId) -> impl Iterator<Item = &TreeNode> {
		self.iter().filter(move |node| node.site == site)
	}

	/// Load an existing row verbatim, without any path bookkeeping
	///
	/// Used when hydrating the table from persisted rows. Inconsistent rows are
	/// accepted and reported later by [`NodeTable::check_integrity`].
	pub fn insert_raw(&mut self, node: TreeNode) {
		self.next_id = self.next_id.max(node.id);
		self.by_path.insert(node.path.clone(), node.id);
		self.nodes.insert(node.id, node);
	}

	pub(crate) fn raw_nodes(&self) -> &BTreeMap<NodeId, TreeNode> {
		&self.nodes
	}

	pub(crate) fn replace_all(&mut self, nodes: Vec<TreeNode>) {
		self.nodes.clear();
		self.by_path.clear();
		for node in nodes {
			self.by_path.insert(node.path.clone(), node.id);
			self.nodes.insert(node.id, node);
		}
	}

	fn subtree_paths<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a String, &'a NodeId)> {
		self.by_path
			.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
			.take_while(move |(path, _)| path.starts_with(prefix))
	}

	/// Paths of the direct children of `prefix` (all roots for `""`)
	fn child_paths(&self, prefix: &str) -> Vec<String> {
		let len = prefix.len() + self.codec.steplen();
		self.subtree_paths(prefix)
			.filter(|(path, _)| path.len() == len)
			.map(|(path, _)| path.clone())
			.collect()
	}

	fn allocate(&mut self, path: String, depth: u32, site: SiteId, parent: Option<NodeId>) -> TreeNode {
		self.next_id += 1;
		let node = TreeNode {
			id: self.next_id,
			path,
			depth,
			numchild: 0,
			site,
			parent,
		};
		self.by_path.insert(node.path.clone(), node.id);
		self.nodes.insert(node.id, node.clone());
		node
	}

	fn bump_numchild(&mut self, parent: Option<NodeId>, delta: i32) {
		if let Some(node) = parent.and_then(|id| self.nodes.get_mut(&id)) {
			node.numchild = node.numchild.saturating_add_signed(delta);
		}
	}

	/// Rewrite whole subtrees from one prefix to another
	///
	/// All affected index entries are removed before any is re-inserted, so
	/// overlapping old/new slots inside one batch never clash.
	fn relocate(&mut self, moves: &[(String, String)]) {
		let mut updates = Vec::new();
		for (old, new) in moves {
			for (path, id) in self.subtree_paths(old) {
				updates.push((*id, path.clone(), format!("{new}{}", &path[old.len()..])));
			}
		}
		for (_, old_path, _) in &updates {
			self.by_path.remove(old_path);
		}
		for (id, _, new_path) in updates {
			if let Some(node) = self.nodes.get_mut(&id) {
				node.path = new_path.clone();
			}
			self.by_path.insert(new_path, id);
		}
	}

	/// Free the slot at `idx` among `siblings` and return its path
	fn make_room(&mut self, prefix: &str, siblings: &[String], idx: usize) -> Result<String> {
		if idx >= siblings.len() {
			return match siblings.last() {
				Some(last) => self.codec.next_sibling(last),
				None => self.codec.child_path(prefix, 1),
			};
		}
		let shifted = siblings[idx..]
			.iter()
			.map(|path| Ok((path.clone(), self.codec.next_sibling(path)?)))
			.collect::<Result<Vec<_>>>()?;
		self.relocate(&shifted);
		Ok(siblings[idx].clone())
	}

	fn slot_index(siblings: &[String], anchor: &str, pos: SiblingPosition) -> Result<usize> {
		let anchor_idx = siblings
			.iter()
			.position(|path| path == anchor)
			.ok_or_else(|| TreeError::Corrupted(format!("path {anchor:?} missing from its level")))?;
		Ok(match pos {
			SiblingPosition::FirstSibling => 0,
			SiblingPosition::Left => anchor_idx,
			SiblingPosition::Right => anchor_idx + 1,
			SiblingPosition::LastSibling => siblings.len(),
		})
	}

	/// Append a new root node after the last existing root
	pub fn add_root(&mut self, site: SiteId) -> Result<TreeNode> {
		let steplen = self.codec.steplen();
		let last_root = self
			.by_path
			.keys()
			.next_back()
			.map(|path| path[..steplen.min(path.len())].to_string());
		let path = match last_root {
			Some(root) => self.codec.next_sibling(&root)?,
			None => self.codec.child_path("", 1)?,
		};
		let node = self.allocate(path, 1, site, None);
		debug!(node = node.id, path = %node.path, site, "added root node");
		Ok(node)
	}

	/// Append a new last child under `parent_id`
	pub fn add_child(&mut self, parent_id: NodeId) -> Result<TreeNode> {
		self.add_child_at(parent_id, false)
	}

	/// Insert a new first child under `parent_id`, shifting existing children
	pub fn add_first_child(&mut self, parent_id: NodeId) -> Result<TreeNode> {
		self.add_child_at(parent_id, true)
	}

	fn add_child_at(&mut self, parent_id: NodeId, first: bool) -> Result<TreeNode> {
		let parent = self.get(parent_id)?.clone();
		let children = self.child_paths(&parent.path);
		let idx = if first { 0 } else { children.len() };
		let path = self.make_room(&parent.path, &children, idx)?;
		self.bump_numchild(Some(parent_id), 1);
		let node = self.allocate(path, parent.depth + 1, parent.site, Some(parent_id));
		debug!(node = node.id, path = %node.path, parent = parent_id, "added child node");
		Ok(node)
	}

	/// Insert a new node on the same level as `node_id`
	pub fn add_sibling(&mut self, node_id: NodeId, pos: SiblingPosition) -> Result<TreeNode> {
		let anchor = self.get(node_id)?.clone();
		let prefix = self.codec.parent_path(&anchor.path).to_string();
		let siblings = self.child_paths(&prefix);
		let idx = Self::slot_index(&siblings, &anchor.path, pos)?;
		let path = self.make_room(&prefix, &siblings, idx)?;
		self.bump_numchild(anchor.parent, 1);
		let node = self.allocate(path, anchor.depth, anchor.site, anchor.parent);
		debug!(node = node.id, path = %node.path, anchor = node_id, "added sibling node");
		Ok(node)
	}

	/// Insert a new node at `pos` relative to `target_id`
	pub fn insert_at(&mut self, target_id: NodeId, pos: Position) -> Result<TreeNode> {
		match pos {
			Position::FirstChild => self.add_first_child(target_id),
			Position::LastChild => self.add_child(target_id),
			Position::Left => self.add_sibling(target_id, SiblingPosition::Left),
			Position::Right => self.add_sibling(target_id, SiblingPosition::Right),
			Position::FirstSibling => self.add_sibling(target_id, SiblingPosition::FirstSibling),
			Position::LastSibling => self.add_sibling(target_id, SiblingPosition::LastSibling),
		}
	}

	/// Whether [`insert_at`](Self::insert_at) with the same arguments would
	/// rewrite the paths of existing nodes
	///
	/// Only appends leave every stored path untouched.
	pub fn insert_shifts(&self, target_id: NodeId, pos: Position) -> Result<bool> {
		let target = self.get(target_id)?;
		let (siblings, idx) = match pos.as_sibling() {
			None if pos == Position::LastChild => return Ok(false),
			None => (self.child_paths(&target.path), 0),
			Some(sibling) => {
				let siblings = self.child_paths(self.codec.parent_path(&target.path));
				let idx = Self::slot_index(&siblings, &target.path, sibling)?;
				(siblings, idx)
			}
		};
		Ok(idx < siblings.len())
	}

	/// Move a node and its subtree to `pos` relative to `target_id`
	///
	/// Fails with [`TreeError::InvalidMove`] before touching any row when the
	/// target is the node itself or one of its descendants.
	pub fn move_node(&mut self, node_id: NodeId, target_id: NodeId, pos: Position) -> Result<TreeNode> {
		let node = self.get(node_id)?.clone();
		let target = self.get(target_id)?.clone();
		if node.id == target.id {
			return Err(TreeError::InvalidMove(format!(
				"node {node_id} cannot be moved relative to itself"
			)));
		}
		if target.path.starts_with(&node.path) {
			return Err(TreeError::InvalidMove(format!(
				"node {target_id} is a descendant of node {node_id}"
			)));
		}

		let old_prefix = self.codec.parent_path(&node.path).to_string();
		let dest_prefix = if pos.is_child() {
			target.path.clone()
		} else {
			self.codec.parent_path(&target.path).to_string()
		};
		if dest_prefix != old_prefix {
			if let Some(last) = self.child_paths(&dest_prefix).last() {
				if self.codec.decode(self.codec.last_step(last))? >= self.codec.max_step() {
					return Err(TreeError::PathOverflow {
						path: last.clone(),
						max: self.codec.max_step(),
					});
				}
			}
		}

		// Detach the subtree and close the gap among former siblings
		let subtree: Vec<(NodeId, String, u32)> = self
			.subtree_paths(&node.path)
			.map(|(path, id)| {
				let depth = self.nodes.get(id).map_or(node.depth, |n| n.depth);
				(*id, path[node.path.len()..].to_string(), depth)
			})
			.collect();
		for (_, suffix, _) in &subtree {
			self.by_path.remove(&format!("{}{suffix}", node.path));
		}
		let closing = self
			.child_paths(&old_prefix)
			.into_iter()
			.filter(|path| path.as_str() > node.path.as_str())
			.map(|path| {
				let prev = self.codec.prev_sibling(&path)?;
				Ok((path, prev))
			})
			.collect::<Result<Vec<_>>>()?;
		self.relocate(&closing);
		self.bump_numchild(node.parent, -1);

		// The target may have shifted while the gap was closed
		let target = self.get(target_id)?.clone();
		let (new_parent, prefix, siblings, idx) = match pos {
			Position::FirstChild | Position::LastChild => {
				let children = self.child_paths(&target.path);
				let idx = if pos == Position::FirstChild { 0 } else { children.len() };
				(Some(target.id), target.path.clone(), children, idx)
			}
			Position::Left | Position::Right | Position::FirstSibling | Position::LastSibling => {
				let prefix = self.codec.parent_path(&target.path).to_string();
				let siblings = self.child_paths(&prefix);
				let sibling_pos = match pos {
					Position::Left => SiblingPosition::Left,
					Position::Right => SiblingPosition::Right,
					Position::FirstSibling => SiblingPosition::FirstSibling,
					_ => SiblingPosition::LastSibling,
				};
				let idx = Self::slot_index(&siblings, &target.path, sibling_pos)?;
				(target.parent, prefix, siblings, idx)
			}
		};
		let new_path = self.make_room(&prefix, &siblings, idx)?;
		let new_depth = self.codec.depth_of(&new_path);

		for (id, suffix, old_depth) in subtree {
			let path = format!("{new_path}{suffix}");
			if let Some(row) = self.nodes.get_mut(&id) {
				row.path = path.clone();
				row.depth = old_depth - node.depth + new_depth;
				row.site = target.site;
				if id == node_id {
					row.parent = new_parent;
				}
			}
			self.by_path.insert(path, id);
		}
		self.bump_numchild(new_parent, 1);

		debug!(
			node = node_id,
			target = target_id,
			position = %pos,
			old_path = %node.path,
			new_path = %new_path,
			"moved node"
		);
		self.get(node_id).cloned()
	}

	/// Delete a node and its whole subtree in one range operation
	///
	/// Returns the removed ids in tree order. Sibling paths are left as is.
	pub fn delete_fast(&mut self, node_id: NodeId) -> Result<Vec<NodeId>> {
		let node = self.get(node_id)?.clone();
		let doomed: Vec<(String, NodeId)> = self
			.subtree_paths(&node.path)
			.map(|(path, id)| (path.clone(), *id))
			.collect();
		for (path, id) in &doomed {
			self.by_path.remove(path);
			self.nodes.remove(id);
		}
		self.bump_numchild(node.parent, -1);
		debug!(node = node_id, removed = doomed.len(), "deleted subtree");
		Ok(doomed.into_iter().map(|(_, id)| id).collect())
	}

	/// Ancestors from the root down, excluding the node
	pub fn get_ancestors(&self, node_id: NodeId) -> Result<Vec<&TreeNode>> {
		let node = self.get(node_id)?;
		let steplen = self.codec.steplen();
		Ok((1..node.depth as usize)
			.filter_map(|depth| self.get_by_path(&node.path[..depth * steplen]))
			.collect())
	}

	/// Descendants in tree order, excluding the node
	pub fn get_descendants(&self, node_id: NodeId) -> Result<Vec<&TreeNode>> {
		let node = self.get(node_id)?;
		Ok(self
			.subtree_paths(&node.path)
			.filter(|(_, id)| **id != node_id)
			.filter_map(|(_, id)| self.nodes.get(id))
			.collect())
	}

	/// The node followed by its descendants in tree order
	pub fn get_subtree(&self, node_id: NodeId) -> Result<Vec<&TreeNode>> {
		let node = self.get(node_id)?;
		Ok(self
			.subtree_paths(&node.path)
			.filter_map(|(_, id)| self.nodes.get(id))
			.collect())
	}

	/// Direct children in tree order
	pub fn get_children(&self, node_id: NodeId) -> Result<Vec<&TreeNode>> {
		Ok(self
			.get_descendants(node_id)?
			.into_iter()
			.filter(|node| node.parent == Some(node_id))
			.collect())
	}

	/// Nodes sharing the parent of `node_id`, including itself
	pub fn get_siblings(&self, node_id: NodeId) -> Result<Vec<&TreeNode>> {
		let node = self.get(node_id)?;
		let prefix = self.codec.parent_path(&node.path);
		Ok(self
			.child_paths(prefix)
			.iter()
			.filter_map(|path| self.get_by_path(path))
			.collect())
	}

	pub fn get_parent(&self, node_id: NodeId) -> Result<Option<&TreeNode>> {
		let node = self.get(node_id)?;
		Ok(node.parent.and_then(|id| self.nodes.get(&id)))
	}

	/// Root nodes in tree order, optionally restricted to one site
	pub fn get_root_nodes(&self, site: Option<SiteId>) -> Vec<&TreeNode> {
		self.child_paths("")
			.iter()
			.filter_map(|path| self.get_by_path(path))
			.filter(|node| site.is_none_or(|s| node.site == s))
			.collect()
	}

	/// Whether `node_id` lies strictly below `ancestor_id`
	pub fn is_descendant_of(&self, node_id: NodeId, ancestor_id: NodeId) -> Result<bool> {
		let node = self.get(node_id)?;
		let ancestor = self.get(ancestor_id)?;
		Ok(node.is_descendant_of(ancestor))
	}

	/// Arena of one site's nodes, built from a single ordered scan
	pub fn forest(&self, site: SiteId) -> Forest {
		Forest::build(self.iter_site(site))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	/// ```text
	/// A (0001)
	///   A1 (00010001)
	///   A2 (00010002)
	///     A2a (000100020001)
	/// B (0002)
	///   B1 (00020001)
	/// ```
	struct Sample {
		tree: NodeTable,
		a: NodeId,
		a1: NodeId,
		a2: NodeId,
		a2a: NodeId,
		b: NodeId,
		b1: NodeId,
	}

	#[fixture]
	fn sample() -> Sample {
		let mut tree = NodeTable::new();
		let a = tree.add_root(1).unwrap().id;
		let a1 = tree.add_child(a).unwrap().id;
		let a2 = tree.add_child(a).unwrap().id;
		let a2a = tree.add_child(a2).unwrap().id;
		let b = tree.add_root(1).unwrap().id;
		let b1 = tree.add_child(b).unwrap().id;
		Sample {
			tree,
			a,
			a1,
			a2,
			a2a,
			b,
			b1,
		}
	}

	fn path(tree: &NodeTable, id: NodeId) -> String {
		tree.get(id).unwrap().path.clone()
	}

	#[rstest]
	fn test_add_root_and_children(sample: Sample) {
		let tree = &sample.tree;
		assert_eq!(path(tree, sample.a), "0001");
		assert_eq!(path(tree, sample.a2a), "000100020001");
		assert_eq!(path(tree, sample.b), "0002");
		assert_eq!(tree.get(sample.a).unwrap().numchild, 2);
		assert_eq!(tree.get(sample.a2a).unwrap().depth, 3);
	}

	#[rstest]
	fn test_add_first_child_shifts_subtrees(mut sample: Sample) {
		let new = sample.tree.add_first_child(sample.a).unwrap();
		assert_eq!(new.path, "00010001");
		assert_eq!(path(&sample.tree, sample.a1), "00010002");
		assert_eq!(path(&sample.tree, sample.a2), "00010003");
		assert_eq!(path(&sample.tree, sample.a2a), "000100030001");
		assert_eq!(sample.tree.get(sample.a).unwrap().numchild, 3);
	}

	#[rstest]
	#[case(SiblingPosition::Left, "00010001", "00010002")]
	#[case(SiblingPosition::Right, "00010002", "00010001")]
	#[case(SiblingPosition::FirstSibling, "00010001", "00010002")]
	#[case(SiblingPosition::LastSibling, "00010003", "00010001")]
	fn test_add_sibling(
		mut sample: Sample,
		#[case] pos: SiblingPosition,
		#[case] new_path: &str,
		#[case] a1_path: &str,
	) {
		let new = sample.tree.add_sibling(sample.a1, pos).unwrap();
		assert_eq!(new.path, new_path);
		assert_eq!(new.parent, Some(sample.a));
		assert_eq!(path(&sample.tree, sample.a1), a1_path);
		assert_eq!(sample.tree.get(sample.a).unwrap().numchild, 3);
	}

	#[rstest]
	#[case::first_child(Position::FirstChild, true)]
	#[case::last_child(Position::LastChild, false)]
	#[case::left(Position::Left, true)]
	#[case::right_of_last(Position::Right, false)]
	#[case::first_sibling(Position::FirstSibling, true)]
	#[case::last_sibling(Position::LastSibling, false)]
	fn test_insert_shifts(mut sample: Sample, #[case] pos: Position, #[case] expected: bool) {
		// Arrange
		let before: Vec<(NodeId, String)> = sample.tree.iter().map(|n| (n.id, n.path.clone())).collect();

		// Act
		let shifts = sample.tree.insert_shifts(sample.a2, pos).unwrap();
		sample.tree.insert_at(sample.a2, pos).unwrap();

		// Assert
		assert_eq!(shifts, expected);
		let moved = before.iter().any(|(id, old)| path(&sample.tree, *id) != *old);
		assert_eq!(moved, expected);
	}

	#[rstest]
	fn test_insert_into_leaf_never_shifts(sample: Sample) {
		assert!(!sample.tree.insert_shifts(sample.a1, Position::FirstChild).unwrap());
		assert!(sample.tree.insert_shifts(sample.a1, Position::Right).unwrap());
	}

	#[rstest]
	fn test_move_last_child_closes_gap(mut sample: Sample) {
		sample
			.tree
			.move_node(sample.a1, sample.b, Position::LastChild)
			.unwrap();
		assert_eq!(path(&sample.tree, sample.a1), "00020002");
		// A2 slides into the freed slot together with its subtree
		assert_eq!(path(&sample.tree, sample.a2), "00010001");
		assert_eq!(path(&sample.tree, sample.a2a), "000100010001");
		assert_eq!(sample.tree.get(sample.a).unwrap().numchild, 1);
		assert_eq!(sample.tree.get(sample.b).unwrap().numchild, 2);
		assert_eq!(sample.tree.get(sample.a1).unwrap().parent, Some(sample.b));
	}

	#[rstest]
	fn test_move_subtree_to_root_level(mut sample: Sample) {
		sample
			.tree
			.move_node(sample.a2, sample.a, Position::Left)
			.unwrap();
		let a2 = sample.tree.get(sample.a2).unwrap();
		assert_eq!(a2.path, "0001");
		assert_eq!(a2.depth, 1);
		assert_eq!(a2.parent, None);
		let a2a = sample.tree.get(sample.a2a).unwrap();
		assert_eq!(a2a.path, "00010001");
		assert_eq!(a2a.depth, 2);
		assert_eq!(path(&sample.tree, sample.a), "0002");
		assert_eq!(path(&sample.tree, sample.b1), "00030001");
	}

	#[rstest]
	fn test_move_first_child(mut sample: Sample) {
		sample
			.tree
			.move_node(sample.b1, sample.a, Position::FirstChild)
			.unwrap();
		assert_eq!(path(&sample.tree, sample.b1), "00010001");
		assert_eq!(path(&sample.tree, sample.a1), "00010002");
		assert_eq!(path(&sample.tree, sample.a2a), "000100030001");
		assert!(sample.tree.get(sample.b).unwrap().is_leaf());
	}

	#[rstest]
	fn test_move_changes_site(mut sample: Sample) {
		let other = sample.tree.add_root(2).unwrap();
		sample
			.tree
			.move_node(sample.a2, other.id, Position::LastChild)
			.unwrap();
		assert_eq!(sample.tree.get(sample.a2).unwrap().site, 2);
		assert_eq!(sample.tree.get(sample.a2a).unwrap().site, 2);
	}

	#[rstest]
	fn test_move_into_own_subtree_is_rejected(mut sample: Sample) {
		let before = sample.tree.clone();
		let err = sample
			.tree
			.move_node(sample.a, sample.a2a, Position::LastChild)
			.unwrap_err();
		assert!(matches!(err, TreeError::InvalidMove(_)));
		let err = sample
			.tree
			.move_node(sample.a, sample.a, Position::Right)
			.unwrap_err();
		assert!(matches!(err, TreeError::InvalidMove(_)));
		assert_eq!(
			before.iter().collect::<Vec<_>>(),
			sample.tree.iter().collect::<Vec<_>>()
		);
	}

	#[rstest]
	fn test_delete_fast(mut sample: Sample) {
		let removed = sample.tree.delete_fast(sample.a2).unwrap();
		assert_eq!(removed, vec![sample.a2, sample.a2a]);
		assert_eq!(sample.tree.get(sample.a).unwrap().numchild, 1);
		assert!(sample.tree.find(sample.a2a).is_none());
		// later children are appended after the remaining last child
		let next = sample.tree.add_child(sample.a).unwrap();
		assert_eq!(next.path, "00010002");
	}

	#[rstest]
	fn test_queries(sample: Sample) {
		let tree = &sample.tree;
		let ancestors: Vec<NodeId> = tree
			.get_ancestors(sample.a2a)
			.unwrap()
			.iter()
			.map(|n| n.id)
			.collect();
		assert_eq!(ancestors, vec![sample.a, sample.a2]);
		let descendants: Vec<NodeId> = tree
			.get_descendants(sample.a)
			.unwrap()
			.iter()
			.map(|n| n.id)
			.collect();
		assert_eq!(descendants, vec![sample.a1, sample.a2, sample.a2a]);
		let children: Vec<NodeId> = tree
			.get_children(sample.a)
			.unwrap()
			.iter()
			.map(|n| n.id)
			.collect();
		assert_eq!(children, vec![sample.a1, sample.a2]);
		let roots: Vec<NodeId> = tree.get_root_nodes(Some(1)).iter().map(|n| n.id).collect();
		assert_eq!(roots, vec![sample.a, sample.b]);
		assert!(tree.get_root_nodes(Some(2)).is_empty());
		assert!(tree.is_descendant_of(sample.a2a, sample.a).unwrap());
		assert!(!tree.is_descendant_of(sample.b1, sample.a).unwrap());
	}

	#[rstest]
	fn test_missing_node() {
		let tree = NodeTable::new();
		assert_eq!(tree.get(42).unwrap_err(), TreeError::NodeNotFound(42));
	}
}
