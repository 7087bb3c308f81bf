//! Arena view of a set of nodes
//!
//! Built once from a path-ordered scan so callers can walk parent/child
//! relationships in memory instead of issuing one query per level.

use std::collections::HashMap;

use crate::node::{NodeId, TreeNode};

/// One arena slot
#[derive(Debug, Clone)]
pub struct ForestEntry {
	pub node: TreeNode,
	pub parent: Option<usize>,
	pub children: Vec<usize>,
}

/// Nodes indexed by id with children linked by parent id
#[derive(Debug, Clone, Default)]
pub struct Forest {
	entries: Vec<ForestEntry>,
	index: HashMap<NodeId, usize>,
	roots: Vec<usize>,
}

impl Forest {
	/// Build from any set of nodes
	///
	/// Nodes whose parent is not part of the set become roots of the forest.
	pub fn build<'a>(nodes: impl IntoIterator<Item = &'a TreeNode>) -> Self {
		let mut ordered: Vec<&TreeNode> = nodes.into_iter().collect();
		ordered.sort_by(|a, b| a.path.cmp(&b.path));

		let mut forest = Forest::default();
		for node in ordered {
			let slot = forest.entries.len();
			let parent = node.parent.and_then(|id| forest.index.get(&id).copied());
			forest.entries.push(ForestEntry {
				node: node.clone(),
				parent,
				children: Vec::new(),
			});
			forest.index.insert(node.id, slot);
			match parent {
				Some(parent_slot) => forest.entries[parent_slot].children.push(slot),
				None => forest.roots.push(slot),
			}
		}
		forest
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, id: NodeId) -> Option<&ForestEntry> {
		self.index.get(&id).map(|slot| &self.entries[*slot])
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.index.contains_key(&id)
	}

	pub fn roots(&self) -> impl Iterator<Item = &ForestEntry> {
		self.roots.iter().map(|slot| &self.entries[*slot])
	}

	pub fn children(&self, id: NodeId) -> Vec<&ForestEntry> {
		self.get(id)
			.map(|entry| entry.children.iter().map(|slot| &self.entries[*slot]).collect())
			.unwrap_or_default()
	}

	pub fn parent(&self, id: NodeId) -> Option<&ForestEntry> {
		self.get(id)
			.and_then(|entry| entry.parent)
			.map(|slot| &self.entries[slot])
	}

	/// Pre-order walk of the whole forest
	pub fn walk(&self) -> Vec<&ForestEntry> {
		let mut out = Vec::with_capacity(self.entries.len());
		let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
		while let Some(slot) = stack.pop() {
			let entry = &self.entries[slot];
			out.push(entry);
			stack.extend(entry.children.iter().rev().copied());
		}
		out
	}

	/// Pre-order walk below `id`, excluding it
	pub fn descendants(&self, id: NodeId) -> Vec<&ForestEntry> {
		let Some(start) = self.index.get(&id) else {
			return Vec::new();
		};
		let mut out = Vec::new();
		let mut stack: Vec<usize> = self.entries[*start].children.iter().rev().copied().collect();
		while let Some(slot) = stack.pop() {
			let entry = &self.entries[slot];
			out.push(entry);
			stack.extend(entry.children.iter().rev().copied());
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::NodeTable;
	use rstest::rstest;

	#[rstest]
	fn test_forest_links_children() {
		let mut tree = NodeTable::new();
		let a = tree.add_root(1).unwrap();
		let a1 = tree.add_child(a.id).unwrap();
		let a1x = tree.add_child(a1.id).unwrap();
		let a2 = tree.add_child(a.id).unwrap();
		let other = tree.add_root(2).unwrap();

		let forest = tree.forest(1);
		assert_eq!(forest.len(), 4);
		assert!(!forest.contains(other.id));
		let roots: Vec<NodeId> = forest.roots().map(|e| e.node.id).collect();
		assert_eq!(roots, vec![a.id]);
		let children: Vec<NodeId> = forest.children(a.id).iter().map(|e| e.node.id).collect();
		assert_eq!(children, vec![a1.id, a2.id]);
		let walk: Vec<NodeId> = forest.walk().iter().map(|e| e.node.id).collect();
		assert_eq!(walk, vec![a.id, a1.id, a1x.id, a2.id]);
		let below: Vec<NodeId> = forest.descendants(a1.id).iter().map(|e| e.node.id).collect();
		assert_eq!(below, vec![a1x.id]);
		assert_eq!(forest.parent(a1x.id).map(|e| e.node.id), Some(a1.id));
	}

	#[rstest]
	fn test_forest_partial_set_promotes_roots() {
		let mut tree = NodeTable::new();
		let a = tree.add_root(1).unwrap();
		let a1 = tree.add_child(a.id).unwrap();
		let a1x = tree.add_child(a1.id).unwrap();

		let subset = [a1.clone(), a1x.clone()];
		let forest = Forest::build(subset.iter());
		let roots: Vec<NodeId> = forest.roots().map(|e| e.node.id).collect();
		assert_eq!(roots, vec![a1.id]);
	}
}
