//! Integrity checks and full tree rebuild

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, warn};

use crate::error::Result;
use crate::node::{NodeId, SiteId, TreeNode};
use crate::table::NodeTable;

/// A single inconsistency found in the node rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeProblem {
	/// Path is empty, not a multiple of the step length or has bad digits
	InvalidPath { node: NodeId, path: String },
	/// Another node owns the same path
	DuplicatePath { node: NodeId, path: String },
	DepthMismatch { node: NodeId, stored: u32, expected: u32 },
	NumchildMismatch { node: NodeId, stored: u32, expected: u32 },
	/// Parent link points at a missing node
	OrphanParent { node: NodeId, parent: NodeId },
	/// Path prefix disagrees with the parent link
	ParentPathMismatch { node: NodeId, parent: Option<NodeId> },
	SiteMismatch { node: NodeId, site: SiteId, parent_site: SiteId },
}

/// Outcome of [`NodeTable::fix_tree`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
	pub problems: Vec<TreeProblem>,
	pub nodes_rewritten: usize,
	/// Orphans and cycle members turned into roots
	pub promoted_roots: Vec<NodeId>,
}

impl NodeTable {
	/// Scan every row and report inconsistencies without changing anything
	pub fn check_integrity(&self) -> Vec<TreeProblem> {
		let codec = *self.codec();
		let nodes = self.raw_nodes();
		let mut child_counts: HashMap<NodeId, u32> = HashMap::new();
		for node in nodes.values() {
			if let Some(parent) = node.parent {
				*child_counts.entry(parent).or_default() += 1;
			}
		}

		let mut problems = Vec::new();
		for node in nodes.values() {
			let well_formed = !node.path.is_empty()
				&& node.path.len() % codec.steplen() == 0
				&& node
					.path
					.as_bytes()
					.chunks(codec.steplen())
					.all(|step| std::str::from_utf8(step).is_ok_and(|s| codec.decode(s).is_ok()));
			if !well_formed {
				problems.push(TreeProblem::InvalidPath {
					node: node.id,
					path: node.path.clone(),
				});
				continue;
			}
			if self.get_by_path(&node.path).map(|owner| owner.id) != Some(node.id) {
				problems.push(TreeProblem::DuplicatePath {
					node: node.id,
					path: node.path.clone(),
				});
			}
			let expected_depth = codec.depth_of(&node.path);
			if node.depth != expected_depth {
				problems.push(TreeProblem::DepthMismatch {
					node: node.id,
					stored: node.depth,
					expected: expected_depth,
				});
			}
			let expected_children = child_counts.get(&node.id).copied().unwrap_or(0);
			if node.numchild != expected_children {
				problems.push(TreeProblem::NumchildMismatch {
					node: node.id,
					stored: node.numchild,
					expected: expected_children,
				});
			}
			match node.parent {
				None if expected_depth != 1 => problems.push(TreeProblem::ParentPathMismatch {
					node: node.id,
					parent: None,
				}),
				None => {}
				Some(parent_id) => match nodes.get(&parent_id) {
					None => problems.push(TreeProblem::OrphanParent {
						node: node.id,
						parent: parent_id,
					}),
					Some(parent) => {
						if codec.parent_path(&node.path) != parent.path {
							problems.push(TreeProblem::ParentPathMismatch {
								node: node.id,
								parent: Some(parent_id),
							});
						}
						if parent.site != node.site {
							problems.push(TreeProblem::SiteMismatch {
								node: node.id,
								site: node.site,
								parent_site: parent.site,
							});
						}
					}
				},
			}
		}
		problems
	}

	/// Rebuild every path from parent links
	///
	/// Siblings keep their previous relative order (old path, then id).
	/// Orphans and members of parent cycles become roots. Depth, `numchild`
	/// and site (inherited from the root) are recomputed for every node.
	pub fn fix_tree(&mut self) -> Result<RepairReport> {
		let problems = self.check_integrity();
		let codec = *self.codec();
		let original: BTreeMap<NodeId, TreeNode> = self.raw_nodes().clone();

		let mut parents: HashMap<NodeId, Option<NodeId>> = original
			.values()
			.map(|node| {
				let parent = node.parent.filter(|id| original.contains_key(id) && *id != node.id);
				(node.id, parent)
			})
			.collect();
		let mut promoted: Vec<NodeId> = original
			.values()
			.filter(|node| node.parent.is_some() && parents[&node.id].is_none())
			.map(|node| node.id)
			.collect();

		let sort_key = |id: &NodeId| (original[id].path.clone(), *id);
		loop {
			let reachable = reachable_from_roots(&parents);
			let mut stranded: Vec<NodeId> = parents
				.keys()
				.filter(|id| !reachable.contains(*id))
				.copied()
				.collect();
			if stranded.is_empty() {
				break;
			}
			stranded.sort_by_key(sort_key);
			let head = stranded[0];
			warn!(node = head, "breaking parent cycle by promoting node to root");
			parents.insert(head, None);
			promoted.push(head);
		}

		let mut children: HashMap<Option<NodeId>, Vec<NodeId>> = HashMap::new();
		for (id, parent) in &parents {
			children.entry(*parent).or_default().push(*id);
		}
		for list in children.values_mut() {
			list.sort_by_key(sort_key);
		}

		let mut rebuilt = Vec::with_capacity(original.len());
		let mut stack: Vec<(NodeId, String, SiteId)> = Vec::new();
		let roots = children.get(&None).cloned().unwrap_or_default();
		for (i, id) in roots.iter().enumerate().rev() {
			stack.push((*id, codec.child_path("", i as u32 + 1)?, original[id].site));
		}
		while let Some((id, path, site)) = stack.pop() {
			let kids = children.get(&Some(id)).cloned().unwrap_or_default();
			for (i, kid) in kids.iter().enumerate().rev() {
				stack.push((*kid, codec.child_path(&path, i as u32 + 1)?, site));
			}
			rebuilt.push(TreeNode {
				id,
				depth: codec.depth_of(&path),
				path,
				numchild: kids.len() as u32,
				site,
				parent: parents[&id],
			});
		}

		let nodes_rewritten = rebuilt
			.iter()
			.filter(|node| original.get(&node.id) != Some(*node))
			.count();
		self.replace_all(rebuilt);

		info!(
			problems = problems.len(),
			nodes_rewritten,
			promoted = promoted.len(),
			"rebuilt tree paths"
		);
		Ok(RepairReport {
			problems,
			nodes_rewritten,
			promoted_roots: promoted,
		})
	}
}

fn reachable_from_roots(parents: &HashMap<NodeId, Option<NodeId>>) -> HashSet<NodeId> {
	let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
	let mut stack = Vec::new();
	for (id, parent) in parents {
		match parent {
			Some(parent) => children.entry(*parent).or_default().push(*id),
			None => stack.push(*id),
		}
	}
	let mut seen = HashSet::new();
	while let Some(id) = stack.pop() {
		if seen.insert(id) {
			if let Some(kids) = children.get(&id) {
				stack.extend(kids.iter().copied());
			}
		}
	}
	seen
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn row(id: NodeId, path: &str, depth: u32, numchild: u32, parent: Option<NodeId>) -> TreeNode {
		TreeNode {
			id,
			path: path.to_string(),
			depth,
			numchild,
			site: 1,
			parent,
		}
	}

	#[rstest]
	fn test_clean_tree_has_no_problems() {
		let mut tree = NodeTable::new();
		let root = tree.add_root(1).unwrap();
		tree.add_child(root.id).unwrap();
		assert!(tree.check_integrity().is_empty());
	}

	#[rstest]
	fn test_detects_and_fixes_corruption() {
		let mut tree = NodeTable::new();
		tree.insert_raw(row(1, "0001", 1, 0, None));
		// wrong depth, wrong prefix
		tree.insert_raw(row(2, "0005", 3, 0, Some(1)));
		// orphan
		tree.insert_raw(row(3, "00090001", 2, 0, Some(99)));
		// duplicate path
		tree.insert_raw(row(4, "0001", 1, 0, None));

		let problems = tree.check_integrity();
		assert!(problems.contains(&TreeProblem::NumchildMismatch {
			node: 1,
			stored: 0,
			expected: 1
		}));
		assert!(problems.contains(&TreeProblem::OrphanParent { node: 3, parent: 99 }));
		assert!(problems.iter().any(|p| matches!(p, TreeProblem::DuplicatePath { .. })));
		assert!(problems.iter().any(|p| matches!(p, TreeProblem::DepthMismatch { node: 2, .. })));

		let report = tree.fix_tree().unwrap();
		assert_eq!(report.promoted_roots, vec![3]);
		assert!(tree.check_integrity().is_empty());
		assert_eq!(tree.get(2).unwrap().path, "00010001");
		assert_eq!(tree.get(1).unwrap().numchild, 1);
		assert_eq!(tree.len(), 4);
	}

	#[rstest]
	fn test_fix_breaks_cycles() {
		let mut tree = NodeTable::new();
		tree.insert_raw(row(1, "00010001", 2, 1, Some(2)));
		tree.insert_raw(row(2, "000100010001", 3, 1, Some(1)));

		let report = tree.fix_tree().unwrap();
		assert_eq!(report.promoted_roots, vec![1]);
		assert_eq!(tree.get(1).unwrap().path, "0001");
		assert_eq!(tree.get(2).unwrap().path, "00010001");
		assert!(tree.check_integrity().is_empty());
	}
}
