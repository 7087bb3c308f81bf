//! Property-based tests for the materialized path engine

use pagetree_tree::{NodeId, NodeTable, Position, SiblingPosition, TreeError};
use proptest::prelude::*;
use proptest::sample::Index;

const POSITIONS: [Position; 6] = [
	Position::FirstChild,
	Position::LastChild,
	Position::Left,
	Position::Right,
	Position::FirstSibling,
	Position::LastSibling,
];

const SIBLING_POSITIONS: [SiblingPosition; 4] = [
	SiblingPosition::FirstSibling,
	SiblingPosition::Left,
	SiblingPosition::Right,
	SiblingPosition::LastSibling,
];

fn ids(tree: &NodeTable) -> Vec<NodeId> {
	tree.iter().map(|node| node.id).collect()
}

/// Grow a tree using only insertions so every level stays dense
fn build_tree(ops: &[(u8, Index, u8)]) -> NodeTable {
	let mut tree = NodeTable::new();
	tree.add_root(1).unwrap();
	for (op, pick, pos) in ops {
		let all = ids(&tree);
		let anchor = all[pick.index(all.len())];
		match op {
			0 => {
				tree.add_root(1).unwrap();
			}
			1 => {
				tree.add_child(anchor).unwrap();
			}
			_ => {
				tree.add_sibling(anchor, SIBLING_POSITIONS[*pos as usize % 4])
					.unwrap();
			}
		}
	}
	tree
}

fn assert_invariants(tree: &NodeTable) -> Result<(), TestCaseError> {
	prop_assert!(tree.check_integrity().is_empty(), "{:?}", tree.check_integrity());
	for node in tree.iter() {
		prop_assert_eq!(node.path.len(), node.depth as usize * 4);
		for descendant in tree.get_descendants(node.id).unwrap() {
			prop_assert!(descendant.path.starts_with(&node.path));
			prop_assert!(descendant.depth > node.depth);
		}
	}
	Ok(())
}

proptest! {
	#[test]
	fn prop_insertions_keep_invariants(
		ops in proptest::collection::vec((0u8..3, any::<Index>(), 0u8..4), 1..40),
	) {
		let tree = build_tree(&ops);
		assert_invariants(&tree)?;
	}

	#[test]
	fn prop_random_moves_and_deletes_keep_invariants(
		ops in proptest::collection::vec((0u8..3, any::<Index>(), 0u8..4), 1..30),
		moves in proptest::collection::vec((any::<Index>(), any::<Index>(), 0u8..6, any::<bool>()), 1..30),
	) {
		let mut tree = build_tree(&ops);
		for (node, target, pos, delete) in moves {
			let all = ids(&tree);
			if all.len() < 2 {
				break;
			}
			let node = all[node.index(all.len())];
			let target = all[target.index(all.len())];
			if delete && all.len() > 3 {
				tree.delete_fast(node).unwrap();
				continue;
			}
			match tree.move_node(node, target, POSITIONS[pos as usize]) {
				Ok(_) | Err(TreeError::InvalidMove(_)) => {}
				Err(other) => prop_assert!(false, "unexpected error {other}"),
			}
			assert_invariants(&tree)?;
		}
	}

	#[test]
	fn prop_inverse_move_restores_structure(
		ops in proptest::collection::vec((0u8..3, any::<Index>(), 0u8..4), 1..30),
		pick in any::<Index>(),
	) {
		let mut tree = build_tree(&ops);
		let before: Vec<_> = tree.iter().cloned().collect();
		let all = ids(&tree);
		let node = tree.get(all[pick.index(all.len())]).unwrap().clone();

		let siblings: Vec<NodeId> = tree.get_siblings(node.id).unwrap().iter().map(|n| n.id).collect();
		let idx = siblings.iter().position(|id| *id == node.id).unwrap();
		let (anchor, back) = if idx > 0 {
			(siblings[idx - 1], Position::Right)
		} else if let Some(parent) = node.parent {
			(parent, Position::FirstChild)
		} else {
			(siblings[1.min(siblings.len() - 1)], Position::FirstSibling)
		};

		let parking = tree.add_root(1).unwrap();
		tree.move_node(node.id, parking.id, Position::LastChild).unwrap();
		if anchor == node.id {
			// only root on its level: put it back in front of the parking root
			tree.move_node(node.id, parking.id, Position::Left).unwrap();
		} else {
			tree.move_node(node.id, anchor, back).unwrap();
		}
		tree.delete_fast(parking.id).unwrap();

		let after: Vec<_> = tree.iter().cloned().collect();
		prop_assert_eq!(before, after);
	}
}
