//! Materialized path tree engine.
//!
//! Nodes keep their ancestry in a fixed-width path, so subtree and ancestor
//! queries are prefix scans and path order is depth-first order.
//!
//! # Examples
//!
//! ```rust
//! use pagetree::tree::{NodeTable, Position};
//!
//! let mut tree = NodeTable::new();
//! let home = tree.add_root(1).unwrap();
//! let child = tree.insert_at(home.id, Position::LastChild).unwrap();
//! assert!(tree.is_descendant_of(child.id, home.id).unwrap());
//! ```

// Re-export all pagetree-tree functionality
pub use pagetree_tree::*;
