//! # pagetree-tree
//!
//! Materialized path tree engine.
//!
//! Each node stores its full ancestry as a string of fixed-width base-36
//! steps. Ancestor, descendant and sibling lookups become prefix scans over an
//! ordered index, and sorting by path yields depth-first tree order.
//!
//! ```text
//! 0001            home
//! 00010001          about
//! 00010002          news
//! 000100020001        2024
//! 0002            landing
//! ```
//!
//! ## Example
//!
//! ```
//! use pagetree_tree::{NodeTable, Position};
//!
//! let mut tree = NodeTable::new();
//! let home = tree.add_root(1).unwrap();
//! let about = tree.add_child(home.id).unwrap();
//! let news = tree.add_child(home.id).unwrap();
//!
//! tree.move_node(news.id, about.id, Position::Left).unwrap();
//! let order: Vec<_> = tree.get_children(home.id).unwrap().iter().map(|n| n.id).collect();
//! assert_eq!(order, vec![news.id, about.id]);
//! ```

pub mod arena;
pub mod error;
pub mod member;
pub mod node;
pub mod path;
pub mod repair;
pub mod table;

pub use arena::{Forest, ForestEntry};
pub use error::{Result, TreeError};
pub use member::TreeMember;
pub use node::{NodeId, Position, SiblingPosition, SiteId, TreeNode};
pub use path::{ALPHABET, PathCodec, STEPLEN};
pub use repair::{RepairReport, TreeProblem};
pub use table::NodeTable;
