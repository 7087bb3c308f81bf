use thiserror::Error;

use crate::NodeId;

/// Errors raised by the materialized path engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
	/// The move would create a cycle or targets the node itself
	#[error("Invalid move: {0}")]
	InvalidMove(String),

	/// A tree level ran out of sibling slots
	#[error("Path overflow: no free step after {path:?} (max {max} siblings per level)")]
	PathOverflow { path: String, max: u32 },

	/// Referenced node does not exist
	#[error("Node not found: {0}")]
	NodeNotFound(NodeId),

	/// The requested position is not valid for the operation
	#[error("Invalid position: {0}")]
	InvalidPosition(String),

	/// Stored paths are inconsistent; run the repair routine
	#[error("Tree corrupted: {0}")]
	Corrupted(String),
}

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
