use thiserror::Error;

/// Errors raised by cache backends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
	/// Value could not be encoded or decoded
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// Backend is unreachable or rejected the operation
	#[error("Cache backend error: {0}")]
	Backend(String),
}

impl From<serde_json::Error> for CacheError {
	fn from(err: serde_json::Error) -> Self {
		Self::Serialization(err.to_string())
	}
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
